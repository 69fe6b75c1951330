use anyhow::Result;

use rowsmith_core::graph::cycle::find_cycles;
use rowsmith_core::graph::dag::RelationGraph;

use crate::args::DbArgs;
use crate::commands::diagram::load_graph;

pub async fn run(args: &DbArgs) -> Result<()> {
    let graph = load_graph(args).await?;
    let relations = RelationGraph::from_schema_graph(&graph);
    let cycles = find_cycles(&relations);

    println!(
        "Tables: {}  Foreign keys: {}  Cycles: {}",
        relations.table_count(),
        relations.edge_count(),
        cycles.len()
    );

    for cycle in &cycles {
        if cycle.is_self_reference() {
            println!("  {} references itself via {}", cycle.tables[0], cycle.columns.join(", "));
        } else {
            println!("  {} via {}", cycle.tables.join(" <-> "), cycle.columns.join(", "));
        }
    }

    if !cycles.is_empty() {
        eprintln!("Tables in a cycle can only be generated when one of the columns above is nullable.");
    }

    Ok(())
}
