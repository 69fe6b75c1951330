use petgraph::algo::tarjan_scc;
use petgraph::visit::EdgeRef;

use crate::graph::dag::RelationGraph;

/// A reference cycle: tables that cannot all be empty when seeding starts
/// unless one of the FK columns involved is nullable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Tables in the cycle, sorted by name.
    pub tables: Vec<String>,
    /// `table.column` of every FK edge inside the cycle.
    pub columns: Vec<String>,
}

impl Cycle {
    pub fn is_self_reference(&self) -> bool {
        self.tables.len() == 1
    }
}

/// Find all reference cycles.
///
/// Multi-table cycles are the strongly connected components with more than
/// one node (Tarjan); self-referencing tables are reported as one-table
/// cycles. Output is sorted by first table name.
pub fn find_cycles(graph: &RelationGraph) -> Vec<Cycle> {
    let mut cycles = Vec::new();

    for scc in tarjan_scc(&graph.graph) {
        let in_scc = |n| scc.contains(&n);
        let is_cycle = scc.len() > 1
            || graph
                .graph
                .edges(scc[0])
                .any(|e| e.target() == scc[0]);
        if !is_cycle {
            continue;
        }

        let mut tables: Vec<String> = scc.iter().map(|&n| graph.table_name(n).to_string()).collect();
        tables.sort();

        let mut columns = Vec::new();
        for &node in &scc {
            for edge in graph.graph.edges(node) {
                if in_scc(edge.target()) {
                    columns.push(format!("{}.{}", graph.table_name(node), edge.weight().source_column));
                }
            }
        }
        columns.sort();

        cycles.push(Cycle { tables, columns });
    }

    cycles.sort_by(|a, b| a.tables.cmp(&b.tables));
    cycles
}
