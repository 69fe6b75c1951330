use anyhow::Result;

use rowsmith_core::graph::diagram::{build_schema_graph, SchemaGraph};
use rowsmith_core::graph::visualize::{self, GraphFormat};

use crate::args::{DiagramArgs, DiagramFormat};
use crate::connect::{self, Catalog};

pub async fn run(args: &DiagramArgs) -> Result<()> {
    let graph = load_graph(&args.db).await?;

    let output = match args.format {
        DiagramFormat::Json => serde_json::to_string_pretty(&graph)?,
        DiagramFormat::Mermaid => visualize::visualize(&graph, GraphFormat::Mermaid),
        DiagramFormat::Dot => visualize::visualize(&graph, GraphFormat::Dot),
    };
    println!("{}", output);

    Ok(())
}

/// Connect and build the schema graph of every table.
pub async fn load_graph(db: &crate::args::DbArgs) -> Result<SchemaGraph> {
    let config = connect::load_config()?;
    let url = connect::resolve_url(db, &config)?;

    let graph = match connect::open(&url).await? {
        Catalog::MySql(catalog) => build_schema_graph(&catalog).await?,
        Catalog::Sqlite(catalog) => build_schema_graph(&catalog).await?,
    };
    Ok(graph)
}
