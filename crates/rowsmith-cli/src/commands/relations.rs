use anyhow::Result;
use comfy_table::{Cell, Table as ComfyTable};

use rowsmith_core::error::RowsmithError;
use rowsmith_core::schema::provider::MetadataProvider;
use rowsmith_core::schema::types::TableRelations;

use crate::args::{ReportFormat, TableArgs};
use crate::connect::{self, Catalog};

pub async fn run(args: &TableArgs) -> Result<()> {
    let config = connect::load_config()?;
    let url = connect::resolve_url(&args.db, &config)?;

    let relations = match connect::open(&url).await? {
        Catalog::MySql(catalog) => fetch(&catalog, &args.table).await?,
        Catalog::Sqlite(catalog) => fetch(&catalog, &args.table).await?,
    };

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&relations)?),
        ReportFormat::Table => {
            println!("━━━ {} ━━━", args.table);

            let mut t = ComfyTable::new();
            t.set_header(vec!["Direction", "Column", "References", "Constraint"]);
            for edge in &relations.outgoing {
                t.add_row(vec![
                    Cell::new("→"),
                    Cell::new(&edge.source_column),
                    Cell::new(format!("{}.{}", edge.target_table, edge.target_column)),
                    Cell::new(&edge.constraint_name),
                ]);
            }
            for edge in &relations.incoming {
                t.add_row(vec![
                    Cell::new("←"),
                    Cell::new(format!("{}.{}", edge.source_table, edge.source_column)),
                    Cell::new(&edge.target_column),
                    Cell::new(&edge.constraint_name),
                ]);
            }
            println!("{}", t);
        }
    }

    Ok(())
}

async fn fetch<P: MetadataProvider>(provider: &P, table: &str) -> Result<TableRelations> {
    if !provider.table_exists(table).await? {
        return Err(RowsmithError::NotFound {
            table: table.to_string(),
        }
        .into());
    }
    Ok(provider.get_relations(table).await?)
}
