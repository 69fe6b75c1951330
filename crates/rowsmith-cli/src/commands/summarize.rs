use anyhow::Result;
use comfy_table::{Cell, Table as ComfyTable};

use rowsmith_core::summary::summarize_table;

use crate::args::{ReportFormat, TableArgs};
use crate::connect::{self, Catalog};

pub async fn run(args: &TableArgs) -> Result<()> {
    let config = connect::load_config()?;
    let url = connect::resolve_url(&args.db, &config)?;

    let summary = match connect::open(&url).await? {
        Catalog::MySql(catalog) => summarize_table(&catalog, &args.table).await?,
        Catalog::Sqlite(catalog) => summarize_table(&catalog, &args.table).await?,
    };

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        ReportFormat::Table => {
            println!("━━━ {} ({} rows) ━━━", summary.table, summary.row_count);

            let mut t = ComfyTable::new();
            t.set_header(vec!["Column", "Type", "Nulls", "Distinct", "Most frequent"]);
            for column in &summary.columns {
                let samples = column
                    .sample_values
                    .iter()
                    .map(|v| truncate(&v.to_string(), 24))
                    .collect::<Vec<_>>()
                    .join(", ");
                t.add_row(vec![
                    Cell::new(&column.name),
                    Cell::new(&column.data_type),
                    Cell::new(column.null_count),
                    Cell::new(column.unique_count),
                    Cell::new(samples),
                ]);
            }
            println!("{}", t);
        }
    }

    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
