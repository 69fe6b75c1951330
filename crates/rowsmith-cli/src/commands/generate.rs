use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use rowsmith_core::config::GenerateSettings;
use rowsmith_core::generate::{generate_test_data, GenerationRequest, GenerationResult};
use rowsmith_core::schema::provider::MetadataProvider;
use rowsmith_core::store::RowStore;

use crate::args::GenerateArgs;
use crate::connect::{self, Catalog};

pub async fn run(args: &GenerateArgs) -> Result<()> {
    // Load optional rowsmith.toml config
    let config = connect::load_config()?;
    let url = connect::resolve_url(&args.db, &config)?;

    let settings = apply_overrides(connect::settings(&config)?, args);
    settings.validate()?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.set_message(format!("Generating {} rows for {}...", args.count, args.table));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let request = GenerationRequest::new(&args.table, args.count);
    let outcome = match connect::open(&url).await {
        Ok(Catalog::MySql(catalog)) => execute(&catalog, &request, &settings).await,
        Ok(Catalog::Sqlite(catalog)) => execute(&catalog, &request, &settings).await,
        Err(e) => Err(e),
    };

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_with_message(format!(
        "Generating {} rows for {}... ✓",
        args.count, args.table
    ));

    if !result.seeded_tables.is_empty() {
        eprintln!("Seeded ancestor tables: {}", result.seeded_tables.join(", "));
    }
    eprintln!("Inserted {} rows into {}", result.inserted, args.table);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    Ok(())
}

async fn execute<C>(catalog: &C, request: &GenerationRequest, settings: &GenerateSettings) -> Result<GenerationResult>
where
    C: MetadataProvider + RowStore,
{
    generate_test_data(catalog, request, settings)
        .await
        .with_context(|| format!("Failed to generate test data for {}", request.table))
}

/// Command-line flags take precedence over rowsmith.toml.
fn apply_overrides(settings: GenerateSettings, args: &GenerateArgs) -> GenerateSettings {
    let mut settings = settings.with_seed(args.seed);
    if let Some(seed_rows) = args.seed_rows {
        settings.seed_rows = seed_rows;
    }
    if let Some(min_parent_rows) = args.min_parent_rows {
        settings.min_parent_rows = min_parent_rows;
    }
    settings
}
