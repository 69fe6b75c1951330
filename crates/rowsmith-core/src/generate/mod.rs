//! # Test Data Generation
//!
//! Entry point for `generateTestData`: validates the request, seeds
//! under-populated ancestor tables, then assembles and inserts the requested
//! rows in one batch.

pub mod foreign_key;
pub mod providers;
pub mod resolver;
pub mod rows;
pub mod unique;
pub mod value;

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GenerateSettings;
use crate::error::{Result, RowsmithError};
use crate::generate::providers::ValueSynthesizer;
use crate::generate::resolver::DependencyResolver;
use crate::generate::rows::{RowAssembler, SyntheticRow};
use crate::schema::provider::MetadataProvider;
use crate::store::RowStore;

/// A request to insert `count` synthetic rows into `table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub table: String,
    pub count: u64,
}

impl GenerationRequest {
    pub fn new(table: impl Into<String>, count: u64) -> Self {
        Self {
            table: table.into(),
            count,
        }
    }

    /// Reject empty table names and counts outside `1..=max_rows`.
    pub fn validate(&self, max_rows: u64) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(RowsmithError::invalid_argument("table must not be empty"));
        }
        if self.count == 0 || self.count > max_rows {
            return Err(RowsmithError::invalid_argument(format!(
                "count must be between 1 and {}, got {}",
                max_rows, self.count
            )));
        }
        Ok(())
    }
}

/// Rows inserted into the requested table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    /// Rows the store reported as inserted.
    pub inserted: u64,
    /// The generated rows, as sent to the store.
    pub rows: Vec<SyntheticRow>,
    /// Ancestor tables that had to be seeded first, parents before children.
    #[serde(skip)]
    pub seeded_tables: Vec<String>,
}

/// Generate and insert `request.count` rows into `request.table`.
///
/// Ancestors with fewer than `min_parent_rows` rows are seeded with
/// `seed_rows` rows each before the requested rows are assembled. Rows
/// committed for ancestors stay committed if a later step fails.
pub async fn generate_test_data<C>(
    catalog: &C,
    request: &GenerationRequest,
    settings: &GenerateSettings,
) -> Result<GenerationResult>
where
    C: MetadataProvider + RowStore,
{
    request.validate(settings.max_rows)?;

    run(catalog, request, settings)
        .await
        .map_err(|e| e.while_processing(&request.table))
}

async fn run<C>(catalog: &C, request: &GenerationRequest, settings: &GenerateSettings) -> Result<GenerationResult>
where
    C: MetadataProvider + RowStore,
{
    let target = catalog.table_metadata(&request.table).await?;

    let base_time = chrono::Utc::now().naive_utc().with_nanosecond(0).unwrap_or_default();
    let seed = match settings.seed {
        Some(seed) => Some(request_seed(catalog, seed).await?),
        None => None,
    };
    let synthesizer = ValueSynthesizer::new(seed, settings.null_probability, base_time);
    let mut assembler = RowAssembler::new(synthesizer, settings.fk_pool_size);

    let mut resolver = DependencyResolver::new(settings.seed_rows, settings.min_parent_rows);
    resolver.ensure_populated(catalog, &mut assembler, &target).await?;

    let (outcome, rows) = assembler.populate(catalog, &target, request.count).await?;
    info!(
        "Inserted {} rows into {} ({} ancestor tables seeded)",
        outcome.affected_rows,
        target.name,
        resolver.seeded().len()
    );

    Ok(GenerationResult {
        inserted: outcome.affected_rows,
        rows,
        seeded_tables: resolver.seeded().to_vec(),
    })
}

/// The configured seed, advanced by the number of committed rows.
///
/// An unchanged catalog replays the same values. Once any rows are committed
/// the next request draws a new stream, so unique columns do not repeat the
/// previous request's values.
async fn request_seed<C>(catalog: &C, seed: u64) -> Result<u64>
where
    C: MetadataProvider + RowStore,
{
    let mut committed: u64 = 0;
    for table in catalog.list_tables().await? {
        committed = committed.wrapping_add(catalog.count_rows(&table).await?);
    }
    Ok(mix_seed(seed, committed))
}

fn mix_seed(seed: u64, committed: u64) -> u64 {
    seed ^ committed.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
