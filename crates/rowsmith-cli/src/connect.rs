use anyhow::{Context, Result};

use rowsmith_core::config::{read_config, GenerateSettings, RowsmithConfig};
use rowsmith_core::error::RowsmithError;
use rowsmith_core::schema::mysql::MySqlCatalog;
use rowsmith_core::schema::sqlite::SqliteCatalog;
use rowsmith_core::schema::{database_type_from_url, DatabaseType};

use crate::args::DbArgs;

/// An open catalog for whichever engine the URL names.
pub enum Catalog {
    MySql(MySqlCatalog),
    Sqlite(SqliteCatalog),
}

/// Load rowsmith.toml from the working directory, if present.
pub fn load_config() -> Result<RowsmithConfig> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    Ok(read_config(&cwd)?.unwrap_or_default())
}

/// Generation settings from the config file, checked before use.
pub fn settings(config: &RowsmithConfig) -> Result<GenerateSettings> {
    let settings = config.generate.settings();
    settings.validate()?;
    Ok(settings)
}

/// `--db` (or DATABASE_URL, which clap already folds in) first, then the config file.
pub fn resolve_url(args: &DbArgs, config: &RowsmithConfig) -> Result<String> {
    args.db
        .clone()
        .or_else(|| config.database.url.clone())
        .ok_or_else(|| RowsmithError::NoDatabaseUrl.into())
}

pub async fn open(url: &str) -> Result<Catalog> {
    let catalog = match database_type_from_url(url)? {
        DatabaseType::MySQL => Catalog::MySql(MySqlCatalog::connect(url).await?),
        DatabaseType::SQLite => Catalog::Sqlite(SqliteCatalog::connect(url).await?),
    };
    tracing::debug!("Connected to {}", rowsmith_core::schema::sanitize_url(url));
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowsmith_core::config::DatabaseConfig;

    #[test]
    fn test_flag_wins_over_config() {
        let config = RowsmithConfig {
            database: DatabaseConfig {
                url: Some("mysql://root@localhost/from_config".to_string()),
            },
            ..Default::default()
        };
        let args = DbArgs {
            db: Some("sqlite::memory:".to_string()),
        };
        assert_eq!(resolve_url(&args, &config).unwrap(), "sqlite::memory:");

        let args = DbArgs { db: None };
        assert_eq!(
            resolve_url(&args, &config).unwrap(),
            "mysql://root@localhost/from_config"
        );
    }

    #[test]
    fn test_missing_url() {
        let err = resolve_url(&DbArgs { db: None }, &RowsmithConfig::default()).unwrap_err();
        assert!(err.to_string().contains("No database URL provided"));
    }
}
