//! # Error Types
//!
//! Defines `RowsmithError`, the unified error enum for every failure mode in
//! the introspection and generation pipeline. Variants carry the table (and
//! column or constraint, where relevant) that was being processed, so a
//! failure reported through the tool surface is actionable on its own.

use thiserror::Error;

/// Stable numeric codes reported in the `{code, message}` error shape.
pub mod codes {
    pub const INVALID_ARGUMENT: i64 = -32602;
    pub const UNKNOWN_TOOL: i64 = -32601;
    pub const INTERNAL: i64 = -32603;
    pub const NOT_FOUND: i64 = -32004;
    pub const SCHEMA_NOT_FOUND: i64 = -32005;
    pub const UNSATISFIABLE_DEPENDENCY: i64 = -32006;
    pub const CONSTRAINT_VIOLATION: i64 = -32007;
}

/// All errors that can occur in rowsmith operations.
#[derive(Error, Debug)]
pub enum RowsmithError {
    #[error("Table '{table}' does not exist")]
    NotFound { table: String },

    #[error("Foreign key {constraint} on {source_table}.{source_column} references table '{target_table}', which does not exist in the catalog")]
    SchemaNotFound {
        source_table: String,
        source_column: String,
        target_table: String,
        constraint: String,
    },

    #[error("Cannot populate {table}.{column}: it references {target_table}.{target_column}, which has no rows and cannot be seeded\n  {reason}")]
    UnsatisfiableDependency {
        table: String,
        column: String,
        target_table: String,
        target_column: String,
        reason: String,
    },

    #[error("Insert into {table} rejected: {message}\n  DB error: {source}")]
    ConstraintViolation {
        table: String,
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Database connection failed: {message}\n  Connection string: {connection_hint}\n  Cause: {source}")]
    Connection {
        message: String,
        connection_hint: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Catalog query '{query}' failed: {source}")]
    Query {
        query: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("No database URL provided. rowsmith looks for a connection in this order:\n  1. --db flag\n  2. DATABASE_URL environment variable\n  3. .env file with DATABASE_URL\n  4. rowsmith.toml [database] section")]
    NoDatabaseUrl,

    #[error("Unsupported database scheme '{scheme}'. Supported: mysql://, mariadb://, sqlite://")]
    UnsupportedDatabase { scheme: String },

    #[error("Unknown tool '{name}'")]
    UnknownTool { name: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Other(String),
}

impl RowsmithError {
    /// Numeric code for the `{code, message}` error shape.
    pub fn code(&self) -> i64 {
        match self {
            RowsmithError::NotFound { .. } => codes::NOT_FOUND,
            RowsmithError::SchemaNotFound { .. } => codes::SCHEMA_NOT_FOUND,
            RowsmithError::UnsatisfiableDependency { .. } => codes::UNSATISFIABLE_DEPENDENCY,
            RowsmithError::ConstraintViolation { .. } => codes::CONSTRAINT_VIOLATION,
            RowsmithError::InvalidArgument { .. } => codes::INVALID_ARGUMENT,
            RowsmithError::UnknownTool { .. } => codes::UNKNOWN_TOOL,
            _ => codes::INTERNAL,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        RowsmithError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Prefix a failure with the table being processed when it occurred.
    ///
    /// Only `ConstraintViolation` and `Other` are rewritten; the remaining
    /// variants already name their table.
    pub fn while_processing(self, table: &str) -> Self {
        match self {
            RowsmithError::ConstraintViolation {
                table: rejected,
                message,
                source,
            } if rejected != table => RowsmithError::ConstraintViolation {
                table: rejected,
                message: format!("{} (while generating data for {})", message, table),
                source,
            },
            RowsmithError::Other(message) => {
                RowsmithError::Other(format!("Failed to generate test data for {}: {}", table, message))
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, RowsmithError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_per_variant() {
        assert_eq!(
            RowsmithError::NotFound {
                table: "t".to_string()
            }
            .code(),
            codes::NOT_FOUND
        );
        assert_eq!(
            RowsmithError::invalid_argument("count").code(),
            codes::INVALID_ARGUMENT
        );
        assert_eq!(
            RowsmithError::Other("boom".to_string()).code(),
            codes::INTERNAL
        );
    }

    #[test]
    fn test_while_processing_names_requested_table() {
        let err = RowsmithError::ConstraintViolation {
            table: "users".to_string(),
            message: "duplicate entry".to_string(),
            source: "Duplicate entry 'a' for key 'email'".into(),
        }
        .while_processing("posts");

        let msg = err.to_string();
        assert!(msg.contains("users"));
        assert!(msg.contains("while generating data for posts"));
        assert_eq!(err.code(), codes::CONSTRAINT_VIOLATION);
    }

    #[test]
    fn test_while_processing_same_table_unchanged() {
        let err = RowsmithError::ConstraintViolation {
            table: "posts".to_string(),
            message: "duplicate entry".to_string(),
            source: "dup".into(),
        }
        .while_processing("posts");
        assert!(!err.to_string().contains("while generating"));
    }
}
