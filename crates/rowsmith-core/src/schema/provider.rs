use crate::error::Result;
use crate::schema::types::{ColumnDescriptor, TableMetadata, TableRelations};

/// Read-only access to catalog metadata.
///
/// Implementations must not cache across calls: the schema may change
/// between invocations, so every call re-reads the catalog.
pub trait MetadataProvider: Send + Sync {
    /// All base tables, in the catalog's listing order.
    fn list_tables(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    /// Ordered column descriptors. Fails with `NotFound` if the table is absent.
    fn describe_table(
        &self,
        table: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ColumnDescriptor>>> + Send;

    /// Outgoing and incoming foreign-key edges of a table.
    fn get_relations(
        &self,
        table: &str,
    ) -> impl std::future::Future<Output = Result<TableRelations>> + Send;

    /// Columns plus relations in one value.
    fn table_metadata(
        &self,
        table: &str,
    ) -> impl std::future::Future<Output = Result<TableMetadata>> + Send {
        async move {
            let columns = self.describe_table(table).await?;
            let relations = self.get_relations(table).await?;
            Ok(TableMetadata::new(table.to_string(), columns, relations))
        }
    }

    /// Whether the catalog currently lists `table`.
    fn table_exists(&self, table: &str) -> impl std::future::Future<Output = Result<bool>> + Send {
        async move {
            let tables = self.list_tables().await?;
            Ok(tables.iter().any(|t| t == table))
        }
    }
}
