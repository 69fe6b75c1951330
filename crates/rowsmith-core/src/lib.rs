pub mod classify;
pub mod config;
pub mod error;
pub mod generate;
pub mod graph;
pub mod schema;
pub mod store;
pub mod summary;
pub mod tools;

// Re-export key types for convenience
pub use error::{Result, RowsmithError};
pub use generate::{generate_test_data, GenerationRequest, GenerationResult};
pub use graph::diagram::{build_schema_graph, SchemaGraph};
pub use schema::provider::MetadataProvider;
pub use store::RowStore;
