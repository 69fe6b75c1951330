//! # Tool Surface
//!
//! Named operations callable with a JSON argument object. Each call
//! validates its arguments, runs the operation against a catalog and returns
//! either a JSON result or a `{code, message}` error.

use serde::Serialize;
use serde_json::{json, Value as Json};

use crate::config::GenerateSettings;
use crate::error::{Result, RowsmithError};
use crate::generate::{generate_test_data, GenerationRequest};
use crate::graph::diagram::build_schema_graph;
use crate::schema::provider::MetadataProvider;
use crate::store::RowStore;
use crate::summary::summarize_table;

pub const GENERATE_TEST_DATA: &str = "generateTestData";
pub const GENERATE_SCHEMA_DIAGRAM: &str = "generateSchemaDiagram";
pub const TABLE_RELATIONS: &str = "tableRelations";
pub const SUMMARIZE_TABLE: &str = "summarizeTable";

/// Name, description and JSON schema of one tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Json,
}

/// Error shape returned to tool callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolError {
    pub code: i64,
    pub message: String,
}

impl From<RowsmithError> for ToolError {
    fn from(err: RowsmithError) -> Self {
        ToolError {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ToolError {}

/// A catalog plus the generation policy tools run with.
pub struct ToolContext<'a, C> {
    pub catalog: &'a C,
    pub settings: GenerateSettings,
}

impl<'a, C> ToolContext<'a, C>
where
    C: MetadataProvider + RowStore,
{
    pub fn new(catalog: &'a C, settings: GenerateSettings) -> Self {
        Self { catalog, settings }
    }
}

/// Every tool this crate exposes.
pub fn descriptors(max_rows: u64) -> Vec<ToolDescriptor> {
    let table_only = json!({
        "type": "object",
        "properties": {
            "table": { "type": "string", "description": "Table name" }
        },
        "required": ["table"]
    });

    vec![
        ToolDescriptor {
            name: GENERATE_TEST_DATA,
            description: "Generates fake test data for a table, seeding referenced tables first",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "table": { "type": "string", "description": "Name of the table to generate data for" },
                    "count": {
                        "type": "integer",
                        "description": "Number of rows to generate",
                        "minimum": 1,
                        "maximum": max_rows
                    }
                },
                "required": ["table", "count"]
            }),
        },
        ToolDescriptor {
            name: GENERATE_SCHEMA_DIAGRAM,
            description: "Generates a node/edge description of all tables and their foreign keys",
            input_schema: json!({ "type": "object", "properties": {}, "required": [] }),
        },
        ToolDescriptor {
            name: TABLE_RELATIONS,
            description: "Lists the foreign keys leaving and entering a table",
            input_schema: table_only.clone(),
        },
        ToolDescriptor {
            name: SUMMARIZE_TABLE,
            description: "Row count plus frequent values, null count and distinct count per column",
            input_schema: table_only,
        },
    ]
}

/// Run tool `name` with `args`.
pub async fn call<C>(ctx: &ToolContext<'_, C>, name: &str, args: &Json) -> std::result::Result<Json, ToolError>
where
    C: MetadataProvider + RowStore,
{
    dispatch(ctx, name, args).await.map_err(|e| {
        tracing::warn!("Tool {} failed: {}", name, e);
        ToolError::from(e)
    })
}

async fn dispatch<C>(ctx: &ToolContext<'_, C>, name: &str, args: &Json) -> Result<Json>
where
    C: MetadataProvider + RowStore,
{
    match name {
        GENERATE_TEST_DATA => {
            let request = GenerationRequest::new(table_arg(args)?, count_arg(args)?);
            let result = generate_test_data(ctx.catalog, &request, &ctx.settings).await?;
            to_json(&result)
        }
        GENERATE_SCHEMA_DIAGRAM => {
            let graph = build_schema_graph(ctx.catalog).await?;
            to_json(&graph)
        }
        TABLE_RELATIONS => {
            let table = table_arg(args)?;
            if !ctx.catalog.table_exists(&table).await? {
                return Err(RowsmithError::NotFound { table });
            }
            let relations = ctx.catalog.get_relations(&table).await?;
            to_json(&relations)
        }
        SUMMARIZE_TABLE => {
            let table = table_arg(args)?;
            let summary = summarize_table(ctx.catalog, &table).await?;
            to_json(&summary)
        }
        other => Err(RowsmithError::UnknownTool {
            name: other.to_string(),
        }),
    }
}

fn table_arg(args: &Json) -> Result<String> {
    match args.get("table") {
        Some(Json::String(table)) if !table.trim().is_empty() => Ok(table.clone()),
        Some(Json::String(_)) => Err(RowsmithError::invalid_argument("table must not be empty")),
        Some(_) => Err(RowsmithError::invalid_argument("table must be a string")),
        None => Err(RowsmithError::invalid_argument("missing required argument 'table'")),
    }
}

/// `count` must be a whole number; range is checked by the request itself.
fn count_arg(args: &Json) -> Result<u64> {
    let Some(count) = args.get("count") else {
        return Err(RowsmithError::invalid_argument("missing required argument 'count'"));
    };
    if let Some(n) = count.as_u64() {
        return Ok(n);
    }
    match count.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        Some(f) if f < 0.0 => Ok(0),
        _ => Err(RowsmithError::invalid_argument(format!(
            "count must be an integer, got {}",
            count
        ))),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Json> {
    serde_json::to_value(value).map_err(|e| RowsmithError::Other(format!("Failed to encode result: {}", e)))
}
