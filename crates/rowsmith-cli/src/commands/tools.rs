use anyhow::{Context, Result};

use rowsmith_core::tools::{self, ToolContext};

use crate::args::CallArgs;
use crate::connect::{self, Catalog};

/// Print every tool descriptor as JSON.
pub fn list() -> Result<()> {
    let config = connect::load_config()?;
    let settings = connect::settings(&config)?;
    let descriptors = tools::descriptors(settings.max_rows);
    println!("{}", serde_json::to_string_pretty(&descriptors)?);
    Ok(())
}

/// Run one tool; failures print the `{code, message}` error object.
pub async fn call(args: &CallArgs) -> Result<()> {
    let tool_args: serde_json::Value =
        serde_json::from_str(&args.args).context("--args must be a JSON object")?;

    let config = connect::load_config()?;
    let settings = connect::settings(&config)?;
    let url = connect::resolve_url(&args.db, &config)?;

    let result = match connect::open(&url).await? {
        Catalog::MySql(catalog) => {
            tools::call(&ToolContext::new(&catalog, settings), &args.name, &tool_args).await
        }
        Catalog::Sqlite(catalog) => {
            tools::call(&ToolContext::new(&catalog, settings), &args.name, &tool_args).await
        }
    };

    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&err)?);
            Err(err.into())
        }
    }
}
