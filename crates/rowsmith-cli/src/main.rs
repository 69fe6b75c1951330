use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod commands;
mod connect;

use args::{Cli, Command};

#[tokio::main]
async fn main() {
    // Load .env file if present, before clap reads DATABASE_URL
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let result = match &cli.command {
        Command::Generate(args) => commands::generate::run(args).await,
        Command::Diagram(args) => commands::diagram::run(args).await,
        Command::Cycles(args) => commands::cycles::run(args).await,
        Command::Relations(args) => commands::relations::run(args).await,
        Command::Summarize(args) => commands::summarize::run(args).await,
        Command::Tools => commands::tools::list(),
        Command::Call(args) => commands::tools::call(args).await,
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
