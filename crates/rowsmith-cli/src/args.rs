use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "rowsmith",
    about = "Fill database tables with realistic, foreign-key-safe test data",
    version,
    after_help = "Examples:\n  rowsmith generate posts --count 50 --db mysql://root@localhost/blog\n  rowsmith generate users --count 10       # DATABASE_URL from .env or rowsmith.toml\n  rowsmith diagram --format mermaid\n  rowsmith relations posts\n  rowsmith summarize users\n  rowsmith call generateTestData --args '{\"table\": \"posts\", \"count\": 5}'"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Insert synthetic rows into a table, seeding referenced tables first
    Generate(GenerateArgs),

    /// Print the schema as a node/edge graph
    Diagram(DiagramArgs),

    /// List reference cycles between tables
    Cycles(DbArgs),

    /// Show the foreign keys leaving and entering a table
    Relations(TableArgs),

    /// Show row count and per-column value statistics of a table
    Summarize(TableArgs),

    /// List the tools callable with `rowsmith call`
    Tools,

    /// Run a tool with a JSON argument object
    Call(CallArgs),
}

#[derive(Parser, Debug)]
pub struct DbArgs {
    /// Database connection URL (mysql://, mariadb://, sqlite://)
    /// Falls back to DATABASE_URL env var, .env file or rowsmith.toml
    #[arg(long, env = "DATABASE_URL")]
    pub db: Option<String>,
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Table to insert rows into
    pub table: String,

    /// Number of rows to insert
    #[arg(short, long, default_value = "10")]
    pub count: u64,

    #[command(flatten)]
    pub db: DbArgs,

    /// Random seed for deterministic generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Rows inserted into each under-populated ancestor table
    #[arg(long)]
    pub seed_rows: Option<u64>,

    /// Ancestors with fewer rows than this get seeded
    #[arg(long)]
    pub min_parent_rows: Option<u64>,

    /// Print the inserted rows as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct DiagramArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Output format for the schema graph
    #[arg(long, default_value = "json")]
    pub format: DiagramFormat,
}

#[derive(Parser, Debug)]
pub struct TableArgs {
    /// Table name
    pub table: String,

    #[command(flatten)]
    pub db: DbArgs,

    /// Output format
    #[arg(long, default_value = "table")]
    pub format: ReportFormat,
}

#[derive(Parser, Debug)]
pub struct CallArgs {
    /// Tool name, e.g. generateTestData
    pub name: String,

    /// Tool arguments as a JSON object
    #[arg(long, default_value = "{}")]
    pub args: String,

    #[command(flatten)]
    pub db: DbArgs,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum DiagramFormat {
    Json,
    Mermaid,
    Dot,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ReportFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "rowsmith", "generate", "posts", "--count", "5", "--seed", "42", "--db", "sqlite::memory:",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.table, "posts");
        assert_eq!(args.count, 5);
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.db.db.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn test_parse_call_defaults() {
        let cli = Cli::try_parse_from(["rowsmith", "call", "generateSchemaDiagram", "-v"]).unwrap();
        assert!(cli.verbose);
        let Command::Call(args) = cli.command else {
            panic!("expected call");
        };
        assert_eq!(args.args, "{}");
    }
}
