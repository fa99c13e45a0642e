//! # vectorsql: Vector SQL from the command line
//!
//! Asks questions of a SQLite database with vector-aware SQL, and generates
//! small synthetic datasets. Logs go to stderr, results to stdout as JSON.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{handle_generate, handle_query, QueryOptions};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vectorsql::ExecutionMode;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a YAML configuration file. Defaults to `vectorsql.yml` if present.
    #[arg(long, global = true, env = "VECTORSQL_CONFIG")]
    config: Option<String>,
    /// Log chain progress at `info` level (`RUST_LOG` takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question with vector SQL
    Query(QueryArgs),
    /// Print the executable SQL for a question without running it
    Sql(SqlArgs),
    /// Generate one sentence per field-set
    Generate(GenerateArgs),
}

#[derive(Parser, Debug)]
struct QueryArgs {
    question: String,
    /// Only describe these tables to the model
    #[arg(long, value_delimiter = ',')]
    tables: Option<Vec<String>>,
    /// Return the rows instead of an answer
    #[arg(long)]
    direct: bool,
    /// Let the model review the SQL before it runs
    #[arg(long)]
    check: bool,
    /// Include intermediate steps in the output
    #[arg(long)]
    steps: bool,
}

#[derive(Parser, Debug)]
struct SqlArgs {
    question: String,
    #[arg(long, value_delimiter = ',')]
    tables: Option<Vec<String>>,
    #[arg(long)]
    steps: bool,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// JSON file holding an array of field arrays
    #[arg(long)]
    input: PathBuf,
    /// JSON file holding an object of sentence preferences
    #[arg(long)]
    preferences: Option<PathBuf>,
}

/// The log level used when `RUST_LOG` is not set.
fn default_log_directive(verbose: bool) -> &'static str {
    if verbose {
        "info"
    } else {
        "warn"
    }
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_directive(cli.verbose)));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let config = config::get_config(cli.config.as_deref())?;
    info!(db_url = %config.db_url, provider = %config.ai.provider, "Configuration loaded.");

    match cli.command {
        Commands::Query(args) => {
            let mode = if args.direct {
                ExecutionMode::ReturnDirect
            } else {
                ExecutionMode::Answer
            };
            let options = QueryOptions {
                tables: args.tables,
                mode,
                check: args.check,
                steps: args.steps,
                verbose: cli.verbose,
            };
            handle_query(&config, &args.question, options).await
        }
        Commands::Sql(args) => {
            let options = QueryOptions {
                tables: args.tables,
                mode: ExecutionMode::ReturnSql,
                check: false,
                steps: args.steps,
                verbose: cli.verbose,
            };
            handle_query(&config, &args.question, options).await
        }
        Commands::Generate(args) => {
            handle_generate(&config, &args.input, args.preferences.as_deref()).await
        }
    }
}
