//! declargs - parse arguments against a record schema given as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use declargs::{generate_help, try_parse_value_from, Error, ParseOptions, RecordSchema};
use tracing_subscriber::EnvFilter;

/// Parse command-line arguments against a declared record schema.
#[derive(Parser, Debug)]
#[command(name = "declargs", version, about, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse arguments and print the resulting record as JSON
    Parse {
        /// JSON record schema
        #[arg(long)]
        schema: String,

        /// Program name shown in usage and errors
        #[arg(long)]
        prog: Option<String>,

        /// Accept a --file option with default values
        #[arg(long)]
        load_from_file: bool,

        /// Arguments to parse against the schema
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print help text for the schema's parser
    Help {
        /// JSON record schema
        #[arg(long)]
        schema: String,

        /// Program name shown in usage
        #[arg(long)]
        prog: Option<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            schema,
            prog,
            load_from_file,
            args,
        } => {
            let schema = RecordSchema::from_json(&schema).context("failed to parse schema JSON")?;
            let options = ParseOptions {
                prog,
                load_from_file,
                ..ParseOptions::default()
            };
            let instance = match try_parse_value_from(&schema, args, &options) {
                Err(Error::Cli(e)) => e.exit(),
                other => other.context("failed to parse arguments")?,
            };
            let json = serde_json::to_string_pretty(&instance).context("failed to serialize record")?;
            println!("{}", json);
        }
        Commands::Help { schema, prog } => {
            let schema = RecordSchema::from_json(&schema).context("failed to parse schema JSON")?;
            let options = ParseOptions {
                prog,
                ..ParseOptions::default()
            };
            print!("{}", generate_help(&schema, &options).context("invalid schema")?);
        }
    }

    Ok(())
}
