use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use pdf_tabelas::reshape::{DEFAULT_INPUT, DEFAULT_OUTPUT, reshape_file};
use tracing_subscriber::EnvFilter;

/// Turn a wide matrix sheet into an (id, key, y, xy) table.
#[derive(Debug, Parser)]
#[command(name = "matrix2fact", version)]
struct Cli {
    /// Workbook whose first sheet holds the matrix; the first column is the key.
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Workbook to write.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
}

fn run(cli: &Cli) -> Result<usize> {
    let records = reshape_file(&cli.input, &cli.output)
        .with_context(|| format!("failed to reshape '{}'", cli.input.display()))?;
    Ok(records.len())
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdf_tabelas=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
