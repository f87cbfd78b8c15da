use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use pdf_tabelas::{
    DEFAULT_OUTPUT_FOLDER, DEFAULT_PREVIEW_ROWS, ExportFormat, PageSelection, RunOptions,
    RunOutcome, TableExtractor, run_with_fallback,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdf2tables",
    version,
    about = "Extract, clean and export the tables of a text PDF"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Detect tables (lattice, then stream), clean them and save one file per table.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input PDF path.
    #[arg(short, long, default_value = "eOuve - Limeria.pdf")]
    input: PathBuf,

    /// Pages to scan: all, 1, 1-3 or 1,3,5.
    #[arg(long, default_value = "all")]
    pages: String,

    /// Output format: csv, excel or json.
    #[arg(short, long, default_value = "csv")]
    format: String,

    /// Folder receiving one file per table.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FOLDER)]
    output_dir: PathBuf,

    /// Rows shown per table in the console preview.
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    max_rows: usize,

    /// Skip the console preview.
    #[arg(long)]
    no_preview: bool,
}

fn parse_options(args: &ExtractArgs) -> Result<RunOptions> {
    let pages = PageSelection::from_str(&args.pages)
        .map_err(|error| anyhow!("invalid page selection: {error}"))
        .context("failed to parse --pages")?;
    let format = ExportFormat::from_str(&args.format)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --format")?;

    Ok(RunOptions {
        pages,
        format,
        output_folder: args.output_dir.clone(),
        preview_rows: (!args.no_preview).then_some(args.max_rows),
    })
}

fn run_extract(args: &ExtractArgs) -> Result<RunOutcome> {
    let options = parse_options(args)?;
    let mut extractor = TableExtractor::new(&args.input);
    Ok(run_with_fallback(&mut extractor, &options))
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
    match cli.command {
        Commands::Extract(args) => match run_extract(&args) {
            Ok(RunOutcome::NoTables) => ExitCode::from(2),
            Ok(RunOutcome::Exported(summary)) if summary.written.is_empty() => {
                eprintln!("error: none of the {} table(s) could be saved", summary.failed);
                ExitCode::from(1)
            }
            Ok(RunOutcome::Exported(_)) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
