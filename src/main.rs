use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use social_merge::config::{
    DEFAULT_DATABASE, DEFAULT_INPUT_DIR, DEFAULT_WORKBOOK, FileOrder, MergeConfig,
};
use social_merge::pipeline::{self, MergeSummary};
use social_merge::{MergeError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    let summary_format = cli.summary;
    let config = MergeConfig::from(cli);
    let summary = pipeline::run(&config)?;
    match summary_format {
        SummaryFormat::Text => print_summary(&config, &summary),
        SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| MergeError::Logging(error.to_string()))
}

fn print_summary(config: &MergeConfig, summary: &MergeSummary) {
    println!("Merging complete!");
    println!("Total files processed: {}", summary.files_processed);
    println!("Posts remapped: {}", summary.posts_remapped);
    println!("Comments assigned: {}", summary.comments_assigned);
    println!("Tables written: {}", summary.tables);
    println!("Merged SQLite database: {}", config.database.display());
    println!("Merged Excel file: {}", config.workbook.display());
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge annotated social media workbooks into one dataset."
)]
struct Cli {
    /// Directory holding the source `.xlsx` workbooks.
    #[arg(long, default_value = DEFAULT_INPUT_DIR)]
    input_dir: PathBuf,

    /// SQLite database to write.
    #[arg(long, default_value = DEFAULT_DATABASE)]
    database: PathBuf,

    /// Excel workbook to write.
    #[arg(long, default_value = DEFAULT_WORKBOOK)]
    workbook: PathBuf,

    /// Order in which source workbooks receive identifiers.
    #[arg(long, value_enum, default_value_t = OrderKind::Name)]
    order: OrderKind,

    /// How the end-of-run summary is printed.
    #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
    summary: SummaryFormat,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SummaryFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OrderKind {
    Name,
    Listing,
}

impl From<OrderKind> for FileOrder {
    fn from(kind: OrderKind) -> Self {
        match kind {
            OrderKind::Name => FileOrder::Name,
            OrderKind::Listing => FileOrder::Listing,
        }
    }
}

impl From<Cli> for MergeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            input_dir: cli.input_dir,
            database: cli.database,
            workbook: cli.workbook,
            order: cli.order.into(),
        }
    }
}
