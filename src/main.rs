use std::path::PathBuf;

use clap::{Parser, Subcommand};
use margin_report::config::{ColumnMapping, ReportOptions};
use margin_report::model::ProfitReport;
use margin_report::pipeline::{self, AnalyzeRequest};
use margin_report::reconcile::UnmatchedWarning;
use margin_report::{ReportError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ReportError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze(args) => execute_analyze(args),
    }
}

fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    let columns = match &args.columns {
        Some(path) => ColumnMapping::load(path)?,
        None => ColumnMapping::default(),
    };

    let request = AnalyzeRequest {
        sales: args.sales,
        products: args.products,
        output: args.output,
        excel_output: args.xlsx,
        chart_output: args.chart,
        options: ReportOptions {
            columns,
            delimiter: args.delimiter as u8,
        },
    };

    let report = pipeline::analyze_files(&request)?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &ProfitReport) {
    if let Some(warning) = UnmatchedWarning::from_unmatched(&report.unmatched) {
        eprintln!("warning: {warning}");
    }

    println!("Gewinnübersicht mit Kategorien");
    for row in &report.rows {
        println!(
            "{:<16} {:<32} {:>8} {:>12.2}  {}",
            row.sku, row.name, row.total_units, row.total_profit, row.category
        );
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Profit analysis of marketplace sales against a product reference table."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Join sales with product data and classify products by profit.
    Analyze(AnalyzeArgs),
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Marketplace sales export (CSV or XLSX).
    #[arg(long)]
    sales: PathBuf,

    /// Product reference table (CSV or XLSX).
    #[arg(long)]
    products: PathBuf,

    /// Path of the CSV result export.
    #[arg(long, default_value = margin_report::export::EXPORT_FILE_NAME)]
    output: PathBuf,

    /// Optional path of an Excel copy of the result.
    #[arg(long)]
    xlsx: Option<PathBuf>,

    /// Optional path of the JSON bar chart specification.
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Optional JSON file overriding the expected column names.
    #[arg(long)]
    columns: Option<PathBuf>,

    /// Field delimiter of CSV inputs.
    #[arg(long, default_value_t = ',', value_parser = parse_delimiter)]
    delimiter: char,
}

fn parse_delimiter(value: &str) -> std::result::Result<char, String> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(delimiter), None) if delimiter.is_ascii() => Ok(delimiter),
        _ => Err(format!("delimiter must be a single ASCII character, got '{value}'")),
    }
}
