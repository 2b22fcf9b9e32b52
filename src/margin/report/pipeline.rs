use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::margin::report::chart::BarChart;
use crate::margin::report::classify::{aggregate, classify, profit_rows, sort_by_profit_desc};
use crate::margin::report::config::ReportOptions;
use crate::margin::report::error::{ReportError, Result};
use crate::margin::report::export::encode_csv;
use crate::margin::report::io::excel_write;
use crate::margin::report::io::ingest::parse_inputs;
use crate::margin::report::io::table::{RawTable, TableKind, read_table};
use crate::margin::report::model::{ProductInfo, ProfitReport, SalesRecord};
use crate::margin::report::reconcile::{find_unmatched_identifiers, join};

/// Joins, aggregates, classifies and sorts one pair of inputs.
///
/// Each call is independent: thresholds come from this result set only.
/// A pair where neither the sale nor the product carries other fees is
/// computed with zero other fees. Table ingestion rejects such inputs, so this
/// only applies to records built directly.
#[instrument(level = "debug", skip_all, fields(sales = sales.len(), products = products.len()))]
pub fn compute_report(sales: &[SalesRecord], products: &[ProductInfo]) -> Result<ProfitReport> {
    let unmatched = find_unmatched_identifiers(sales, products);
    if !unmatched.is_empty() {
        info!(count = unmatched.len(), "sold SKUs missing from the reference table");
    }

    let joined = join(sales, products);
    debug!(joined_rows = joined.len(), "sales reconciled against reference table");

    let with_profit = profit_rows(joined)?;
    let mut rows = aggregate(&with_profit)?;
    let thresholds = classify(&mut rows);
    if let Some(cut_points) = thresholds {
        debug!(upper = cut_points.upper, lower = cut_points.lower, "profit thresholds");
    }
    sort_by_profit_desc(&mut rows);

    Ok(ProfitReport {
        rows,
        unmatched,
        thresholds,
    })
}

/// Parses two raw tables and computes the report from them.
pub fn compute_report_from_tables(
    sales: &RawTable,
    reference: &RawTable,
    options: &ReportOptions,
) -> Result<ProfitReport> {
    let (sales_records, products) = parse_inputs(sales, reference, &options.columns)?;
    compute_report(&sales_records, &products)
}

/// Inputs and requested artifacts of a file-based run.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub sales: PathBuf,
    pub products: PathBuf,
    /// Delimited-text export of the result table.
    pub output: PathBuf,
    /// Optional Excel copy of the result table.
    pub excel_output: Option<PathBuf>,
    /// Optional JSON bar chart specification.
    pub chart_output: Option<PathBuf>,
    pub options: ReportOptions,
}

/// Reads both inputs, computes the report and writes every requested artifact.
///
/// Nothing is written unless the whole computation succeeds.
#[instrument(
    level = "info",
    skip_all,
    fields(sales = %request.sales.display(), products = %request.products.display())
)]
pub fn analyze_files(request: &AnalyzeRequest) -> Result<ProfitReport> {
    let delimiter = request.options.delimiter;
    let sales = read_table(&request.sales, TableKind::Sales, delimiter)?;
    let reference = read_table(&request.products, TableKind::Reference, delimiter)?;
    info!(
        sales_rows = sales.len(),
        reference_rows = reference.len(),
        "input tables loaded"
    );

    let report = compute_report_from_tables(&sales, &reference, &request.options)?;
    info!(
        products = report.rows.len(),
        unmatched = report.unmatched.len(),
        "report computed"
    );

    let mut artifacts: Vec<(&Path, Vec<u8>)> = vec![(
        request.output.as_path(),
        encode_csv(&report.rows, &request.options.columns)?,
    )];
    if let Some(path) = &request.excel_output {
        let workbook = excel_write::encode_report(&report.rows, &request.options.columns)?;
        artifacts.push((path.as_path(), workbook));
    }
    if let Some(path) = &request.chart_output {
        let chart = BarChart::from_rows(&report.rows).to_json_pretty()?;
        artifacts.push((path.as_path(), chart.into_bytes()));
    }

    write_artifacts(&artifacts)?;
    Ok(report)
}

/// Writes every artifact or none of them.
///
/// Targets are checked up front; if a write still fails, files written earlier
/// in this call are removed again.
fn write_artifacts(artifacts: &[(&Path, Vec<u8>)]) -> Result<()> {
    if let Some((path, _)) = artifacts.iter().find(|(path, _)| path.is_dir()) {
        return Err(ReportError::InvalidOutput(path.to_path_buf()));
    }

    for (idx, (path, contents)) in artifacts.iter().enumerate() {
        if let Err(err) = write_artifact(path, contents) {
            for (written, _) in &artifacts[..idx] {
                if let Err(cleanup) = fs::remove_file(written) {
                    warn!(path = %written.display(), error = %cleanup, "failed to remove partial artifact");
                }
            }
            return Err(err);
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(contents), fields(path = %path.display(), bytes = contents.len()))]
fn write_artifact(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
