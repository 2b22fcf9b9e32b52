use rust_xlsxwriter::{Table, Workbook};

use crate::margin::report::config::ColumnMapping;
use crate::margin::report::error::Result;
use crate::margin::report::model::AggregatedRow;

/// Worksheet name used for the exported result.
pub const REPORT_SHEET: &str = "Gewinnanalyse";

/// Encodes the result rows as an `.xlsx` workbook holding one Excel table with
/// autofilter. The workbook is built in memory; the caller decides where it lands.
pub fn encode_report(rows: &[AggregatedRow], mapping: &ColumnMapping) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(REPORT_SHEET)?;

    let headers = mapping.export_headers();
    for (col_idx, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, *header)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        worksheet.write_string(excel_row, 0, &row.sku)?;
        worksheet.write_string(excel_row, 1, &row.name)?;
        worksheet.write_number(excel_row, 2, row.total_units as f64)?;
        worksheet.write_number(excel_row, 3, row.total_profit)?;
        worksheet.write_string(excel_row, 4, row.category.label())?;
    }

    // An Excel table needs at least one data row; an empty result stays a plain header.
    if !rows.is_empty() {
        let mut excel_table = Table::new();
        excel_table.set_autofilter(true);
        let col_end = (headers.len() as u16).saturating_sub(1);
        worksheet.add_table(0, 0, rows.len() as u32, col_end, &excel_table)?;
    }

    Ok(workbook.save_to_buffer()?)
}
