use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::margin::report::error::{ReportError, Result};
use crate::margin::report::io::table::{RawTable, TableKind};

/// Reads the first worksheet of an Excel workbook into a [`RawTable`].
///
/// The first row is the header row. Rows whose cells are all blank are
/// skipped, which drops the trailing filler rows spreadsheets tend to keep.
pub fn read_table(path: &Path, kind: TableKind) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            ReportError::InvalidWorkbook(format!("{} contains no worksheet", path.display()))
        })?
        .map_err(ReportError::from)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| cell_to_string(Some(cell)).trim().to_string())
            .collect(),
        None => Vec::new(),
    };

    let mut table = RawTable::new(kind, headers);
    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| cell_to_string(Some(cell))).collect();
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        table.rows.push(cells);
    }

    Ok(table)
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
