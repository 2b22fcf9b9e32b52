use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::margin::report::error::{ReportError, Result};
use crate::margin::report::io::{csv_read, excel_read};

/// Which of the two inputs a table is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Sales,
    Reference,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Sales => write!(f, "sales"),
            TableKind::Reference => write!(f, "reference"),
        }
    }
}

/// Untyped table as read from disk: one header row plus string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub kind: TableKind,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(kind: TableKind, headers: Vec<String>) -> Self {
        Self {
            kind,
            headers,
            rows: Vec::new(),
        }
    }

    /// Position of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Position of the named column or a [`ReportError::MissingColumn`].
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| ReportError::MissingColumn {
                table: self.kind,
                column: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Supported on-disk table encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Delimited,
    Excel,
}

/// Infers the table format from the file extension. Anything that is not an
/// Excel workbook is read as delimited text.
pub fn detect_format(path: &Path) -> TableFormat {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => TableFormat::Excel,
        _ => TableFormat::Delimited,
    }
}

/// Loads a table from disk, choosing the reader from the file extension.
pub fn read_table(path: &Path, kind: TableKind, delimiter: u8) -> Result<RawTable> {
    if !path.exists() {
        return Err(ReportError::MissingInput(path.to_path_buf()));
    }

    match detect_format(path) {
        TableFormat::Excel => excel_read::read_table(path, kind),
        TableFormat::Delimited => {
            let file = File::open(path)?;
            csv_read::read_table(BufReader::new(file), kind, delimiter)
        }
    }
}
