use std::io::Read;

use csv::ReaderBuilder;

use crate::margin::report::error::Result;
use crate::margin::report::io::table::{RawTable, TableKind};

/// Reads delimited text with a mandatory header row.
///
/// Rows with a different field count than the header are rejected by the
/// reader. Header names are trimmed; cell values are kept verbatim.
pub fn read_table<R: Read>(reader: R, kind: TableKind, delimiter: u8) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr
        .headers()?
        .iter()
        .map(|header| header.trim().trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut table = RawTable::new(kind, headers);

    for record in rdr.records() {
        let record = record?;
        table
            .rows
            .push(record.iter().map(str::to_string).collect());
    }

    Ok(table)
}
