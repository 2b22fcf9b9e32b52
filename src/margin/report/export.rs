//! Delimited-text export of the result table.

use std::collections::HashMap;

use csv::{ReaderBuilder, WriterBuilder};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::margin::report::config::ColumnMapping;
use crate::margin::report::error::{ReportError, Result};
use crate::margin::report::model::{AggregatedRow, Category};

/// File name offered for the exported result.
pub const EXPORT_FILE_NAME: &str = "gewinnanalyse.csv";

/// Encodes the rows as comma-separated UTF-8 text with a header row and no
/// index column. Identical rows always encode to identical bytes.
pub fn encode_csv(rows: &[AggregatedRow], mapping: &ColumnMapping) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(mapping.export_headers())?;

    for row in rows {
        writer.write_record([
            row.sku.clone(),
            row.name.clone(),
            row.total_units.to_string(),
            row.total_profit.to_string(),
            row.category.label().to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|err| ReportError::Io(err.into_error()))
}

/// Decodes text produced by [`encode_csv`] back into rows.
pub fn decode_csv(bytes: &[u8], mapping: &ColumnMapping) -> Result<Vec<AggregatedRow>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let headers = reader.headers()?.clone();

    let [sku, name, units, profit, category] = mapping.export_headers();
    let position = |column: &str| {
        headers
            .iter()
            .position(|header| header == column)
            .ok_or_else(|| ReportError::MalformedExport(format!("missing column '{column}'")))
    };
    let sku_col = position(sku)?;
    let name_col = position(name)?;
    let units_col = position(units)?;
    let profit_col = position(profit)?;
    let category_col = position(category)?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let field = |col: usize| record.get(col).unwrap_or_default();
        let invalid = |column: &str, col: usize| {
            ReportError::MalformedExport(format!(
                "invalid value '{}' in column '{column}', row {}",
                field(col),
                idx + 1
            ))
        };

        rows.push(AggregatedRow {
            sku: field(sku_col).to_string(),
            name: field(name_col).to_string(),
            total_units: field(units_col)
                .parse()
                .map_err(|_| invalid(units, units_col))?,
            total_profit: field(profit_col)
                .parse()
                .map_err(|_| invalid(profit, profit_col))?,
            category: Category::from_label(field(category_col))
                .ok_or_else(|| invalid(category, category_col))?,
        });
    }

    Ok(rows)
}

/// `sha256:<hex>` digest over a canonical JSON encoding of the rows.
pub fn content_hash(rows: &[AggregatedRow]) -> Result<String> {
    let canonical = serde_json::to_vec(rows)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(format!("sha256:{:x}", hasher.finalize()))
}

/// Caller-owned memo of CSV encodings keyed by the content hash of the rows.
#[derive(Debug, Default)]
pub struct ExportCache {
    mapping: ColumnMapping,
    entries: HashMap<String, Vec<u8>>,
}

impl ExportCache {
    pub fn new(mapping: ColumnMapping) -> Self {
        Self {
            mapping,
            entries: HashMap::new(),
        }
    }

    /// Returns the cached encoding for these rows, encoding them on a miss.
    pub fn get_or_encode(&mut self, rows: &[AggregatedRow]) -> Result<&[u8]> {
        let key = content_hash(rows)?;
        if !self.entries.contains_key(&key) {
            debug!(hash = %key, "encoding export");
            let encoded = encode_csv(rows, &self.mapping)?;
            self.entries.insert(key.clone(), encoded);
        }
        Ok(self.entries[&key].as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<AggregatedRow> {
        vec![
            AggregatedRow {
                sku: "A1".into(),
                name: "Widget, large".into(),
                total_units: 4,
                total_profit: 145.0,
                category: Category::Top,
            },
            AggregatedRow {
                sku: "B2".into(),
                name: "Gadget".into(),
                total_units: 2,
                total_profit: -12.35,
                category: Category::Loss,
            },
        ]
    }

    #[test]
    fn encodes_header_and_rows() {
        let encoded = encode_csv(&rows(), &ColumnMapping::default()).unwrap();
        let text = String::from_utf8(encoded).unwrap();
        assert_eq!(
            text,
            "SKU,Produktname,Verkaufte_Anzahl,Gewinn,Kategorie\n\
             A1,\"Widget, large\",4,145,Top-Produkt\n\
             B2,Gadget,2,-12.35,Verlust-Produkt\n"
        );
    }

    #[test]
    fn decode_reproduces_rows() {
        let mapping = ColumnMapping::default();
        let encoded = encode_csv(&rows(), &mapping).unwrap();
        assert_eq!(decode_csv(&encoded, &mapping).unwrap(), rows());
        assert_eq!(encode_csv(&rows(), &mapping).unwrap(), encoded);
    }

    #[test]
    fn empty_result_encodes_header_only() {
        let encoded = encode_csv(&[], &ColumnMapping::default()).unwrap();
        assert_eq!(encoded, b"SKU,Produktname,Verkaufte_Anzahl,Gewinn,Kategorie\n");
    }

    #[test]
    fn unknown_category_label_fails_decoding() {
        let data = b"SKU,Produktname,Verkaufte_Anzahl,Gewinn,Kategorie\nA1,W,1,2,Bestseller\n";
        let err = decode_csv(data, &ColumnMapping::default()).unwrap_err();
        assert!(matches!(err, ReportError::MalformedExport(_)));
    }

    #[test]
    fn cache_reuses_identical_results() {
        let mut cache = ExportCache::new(ColumnMapping::default());
        let first = cache.get_or_encode(&rows()).unwrap().to_vec();
        let second = cache.get_or_encode(&rows()).unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        cache.get_or_encode(&rows()[..1]).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn content_hash_tracks_values() {
        let mut changed = rows();
        changed[0].total_profit = 146.0;
        assert_ne!(content_hash(&rows()).unwrap(), content_hash(&changed).unwrap());
        assert!(content_hash(&rows()).unwrap().starts_with("sha256:"));
    }
}
