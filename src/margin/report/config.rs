use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::margin::report::error::Result;
use crate::margin::report::io::table::TableKind;

/// Header names of the marketplace export and reference table.
///
/// The defaults are the headers the marketplace export ships with. Any subset
/// can be overridden from a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub sku: String,
    pub unit_price: String,
    pub platform_fee: String,
    pub other_fees: String,
    pub units_sold: String,
    pub product_name: String,
    pub unit_cost: String,
    /// Export header for the summed units.
    pub total_units: String,
    /// Export header for the summed profit.
    pub total_profit: String,
    /// Export header for the assigned tier.
    pub category: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            sku: "SKU".into(),
            unit_price: "Preis".into(),
            platform_fee: "Amazon_Gebuehren".into(),
            other_fees: "Sonstige_Gebuehren".into(),
            units_sold: "Verkaufte_Anzahl".into(),
            product_name: "Produktname".into(),
            unit_cost: "Einkaufspreis".into(),
            total_units: "Verkaufte_Anzahl".into(),
            total_profit: "Gewinn".into(),
            category: "Kategorie".into(),
        }
    }
}

impl ColumnMapping {
    /// Loads a mapping from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Columns a table must carry regardless of where other fees live.
    pub fn columns_for(&self, kind: TableKind) -> Vec<&str> {
        match kind {
            TableKind::Sales => vec![
                self.sku.as_str(),
                self.unit_price.as_str(),
                self.platform_fee.as_str(),
                self.units_sold.as_str(),
            ],
            TableKind::Reference => vec![
                self.sku.as_str(),
                self.product_name.as_str(),
                self.unit_cost.as_str(),
            ],
        }
    }

    /// Header row of the exported result table.
    pub fn export_headers(&self) -> [&str; 5] {
        [
            self.sku.as_str(),
            self.product_name.as_str(),
            self.total_units.as_str(),
            self.total_profit.as_str(),
            self.category.as_str(),
        ]
    }
}

/// Options controlling how input tables are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub columns: ColumnMapping,
    /// Field delimiter of delimited-text inputs.
    pub delimiter: u8,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            delimiter: b',',
        }
    }
}
