use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier shared by the sales export and the product reference table
/// (the marketplace SKU).
pub type Sku = String;

/// One row of the marketplace sales export. Several records may share a SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub sku: Sku,
    pub unit_price: f64,
    pub platform_fee: f64,
    pub units_sold: u64,
    /// Present when the sales export carries the other-fees column.
    pub other_fees: Option<f64>,
}

/// One row of the product reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub sku: Sku,
    pub name: String,
    pub unit_cost: f64,
    /// Present when the reference table carries the other-fees column.
    pub other_fees: Option<f64>,
}

/// A sales record joined to one matching product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRow {
    pub sku: Sku,
    pub name: String,
    pub unit_price: f64,
    pub platform_fee: f64,
    pub unit_cost: f64,
    pub other_fees: f64,
    pub units_sold: u64,
}

impl ReconciledRow {
    /// Combines a sales record with its product. Other fees come from whichever
    /// side carries them, the sales record first, and are zero when neither does.
    pub fn from_pair(sale: &SalesRecord, product: &ProductInfo) -> Self {
        Self {
            sku: sale.sku.clone(),
            name: product.name.clone(),
            unit_price: sale.unit_price,
            platform_fee: sale.platform_fee,
            unit_cost: product.unit_cost,
            other_fees: sale.other_fees.or(product.other_fees).unwrap_or(0.0),
            units_sold: sale.units_sold,
        }
    }

    /// `(price - platform fee - unit cost - other fees) * units`. May be negative.
    pub fn profit(&self) -> f64 {
        (self.unit_price - self.platform_fee - self.unit_cost - self.other_fees)
            * self.units_sold as f64
    }
}

/// A reconciled row together with its computed profit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitRow {
    #[serde(flatten)]
    pub row: ReconciledRow,
    pub profit: f64,
}

/// Profitability tier assigned to an aggregated product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Top-Produkt")]
    Top,
    #[serde(rename = "Mittel")]
    Middle,
    #[serde(rename = "Verlust-Produkt")]
    Loss,
}

impl Category {
    /// Label used in tables, charts and exports.
    pub fn label(self) -> &'static str {
        match self {
            Category::Top => "Top-Produkt",
            Category::Middle => "Mittel",
            Category::Loss => "Verlust-Produkt",
        }
    }

    /// Parses an exported label back into a category.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Top-Produkt" => Some(Category::Top),
            "Mittel" => Some(Category::Middle),
            "Verlust-Produkt" => Some(Category::Loss),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Totals for one distinct `(sku, name)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub sku: Sku,
    pub name: String,
    pub total_units: u64,
    pub total_profit: f64,
    /// Assigned during classification; `Mittel` until then.
    pub category: Category,
}

/// 75th and 25th percentile of the aggregated profit column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub upper: f64,
    pub lower: f64,
}

/// Outcome of one report computation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfitReport {
    /// Aggregated rows sorted by total profit, largest first.
    pub rows: Vec<AggregatedRow>,
    /// SKUs that appear in the sales export but not in the reference table.
    pub unmatched: BTreeSet<Sku>,
    /// `None` when there were no rows to classify.
    pub thresholds: Option<Thresholds>,
}

impl ProfitReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
