//! Joins sales records to the product reference table.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::margin::report::model::{ProductInfo, ReconciledRow, SalesRecord, Sku};

/// SKUs present in the sales export but absent from the reference table.
pub fn find_unmatched_identifiers(sales: &[SalesRecord], products: &[ProductInfo]) -> BTreeSet<Sku> {
    let known: HashSet<&str> = products.iter().map(|product| product.sku.as_str()).collect();
    sales
        .iter()
        .filter(|sale| !known.contains(sale.sku.as_str()))
        .map(|sale| sale.sku.clone())
        .collect()
}

/// Inner join on SKU.
///
/// Every sales record is paired with each product sharing its SKU, so a
/// duplicated reference entry multiplies the sale. Sales without a product
/// are dropped. Output follows sales order, then reference order.
pub fn join(sales: &[SalesRecord], products: &[ProductInfo]) -> Vec<ReconciledRow> {
    let mut by_sku: HashMap<&str, Vec<&ProductInfo>> = HashMap::new();
    for product in products {
        by_sku.entry(product.sku.as_str()).or_default().push(product);
    }

    sales
        .iter()
        .flat_map(|sale| {
            by_sku
                .get(sale.sku.as_str())
                .into_iter()
                .flatten()
                .map(move |product| ReconciledRow::from_pair(sale, product))
        })
        .collect()
}

/// Human-readable notice about SKUs that still need reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedWarning {
    pub skus: Vec<Sku>,
}

impl UnmatchedWarning {
    /// Returns `None` when every sold SKU is known.
    pub fn from_unmatched(unmatched: &BTreeSet<Sku>) -> Option<Self> {
        if unmatched.is_empty() {
            None
        } else {
            Some(Self {
                skus: unmatched.iter().cloned().collect(),
            })
        }
    }
}

impl fmt::Display for UnmatchedWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Neue SKUs gefunden, bitte Produktinfos aktualisieren für: {}",
            self.skus.join(", ")
        )
    }
}
