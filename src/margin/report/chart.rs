//! Bar chart description handed to an external renderer.

use serde::{Deserialize, Serialize};

use crate::margin::report::model::{AggregatedRow, Category};

pub const CHART_TITLE: &str = "Gewinn nach Produkt";
pub const VALUE_AXIS_LABEL: &str = "Gewinn";
pub const CATEGORY_AXIS_LABEL: &str = "Produktname";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
}

/// One bar: label = product name, length = total profit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub category: Category,
}

/// Chart specification. Bars are listed top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub orientation: Orientation,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Builds a horizontal bar chart from rows already sorted for display, so
    /// the largest profit ends up nearest the top.
    pub fn from_rows(rows: &[AggregatedRow]) -> Self {
        Self {
            title: CHART_TITLE.to_string(),
            x_label: VALUE_AXIS_LABEL.to_string(),
            y_label: CATEGORY_AXIS_LABEL.to_string(),
            orientation: Orientation::Horizontal,
            bars: rows
                .iter()
                .map(|row| Bar {
                    label: row.name.clone(),
                    value: row.total_profit,
                    category: row.category,
                })
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
