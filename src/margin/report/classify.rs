//! Per-row profit, aggregation by product and quantile-based tiering.

use std::collections::HashMap;

use crate::margin::report::error::{ReportError, Result};
use crate::margin::report::model::{AggregatedRow, Category, ProfitRow, ReconciledRow, Thresholds};

/// Upper tier cut point.
pub const UPPER_QUANTILE: f64 = 0.75;
/// Lower tier cut point.
pub const LOWER_QUANTILE: f64 = 0.25;

/// Attaches the profit to every reconciled row. No row is filtered out.
pub fn profit_rows(rows: Vec<ReconciledRow>) -> Result<Vec<ProfitRow>> {
    rows.into_iter()
        .map(|row| {
            let profit = row.profit();
            if !profit.is_finite() {
                return Err(ReportError::NumericOverflow(format!("profit of SKU '{}'", row.sku)));
            }
            Ok(ProfitRow { row, profit })
        })
        .collect()
}

/// Sums units and profit per `(sku, name)` pair in first-appearance order.
///
/// Newly created rows are categorised [`Category::Middle`] until
/// [`classify`] runs.
pub fn aggregate(rows: &[ProfitRow]) -> Result<Vec<AggregatedRow>> {
    let mut positions: HashMap<(&str, &str), usize> = HashMap::new();
    let mut aggregated: Vec<AggregatedRow> = Vec::new();

    for profit_row in rows {
        let row = &profit_row.row;
        let key = (row.sku.as_str(), row.name.as_str());
        let index = *positions.entry(key).or_insert_with(|| {
            aggregated.push(AggregatedRow {
                sku: row.sku.clone(),
                name: row.name.clone(),
                total_units: 0,
                total_profit: 0.0,
                category: Category::Middle,
            });
            aggregated.len() - 1
        });

        let entry = &mut aggregated[index];
        entry.total_units = entry
            .total_units
            .checked_add(row.units_sold)
            .ok_or_else(|| {
                ReportError::NumericOverflow(format!("units sold of SKU '{}'", row.sku))
            })?;
        entry.total_profit += profit_row.profit;
        if !entry.total_profit.is_finite() {
            return Err(ReportError::NumericOverflow(format!(
                "total profit of SKU '{}'",
                row.sku
            )));
        }
    }

    Ok(aggregated)
}

/// Quantile with linear interpolation between the closest ranks.
///
/// For sorted values `v` of length `n` the position is `q * (n - 1)`; the
/// result interpolates between the neighbouring values. Returns `None` for an
/// empty slice.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Cut points over the aggregated profit column, `None` without rows.
pub fn thresholds(rows: &[AggregatedRow]) -> Option<Thresholds> {
    let profits: Vec<f64> = rows.iter().map(|row| row.total_profit).collect();
    Some(Thresholds {
        upper: quantile(&profits, UPPER_QUANTILE)?,
        lower: quantile(&profits, LOWER_QUANTILE)?,
    })
}

/// Tier for one profit. The upper check wins; values equal to a cut point are
/// [`Category::Middle`].
pub fn category_for(profit: f64, thresholds: Thresholds) -> Category {
    if profit > thresholds.upper {
        Category::Top
    } else if profit < thresholds.lower {
        Category::Loss
    } else {
        Category::Middle
    }
}

/// Assigns a tier to every row using thresholds computed from these rows.
pub fn classify(rows: &mut [AggregatedRow]) -> Option<Thresholds> {
    let cut_points = thresholds(rows)?;
    for row in rows.iter_mut() {
        row.category = category_for(row.total_profit, cut_points);
    }
    Some(cut_points)
}

/// Orders rows by total profit, largest first. Ties keep their relative order.
pub fn sort_by_profit_desc(rows: &mut [AggregatedRow]) {
    rows.sort_by(|lhs, rhs| rhs.total_profit.total_cmp(&lhs.total_profit));
}
