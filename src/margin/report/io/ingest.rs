use crate::margin::report::config::ColumnMapping;
use crate::margin::report::error::{ReportError, Result};
use crate::margin::report::io::table::{RawTable, TableKind};
use crate::margin::report::model::{ProductInfo, SalesRecord};

/// Table that supplies the other-fees column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeSource {
    Sales,
    Reference,
}

/// Decides which table carries the other-fees column. Exactly one of them must.
pub fn resolve_fee_source(
    sales: &RawTable,
    reference: &RawTable,
    mapping: &ColumnMapping,
) -> Result<FeeSource> {
    let column = mapping.other_fees.as_str();
    match (
        sales.column_index(column).is_some(),
        reference.column_index(column).is_some(),
    ) {
        (true, false) => Ok(FeeSource::Sales),
        (false, true) => Ok(FeeSource::Reference),
        (true, true) => Err(ReportError::AmbiguousColumn {
            column: column.to_string(),
        }),
        (false, false) => Err(ReportError::MissingColumn {
            table: TableKind::Sales,
            column: column.to_string(),
        }),
    }
}

/// Converts both raw tables into typed records.
pub fn parse_inputs(
    sales: &RawTable,
    reference: &RawTable,
    mapping: &ColumnMapping,
) -> Result<(Vec<SalesRecord>, Vec<ProductInfo>)> {
    // Column presence is checked before the fee lookup so a table missing its
    // key columns reports those first.
    require_columns(sales, mapping)?;
    require_columns(reference, mapping)?;

    let source = resolve_fee_source(sales, reference, mapping)?;
    let sales_records = parse_sales(sales, mapping, source == FeeSource::Sales)?;
    let products = parse_products(reference, mapping, source == FeeSource::Reference)?;
    Ok((sales_records, products))
}

/// Parses the sales export. `with_other_fees` reads the other-fees column too.
pub fn parse_sales(
    table: &RawTable,
    mapping: &ColumnMapping,
    with_other_fees: bool,
) -> Result<Vec<SalesRecord>> {
    let sku = table.require_column(&mapping.sku)?;
    let price = table.require_column(&mapping.unit_price)?;
    let fee = table.require_column(&mapping.platform_fee)?;
    let units = table.require_column(&mapping.units_sold)?;
    let other = if with_other_fees {
        Some(table.require_column(&mapping.other_fees)?)
    } else {
        None
    };

    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let cells = RowCells { table, row, number: idx + 1 };
            Ok(SalesRecord {
                sku: cells.text(sku),
                unit_price: cells.decimal(price)?,
                platform_fee: cells.decimal(fee)?,
                units_sold: cells.count(units)?,
                other_fees: other.map(|col| cells.decimal(col)).transpose()?,
            })
        })
        .collect()
}

/// Parses the product reference table. `with_other_fees` reads the other-fees
/// column too.
pub fn parse_products(
    table: &RawTable,
    mapping: &ColumnMapping,
    with_other_fees: bool,
) -> Result<Vec<ProductInfo>> {
    let sku = table.require_column(&mapping.sku)?;
    let name = table.require_column(&mapping.product_name)?;
    let cost = table.require_column(&mapping.unit_cost)?;
    let other = if with_other_fees {
        Some(table.require_column(&mapping.other_fees)?)
    } else {
        None
    };

    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let cells = RowCells { table, row, number: idx + 1 };
            Ok(ProductInfo {
                sku: cells.text(sku),
                name: cells.text(name),
                unit_cost: cells.decimal(cost)?,
                other_fees: other.map(|col| cells.decimal(col)).transpose()?,
            })
        })
        .collect()
}

fn require_columns(table: &RawTable, mapping: &ColumnMapping) -> Result<()> {
    for column in mapping.columns_for(table.kind) {
        table.require_column(column)?;
    }
    Ok(())
}

struct RowCells<'a> {
    table: &'a RawTable,
    row: &'a [String],
    number: usize,
}

impl RowCells<'_> {
    fn raw(&self, col: usize) -> &str {
        self.row.get(col).map(String::as_str).unwrap_or_default()
    }

    fn text(&self, col: usize) -> String {
        self.raw(col).to_string()
    }

    fn decimal(&self, col: usize) -> Result<f64> {
        let value = self.raw(col).trim();
        match value.parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(number),
            _ => Err(self.invalid(col)),
        }
    }

    fn count(&self, col: usize) -> Result<u64> {
        self.raw(col)
            .trim()
            .parse::<u64>()
            .map_err(|_| self.invalid(col))
    }

    fn invalid(&self, col: usize) -> ReportError {
        ReportError::InvalidNumber {
            table: self.table.kind,
            column: self.table.headers.get(col).cloned().unwrap_or_default(),
            row: self.number,
            value: self.raw(col).to_string(),
        }
    }
}
