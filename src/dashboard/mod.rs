//! The dashboard: stock value, per-product stock status and chart data.

mod aggregation;

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use serde::Serialize;
use serde_json::json;
use time::format_description::well_known::Rfc3339;

use crate::{
    Error,
    ledger::{StockTransaction, get_all_transactions},
    product::{Product, get_all_products},
};

pub use aggregation::{LOW_STOCK_THRESHOLD, NOTIONAL_FULL_STOCK, StockLevel};

/// A consistent view of the catalog and ledger that the dashboard is derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    /// Every product, in catalog order.
    pub products: Vec<Product>,
    /// Every ledger entry, in the order it was recorded.
    pub transactions: Vec<StockTransaction>,
}

/// One row of the dashboard's inventory table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    /// The product name.
    pub name: String,
    /// The number of units in stock.
    pub quantity: u32,
    /// The unit price.
    pub price: f64,
    /// Whether the product is low on stock.
    pub stock_level: StockLevel,
    /// Units sold according to the notional full stock heuristic.
    pub sold_quantity: u32,
    /// Whether `sold_quantity` is non-zero.
    pub sold: bool,
    /// Units deducted according to the ledger.
    pub ledger_sold_quantity: u64,
}

impl DashboardSnapshot {
    /// Create a snapshot from already loaded products and transactions.
    pub fn new(products: Vec<Product>, transactions: Vec<StockTransaction>) -> Self {
        Self {
            products,
            transactions,
        }
    }

    /// The value of all stock rounded to two decimal places.
    ///
    /// Only the catalog is used, the ledger does not affect this figure.
    pub fn total_stock_value(&self) -> f64 {
        aggregation::total_stock_value(&self.products)
    }

    /// Whether `product` is low on stock.
    pub fn stock_level(&self, product: &Product) -> StockLevel {
        aggregation::stock_level(product)
    }

    /// The number of units the product is below [NOTIONAL_FULL_STOCK].
    ///
    /// This is a heuristic and can disagree with
    /// [DashboardSnapshot::ledger_sold_quantity].
    pub fn sold_quantity(&self, product: &Product) -> u32 {
        aggregation::sold_quantity(product)
    }

    /// Whether [DashboardSnapshot::sold_quantity] is non-zero.
    pub fn sold_flag(&self, product: &Product) -> bool {
        aggregation::sold_flag(product)
    }

    /// The number of units of `product` deducted according to the ledger.
    pub fn ledger_sold_quantity(&self, product: &Product) -> u64 {
        aggregation::ledger_sold_quantity(&product.id, &self.transactions)
    }

    /// (name, quantity) pairs for the stock overview chart, in catalog order.
    pub fn chart_series(&self) -> Vec<(String, u32)> {
        aggregation::chart_series(&self.products)
    }

    /// The inventory table rows, in catalog order.
    pub fn product_rows(&self) -> Vec<ProductRow> {
        self.products
            .iter()
            .map(|product| ProductRow {
                name: product.name.clone(),
                quantity: product.quantity,
                price: product.price,
                stock_level: self.stock_level(product),
                sold_quantity: self.sold_quantity(product),
                sold: self.sold_flag(product),
                ledger_sold_quantity: self.ledger_sold_quantity(product),
            })
            .collect()
    }

    /// The stock value, inventory table, chart series and ledger as pretty
    /// printed JSON. Timestamps are written in RFC 3339 format.
    ///
    /// # Errors
    /// Returns [Error::JSONSerializationError] if a timestamp cannot be
    /// written as RFC 3339 or the report cannot be serialized.
    pub fn to_json(&self) -> Result<String, Error> {
        let transactions = self
            .transactions
            .iter()
            .map(|entry| {
                let timestamp = entry.timestamp.format(&Rfc3339).map_err(|error| {
                    tracing::error!(
                        "could not format timestamp of ledger entry {}: {error}",
                        entry.id
                    );
                    Error::JSONSerializationError(error.to_string())
                })?;

                Ok(json!({
                    "id": entry.id,
                    "product_id": entry.product_id,
                    "product_name": entry.product_name,
                    "quantity": entry.quantity,
                    "action": entry.action,
                    "timestamp": timestamp,
                }))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let report = json!({
            "total_stock_value": self.total_stock_value(),
            "products": self.product_rows(),
            "chart": self.chart_series(),
            "transactions": transactions,
        });

        serde_json::to_string_pretty(&report).map_err(|error| {
            tracing::error!("could not serialize dashboard as JSON: {error}");
            Error::JSONSerializationError(error.to_string())
        })
    }
}

/// Read the catalog and ledger in one transaction.
///
/// # Errors
/// Returns an [Error::SqlError] if either collection could not be read.
pub fn load_snapshot(connection: &Connection) -> Result<DashboardSnapshot, Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Deferred)?;

    let products = get_all_products(&transaction)?;
    let transactions = get_all_transactions(&transaction)?;

    transaction.commit()?;

    Ok(DashboardSnapshot::new(products, transactions))
}
