//! Stock figures derived from the catalog and the ledger.
//!
//! Everything here is a pure function of its inputs, the dashboard reads a
//! snapshot once and derives all of its figures from it.

use serde::{Deserialize, Serialize};

use crate::{
    ledger::{StockAction, StockTransaction},
    product::{Product, ProductId},
};

/// Products with fewer units than this are shown as low on stock.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// The stock level the sold heuristic treats as "full".
///
/// [sold_quantity] assumes every product started at this many units. It is not
/// derived from the ledger, see [ledger_sold_quantity] for the recorded figure.
pub const NOTIONAL_FULL_STOCK: u32 = 20;

/// Whether a product needs restocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockLevel {
    /// Fewer than [LOW_STOCK_THRESHOLD] units.
    Low,
    /// At least [LOW_STOCK_THRESHOLD] units.
    Available,
}

impl StockLevel {
    /// The label shown in the inventory table.
    pub fn label(&self) -> &'static str {
        match self {
            StockLevel::Low => "Low Stock",
            StockLevel::Available => "Available",
        }
    }
}

/// The value of all stock, price times quantity summed over every product,
/// rounded to two decimal places.
pub(super) fn total_stock_value(products: &[Product]) -> f64 {
    let total: f64 = products.iter().map(Product::stock_value).sum();

    (total * 100.0).round() / 100.0
}

pub(super) fn stock_level(product: &Product) -> StockLevel {
    if product.quantity < LOW_STOCK_THRESHOLD {
        StockLevel::Low
    } else {
        StockLevel::Available
    }
}

/// How far the product is below [NOTIONAL_FULL_STOCK].
pub(super) fn sold_quantity(product: &Product) -> u32 {
    NOTIONAL_FULL_STOCK.saturating_sub(product.quantity)
}

pub(super) fn sold_flag(product: &Product) -> bool {
    sold_quantity(product) > 0
}

/// The total number of units of `product_id` deducted according to the ledger.
pub(super) fn ledger_sold_quantity(
    product_id: &ProductId,
    transactions: &[StockTransaction],
) -> u64 {
    transactions
        .iter()
        .filter(|transaction| {
            transaction.action == StockAction::Deduct && &transaction.product_id == product_id
        })
        .map(|transaction| u64::from(transaction.quantity))
        .sum()
}

/// (name, quantity) pairs for the stock overview bar chart, in catalog order.
pub(super) fn chart_series(products: &[Product]) -> Vec<(String, u32)> {
    products
        .iter()
        .map(|product| (product.name.clone(), product.quantity))
        .collect()
}
