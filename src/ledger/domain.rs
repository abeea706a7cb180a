//! Core ledger domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, product::ProductId, validation::ValidationErrors};

/// Database identifier for a ledger entry.
pub type TransactionId = i64;

/// Whether a stock change added or removed units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockAction {
    /// Units were received into stock.
    Add,
    /// Units were sold or otherwise taken out of stock.
    Deduct,
}

impl StockAction {
    /// The name used for the action in the database and in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            StockAction::Add => "add",
            StockAction::Deduct => "deduct",
        }
    }

    /// The past tense label shown in the transaction history.
    pub fn label(&self) -> &'static str {
        match self {
            StockAction::Add => "Added",
            StockAction::Deduct => "Deducted",
        }
    }
}

impl Display for StockAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StockAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "add" => Ok(StockAction::Add),
            "deduct" => Ok(StockAction::Deduct),
            _ => {
                let mut errors = ValidationErrors::new();
                errors.add("action", "Action must be either add or deduct");
                Err(Error::Validation(errors))
            }
        }
    }
}

impl ToSql for StockAction {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for StockAction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "add" => Ok(StockAction::Add),
            "deduct" => Ok(StockAction::Deduct),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// A recorded change to the stock of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockTransaction {
    /// The stable ID of the entry.
    pub id: TransactionId,
    /// The product that was changed. The product may have since been deleted.
    pub product_id: ProductId,
    /// The product's current name, or the name it had when the change was
    /// recorded if the product no longer exists.
    pub product_name: String,
    /// How many units were added or deducted. Always positive.
    pub quantity: u32,
    /// Whether the units were added or deducted.
    pub action: StockAction,
    /// When the change was made.
    pub timestamp: OffsetDateTime,
}

/// A ledger entry that has not been recorded yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStockTransaction {
    /// The product that was changed.
    pub product_id: ProductId,
    /// The name of the product at the time of the change.
    pub product_name: String,
    /// How many units were added or deducted. Must be positive.
    pub quantity: u32,
    /// Whether the units were added or deducted.
    pub action: StockAction,
    /// When the change was made.
    pub timestamp: OffsetDateTime,
}
