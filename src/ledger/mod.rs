//! The stock transaction ledger: a log of every change to stock levels.

mod db;
mod domain;

pub use db::{
    append_transaction, create_stock_transaction_table, delete_transaction,
    delete_transaction_at, get_all_transactions, get_transactions_for_product,
};
pub use domain::{NewStockTransaction, StockAction, StockTransaction, TransactionId};
