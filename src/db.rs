//! Database setup for the application's SQLite store.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, ledger::create_stock_transaction_table, product::create_product_tables,
    user::create_user_table,
};

/// Create the tables for every collection if they do not exist yet.
///
/// The tables are created inside one exclusive transaction, so a database is
/// either fully initialised or left untouched.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_product_tables(&transaction)?;
    create_stock_transaction_table(&transaction)?;
    create_user_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
