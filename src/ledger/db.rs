//! Database operations for the stock transaction ledger.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    ledger::{NewStockTransaction, StockTransaction, TransactionId},
    product::ProductId,
    validation::ValidationErrors,
};

/// Add an entry to the end of the ledger and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the quantity is zero,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn append_transaction(
    entry: NewStockTransaction,
    connection: &Connection,
) -> Result<StockTransaction, Error> {
    if entry.quantity == 0 {
        let mut errors = ValidationErrors::new();
        errors.add("quantity", "Valid quantity is required");
        return Err(Error::Validation(errors));
    }

    connection.execute(
        "INSERT INTO stock_transaction (product_id, product_name, quantity, action, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            entry.product_id.as_ref(),
            &entry.product_name,
            entry.quantity,
            entry.action,
            entry.timestamp,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(StockTransaction {
        id,
        product_id: entry.product_id,
        product_name: entry.product_name,
        quantity: entry.quantity,
        action: entry.action,
        timestamp: entry.timestamp,
    })
}

/// Retrieve the whole ledger in the order the entries were recorded.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<StockTransaction>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.product_id, COALESCE(p.name, t.product_name), t.quantity, t.action, t.timestamp
             FROM stock_transaction t
             LEFT JOIN product p ON p.id = t.product_id
             ORDER BY t.id ASC",
        )?
        .query_map([], map_row)?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the ledger entries for one product in the order they were recorded.
pub fn get_transactions_for_product(
    product_id: &ProductId,
    connection: &Connection,
) -> Result<Vec<StockTransaction>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.product_id, COALESCE(p.name, t.product_name), t.quantity, t.action, t.timestamp
             FROM stock_transaction t
             LEFT JOIN product p ON p.id = t.product_id
             WHERE t.product_id = :product_id
             ORDER BY t.id ASC",
        )?
        .query_map(&[(":product_id", product_id.as_ref())], map_row)?
        .map(|maybe_entry| maybe_entry.map_err(|error| error.into()))
        .collect()
}

/// Delete a ledger entry by its ID.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if no entry has the ID.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM stock_transaction WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    tracing::info!("deleted ledger entry {id}");

    Ok(())
}

/// Delete the entry at `index` in the ledger's current order.
///
/// The position is resolved against the committed ledger in the same statement
/// that deletes the entry. Prefer [delete_transaction], positions shift when
/// other entries are deleted.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if `index` is past the end of the ledger.
pub fn delete_transaction_at(index: usize, connection: &Connection) -> Result<(), Error> {
    let offset = i64::try_from(index).map_err(|_| Error::DeleteMissingTransaction)?;

    let rows_affected = connection.execute(
        "DELETE FROM stock_transaction
         WHERE id = (SELECT id FROM stock_transaction ORDER BY id ASC LIMIT 1 OFFSET ?1)",
        [offset],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    tracing::info!("deleted ledger entry at position {index}");

    Ok(())
}

/// Create the ledger table.
///
/// `product_id` has no foreign key, entries outlive the products they refer to.
pub fn create_stock_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS stock_transaction (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id TEXT NOT NULL,
            product_name TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            action TEXT NOT NULL CHECK (action IN ('add', 'deduct')),
            timestamp TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_stock_transaction_product
            ON stock_transaction(product_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<StockTransaction, rusqlite::Error> {
    let raw_product_id: String = row.get(1)?;

    Ok(StockTransaction {
        id: row.get(0)?,
        product_id: ProductId::new(&raw_product_id),
        product_name: row.get(2)?,
        quantity: row.get(3)?,
        action: row.get(4)?,
        timestamp: row.get(5)?,
    })
}
