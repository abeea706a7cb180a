//! Wings Inventory is the record keeping core of a small point-of-sale system.
//!
//! It keeps a product catalog, a ledger of stock changes and a directory of
//! staff accounts in a single SQLite database, and derives the figures shown on
//! the dashboard from them.
//!
//! Most callers should go through [Inventory], which owns the database
//! connection and serialises every change. The per-collection functions are
//! also exported for callers that manage their own [rusqlite::Connection].

#![warn(missing_docs)]

mod dashboard;
mod db;
mod inventory;
mod ledger;
mod password;
mod product;
mod stock;
mod user;
mod validation;

pub use dashboard::{
    DashboardSnapshot, LOW_STOCK_THRESHOLD, NOTIONAL_FULL_STOCK, ProductRow, StockLevel,
    load_snapshot,
};
pub use db::initialize as initialize_db;
pub use inventory::Inventory;
pub use ledger::{
    NewStockTransaction, StockAction, StockTransaction, TransactionId, append_transaction,
    delete_transaction, delete_transaction_at, get_all_transactions, get_transactions_for_product,
};
pub use password::PasswordHash;
pub use product::{
    CreatedProduct, LocalProductCreator, NewProduct, Product, ProductCreator, ProductForm,
    ProductId, create_product, delete_product, find_product_by_name, get_all_products,
    get_product, update_product,
};
pub use stock::{StockChange, StockChangeForm, apply_stock_change};
pub use user::{
    LogInForm, NewUser, SignUpForm, User, UserUpdate, authenticate_user, count_users,
    create_user, delete_user, get_all_users, get_user, update_user,
};
pub use validation::{FieldError, ValidationErrors};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more form fields were missing or invalid.
    ///
    /// Raised before the store is accessed, so nothing has changed.
    #[error("invalid input: {0}")]
    Validation(ValidationErrors),

    /// A stock change named a product that is not in the catalog.
    #[error("product \"{0}\" not found")]
    ProductNotFound(String),

    /// A deduction asked for more stock than is available.
    ///
    /// Neither the product nor the ledger are changed.
    #[error("not enough stock of \"{product}\" to deduct {requested}, only {available} available")]
    InsufficientStock {
        /// The name of the product.
        product: String,
        /// The quantity the caller tried to deduct.
        requested: u32,
        /// The quantity currently in stock.
        available: u32,
    },

    /// Adding stock would overflow the quantity counter.
    #[error("the stock quantity is too large")]
    QuantityOverflow,

    /// A user with the same ID number already exists.
    #[error("a user with the ID number \"{0}\" already exists")]
    DuplicateUser(String),

    /// The product creator returned an ID that is already in the catalog.
    #[error("a product with the ID \"{0}\" already exists")]
    DuplicateProductId(String),

    /// The product creator rejected the new product or could not be reached.
    ///
    /// Contains the creator's message verbatim for display.
    #[error("could not create product: {0}")]
    CreationError(String),

    /// No user has the given username and password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An unexpected error occurred with the underlying hashing library.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a product that does not exist
    #[error("tried to update a product that is not in the database")]
    UpdateMissingProduct,

    /// Tried to delete a product that does not exist
    #[error("tried to delete a product that is not in the database")]
    DeleteMissingProduct,

    /// Tried to delete a ledger entry that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a user that does not exist
    #[error("tried to update a user that is not in the database")]
    UpdateMissingUser,

    /// Tried to delete a user that does not exist
    #[error("tried to delete a user that is not in the database")]
    DeleteMissingUser,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// Whether `error` is a primary key or unique constraint violation.
pub(crate) fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        )
    )
}
