//! Implements the store that owns the database connection.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    dashboard::{DashboardSnapshot, load_snapshot},
    db::initialize,
    ledger::{self, StockTransaction, TransactionId},
    product::{self, LocalProductCreator, NewProduct, Product, ProductCreator, ProductId},
    stock::{self, StockChange},
    user::{self, LogInForm, NewUser, User, UserUpdate},
};

/// The product catalog, stock ledger and user directory behind one connection.
///
/// Every operation locks the connection for its whole duration, so operations
/// from different threads run one at a time. Cloning an [Inventory] shares the
/// same connection.
#[derive(Debug, Clone)]
pub struct Inventory {
    connection: Arc<Mutex<Connection>>,
}

impl Inventory {
    /// Create an [Inventory] backed by `connection`.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        initialize(&connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn with_connection<T>(
        &self,
        operation: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let connection = self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        operation(&connection)
    }

    /// All products in the order they were added.
    pub fn products(&self) -> Result<Vec<Product>, Error> {
        self.with_connection(product::get_all_products)
    }

    /// The product with the ID `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no product has the ID.
    pub fn product(&self, id: &ProductId) -> Result<Product, Error> {
        self.with_connection(|connection| product::get_product(id, connection))
    }

    /// The first product, in insertion order, named exactly `name`.
    pub fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, Error> {
        self.with_connection(|connection| product::find_product_by_name(name, connection))
    }

    /// Add a product that `creator` has assigned an ID to.
    ///
    /// The connection stays locked while `creator` runs, so nothing else can
    /// change the catalog until the product has been stored or rejected.
    ///
    /// See [product::create_product] for the errors this may return.
    pub fn create_product(
        &self,
        candidate: NewProduct,
        creator: &impl ProductCreator,
    ) -> Result<Product, Error> {
        self.with_connection(|connection| product::create_product(candidate, creator, connection))
    }

    /// Add a product with an ID allocated from the local database.
    pub fn create_local_product(&self, candidate: NewProduct) -> Result<Product, Error> {
        self.with_connection(|connection| {
            product::create_product(candidate, &LocalProductCreator::new(connection), connection)
        })
    }

    /// Overwrite the product with the same ID as `product`.
    pub fn update_product(&self, product: &Product) -> Result<(), Error> {
        self.with_connection(|connection| product::update_product(product, connection))
    }

    /// Delete a product. Its ledger entries are kept.
    pub fn delete_product(&self, id: &ProductId) -> Result<(), Error> {
        self.with_connection(|connection| product::delete_product(id, connection))
    }

    /// Add or deduct stock and record the change in the ledger.
    ///
    /// See [stock::apply_stock_change] for the errors this may return.
    pub fn apply_stock_change(&self, change: StockChange) -> Result<StockTransaction, Error> {
        self.with_connection(|connection| stock::apply_stock_change(change, connection))
    }

    /// The whole ledger in the order it was recorded.
    pub fn transactions(&self) -> Result<Vec<StockTransaction>, Error> {
        self.with_connection(ledger::get_all_transactions)
    }

    /// The ledger entries for one product.
    pub fn transactions_for_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<StockTransaction>, Error> {
        self.with_connection(|connection| {
            ledger::get_transactions_for_product(product_id, connection)
        })
    }

    /// Delete a ledger entry by its ID.
    pub fn delete_transaction(&self, id: TransactionId) -> Result<(), Error> {
        self.with_connection(|connection| ledger::delete_transaction(id, connection))
    }

    /// Delete the ledger entry at `index` in the current ledger order.
    pub fn delete_transaction_at(&self, index: usize) -> Result<(), Error> {
        self.with_connection(|connection| ledger::delete_transaction_at(index, connection))
    }

    /// A consistent snapshot of the catalog and ledger for the dashboard.
    pub fn dashboard(&self) -> Result<DashboardSnapshot, Error> {
        self.with_connection(load_snapshot)
    }

    /// Create a user account.
    ///
    /// # Errors
    /// Returns [Error::DuplicateUser] if the ID number is already registered.
    pub fn sign_up(&self, new_user: NewUser) -> Result<User, Error> {
        self.with_connection(|connection| user::create_user(new_user, connection))
    }

    /// The first user with the exact `username` whose password matches.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>, Error> {
        self.with_connection(|connection| user::authenticate_user(username, password, connection))
    }

    /// Check a log in form and return the matching user.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::Validation] if the username or password is blank,
    /// - [Error::InvalidCredentials] if no user has the username and password,
    /// - or [Error::HashingError] if a stored password hash is malformed.
    pub fn log_in(&self, form: &LogInForm) -> Result<User, Error> {
        form.validate()?;

        self.authenticate(&form.username, &form.password)?
            .ok_or(Error::InvalidCredentials)
    }

    /// All users in sign up order.
    pub fn users(&self) -> Result<Vec<User>, Error> {
        self.with_connection(user::get_all_users)
    }

    /// The number of registered users.
    pub fn user_count(&self) -> Result<usize, Error> {
        self.with_connection(user::count_users)
    }

    /// Replace a user's profile details.
    pub fn update_user(&self, update: &UserUpdate) -> Result<(), Error> {
        self.with_connection(|connection| user::update_user(update, connection))
    }

    /// Delete the user with the ID number `id_number`.
    pub fn delete_user(&self, id_number: &str) -> Result<(), Error> {
        self.with_connection(|connection| user::delete_user(id_number, connection))
    }
}
