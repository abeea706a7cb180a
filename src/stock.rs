//! Adding and deducting stock.
//!
//! A stock change updates the product's quantity and records the change in the
//! ledger. Both writes are made in one SQLite transaction, so either both are
//! saved or neither is.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    ledger::{NewStockTransaction, StockAction, StockTransaction, append_transaction},
    product::{find_product_by_name, set_product_quantity},
    validation::{ValidationErrors, required},
};

/// A request to add or deduct units of a product.
#[derive(Debug, Clone, PartialEq)]
pub struct StockChange {
    /// The name of the product to change.
    pub product_name: String,
    /// Whether to add or deduct units.
    pub action: StockAction,
    /// The number of units, must be positive.
    pub amount: u32,
    /// When the change was made.
    pub timestamp: OffsetDateTime,
}

/// Raw form data for the stock management form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockChangeForm {
    /// The exact name of the product to change.
    pub product_name: String,
    /// Either "add" or "deduct".
    pub action: String,
    /// The number of units as entered.
    pub quantity: String,
}

impl StockChangeForm {
    /// Parse and validate the form into a stock change made at `timestamp`.
    ///
    /// # Errors
    /// Returns an [Error::Validation] with a message for each invalid field.
    pub fn validate(&self, timestamp: OffsetDateTime) -> Result<StockChange, Error> {
        let mut errors = ValidationErrors::new();

        let product_name = required(
            &self.product_name,
            "product_name",
            "Product Name is required",
            &mut errors,
        );

        let action = match self.action.parse::<StockAction>() {
            Ok(action) => Some(action),
            Err(_) => {
                errors.add("action", "Action must be either add or deduct");
                None
            }
        };

        let amount = match self.quantity.trim().parse::<u32>() {
            Ok(amount) if amount > 0 => Some(amount),
            _ => {
                errors.add("quantity", "Valid quantity is required");
                None
            }
        };

        match (product_name, action, amount) {
            (Some(product_name), Some(action), Some(amount)) => Ok(StockChange {
                product_name,
                action,
                amount,
                timestamp,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }
}

/// Apply `change` to the catalog and record it in the ledger.
///
/// Exactly one product is updated and one ledger entry appended, or nothing
/// changes at all. The change runs in an immediate SQLite transaction, which
/// takes the write lock up front so concurrent changes to the same product are
/// applied one after the other instead of overwriting each other.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the amount is zero,
/// - [Error::ProductNotFound] if no product has the given name,
/// - [Error::InsufficientStock] if a deduction is larger than the stock on hand,
/// - [Error::QuantityOverflow] if an addition would overflow the quantity,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn apply_stock_change(
    change: StockChange,
    connection: &Connection,
) -> Result<StockTransaction, Error> {
    if change.amount == 0 {
        let mut errors = ValidationErrors::new();
        errors.add("quantity", "Valid quantity is required");
        return Err(Error::Validation(errors));
    }

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let product = find_product_by_name(&change.product_name, &transaction)?
        .ok_or_else(|| Error::ProductNotFound(change.product_name.clone()))?;

    let new_quantity = match change.action {
        StockAction::Add => product
            .quantity
            .checked_add(change.amount)
            .ok_or(Error::QuantityOverflow)?,
        StockAction::Deduct => {
            if change.amount > product.quantity {
                tracing::warn!(
                    "rejected deduction of {} from \"{}\" with {} in stock",
                    change.amount,
                    product.name,
                    product.quantity
                );

                return Err(Error::InsufficientStock {
                    product: product.name,
                    requested: change.amount,
                    available: product.quantity,
                });
            }

            product.quantity - change.amount
        }
    };

    set_product_quantity(&product.id, new_quantity, &transaction)?;

    let entry = append_transaction(
        NewStockTransaction {
            product_id: product.id,
            product_name: product.name,
            quantity: change.amount,
            action: change.action,
            timestamp: change.timestamp,
        },
        &transaction,
    )?;

    transaction.commit()?;

    tracing::info!(
        "{} {} of \"{}\", {} now in stock",
        entry.action.label().to_lowercase(),
        entry.quantity,
        entry.product_name,
        new_quantity
    );

    Ok(entry)
}

#[cfg(test)]
mod stock_change_form_tests {
    use time::macros::datetime;

    use crate::{Error, ledger::StockAction};

    use super::{StockChange, StockChangeForm};

    #[test]
    fn parses_valid_form() {
        let timestamp = datetime!(2025-10-05 09:30 UTC);
        let form = StockChangeForm {
            product_name: "Tea".to_owned(),
            action: "deduct".to_owned(),
            quantity: "5".to_owned(),
        };

        let change = form.validate(timestamp);

        assert_eq!(
            change,
            Ok(StockChange {
                product_name: "Tea".to_owned(),
                action: StockAction::Deduct,
                amount: 5,
                timestamp,
            })
        );
    }

    #[test]
    fn empty_form_reports_product_and_quantity() {
        let form = StockChangeForm {
            action: "add".to_owned(),
            ..Default::default()
        };

        let result = form.validate(datetime!(2025-10-05 09:30 UTC));

        let Err(Error::Validation(errors)) = result else {
            panic!("want validation error, got {result:?}");
        };
        assert_eq!(errors.get("product_name"), Some("Product Name is required"));
        assert_eq!(errors.get("quantity"), Some("Valid quantity is required"));
        assert_eq!(errors.get("action"), None);
    }

    #[test]
    fn rejects_zero_quantity() {
        let form = StockChangeForm {
            product_name: "Tea".to_owned(),
            action: "add".to_owned(),
            quantity: "0".to_owned(),
        };

        let result = form.validate(datetime!(2025-10-05 09:30 UTC));

        assert!(matches!(result, Err(Error::Validation(_))));
    }
}

#[cfg(test)]
mod apply_stock_change_tests {
    use rusqlite::Connection;
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        db::initialize,
        ledger::{StockAction, StockTransaction, get_all_transactions},
        product::{
            LocalProductCreator, NewProduct, Product, create_product, delete_product, get_product,
        },
    };

    use super::{StockChange, apply_stock_change};

    const T1: OffsetDateTime = datetime!(2025-10-05 09:30 UTC);
    const T2: OffsetDateTime = datetime!(2025-10-05 10:45 UTC);

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn create_test_product(name: &str, quantity: u32, connection: &Connection) -> Product {
        create_product(
            NewProduct {
                name: name.to_owned(),
                description: "Test product".to_owned(),
                category: "Drinks".to_owned(),
                price: 10.0,
                quantity,
            },
            &LocalProductCreator::new(connection),
            connection,
        )
        .expect("Could not create test product")
    }

    fn change(name: &str, action: StockAction, amount: u32, timestamp: OffsetDateTime) -> StockChange {
        StockChange {
            product_name: name.to_owned(),
            action,
            amount,
            timestamp,
        }
    }

    #[test]
    fn deduct_updates_quantity_and_records_entry() {
        let connection = get_test_connection();
        let tea = create_test_product("Tea", 20, &connection);

        let entry = apply_stock_change(change("Tea", StockAction::Deduct, 5, T1), &connection)
            .expect("Could not apply stock change");

        assert_eq!(get_product(&tea.id, &connection).unwrap().quantity, 15);
        assert_eq!(
            get_all_transactions(&connection),
            Ok(vec![StockTransaction {
                id: entry.id,
                product_id: tea.id,
                product_name: "Tea".to_owned(),
                quantity: 5,
                action: StockAction::Deduct,
                timestamp: T1,
            }])
        );
    }

    #[test]
    fn add_increases_quantity() {
        let connection = get_test_connection();
        let tea = create_test_product("Tea", 20, &connection);

        apply_stock_change(change("Tea", StockAction::Add, 7, T1), &connection).unwrap();

        assert_eq!(get_product(&tea.id, &connection).unwrap().quantity, 27);
    }

    #[test]
    fn over_deduct_changes_nothing() {
        let connection = get_test_connection();
        let tea = create_test_product("Tea", 20, &connection);
        apply_stock_change(change("Tea", StockAction::Deduct, 5, T1), &connection).unwrap();

        let result = apply_stock_change(change("Tea", StockAction::Deduct, 999, T2), &connection);

        assert_eq!(
            result,
            Err(Error::InsufficientStock {
                product: "Tea".to_owned(),
                requested: 999,
                available: 15,
            })
        );
        assert_eq!(get_product(&tea.id, &connection).unwrap().quantity, 15);
        assert_eq!(get_all_transactions(&connection).unwrap().len(), 1);
    }

    #[test]
    fn deducting_all_stock_is_allowed() {
        let connection = get_test_connection();
        let tea = create_test_product("Tea", 3, &connection);

        apply_stock_change(change("Tea", StockAction::Deduct, 3, T1), &connection).unwrap();

        assert_eq!(get_product(&tea.id, &connection).unwrap().quantity, 0);
    }

    #[test]
    fn unknown_product_returns_not_found() {
        let connection = get_test_connection();
        create_test_product("Tea", 20, &connection);

        let result = apply_stock_change(change("Coffee", StockAction::Add, 1, T1), &connection);

        assert_eq!(result, Err(Error::ProductNotFound("Coffee".to_owned())));
        assert_eq!(get_all_transactions(&connection), Ok(vec![]));
    }

    #[test]
    fn zero_amount_is_rejected() {
        let connection = get_test_connection();
        create_test_product("Tea", 20, &connection);

        let result = apply_stock_change(change("Tea", StockAction::Add, 0, T1), &connection);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn overflow_changes_nothing() {
        let connection = get_test_connection();
        let tea = create_test_product("Tea", u32::MAX - 1, &connection);

        let result = apply_stock_change(change("Tea", StockAction::Add, 2, T1), &connection);

        assert_eq!(result, Err(Error::QuantityOverflow));
        assert_eq!(
            get_product(&tea.id, &connection).unwrap().quantity,
            u32::MAX - 1
        );
    }

    #[test]
    fn final_quantity_is_initial_plus_net_change() {
        let connection = get_test_connection();
        let tea = create_test_product("Tea", 20, &connection);
        let coffee = create_test_product("Coffee", 4, &connection);
        let changes = [
            ("Tea", StockAction::Deduct, 5),
            ("Coffee", StockAction::Add, 10),
            ("Tea", StockAction::Add, 3),
            ("Tea", StockAction::Deduct, 18),
            ("Coffee", StockAction::Deduct, 14),
            ("Tea", StockAction::Add, 1),
        ];

        for (name, action, amount) in changes {
            apply_stock_change(change(name, action, amount, T1), &connection)
                .expect("Could not apply stock change");
        }

        assert_eq!(get_product(&tea.id, &connection).unwrap().quantity, 1);
        assert_eq!(get_product(&coffee.id, &connection).unwrap().quantity, 0);
        assert_eq!(get_all_transactions(&connection).unwrap().len(), changes.len());
    }

    #[test]
    fn failed_changes_are_not_counted_in_ledger() {
        let connection = get_test_connection();
        create_test_product("Tea", 2, &connection);

        let outcomes = [
            apply_stock_change(change("Tea", StockAction::Deduct, 1, T1), &connection).is_ok(),
            apply_stock_change(change("Tea", StockAction::Deduct, 5, T1), &connection).is_ok(),
            apply_stock_change(change("Milk", StockAction::Add, 1, T1), &connection).is_ok(),
            apply_stock_change(change("Tea", StockAction::Add, 4, T1), &connection).is_ok(),
        ];

        let successes = outcomes.iter().filter(|&&ok| ok).count();
        assert_eq!(successes, 2);
        assert_eq!(get_all_transactions(&connection).unwrap().len(), successes);
    }

    #[test]
    fn deleted_product_can_no_longer_be_changed() {
        let connection = get_test_connection();
        let tea = create_test_product("Tea", 20, &connection);
        apply_stock_change(change("Tea", StockAction::Deduct, 5, T1), &connection).unwrap();
        delete_product(&tea.id, &connection).unwrap();

        let result = apply_stock_change(change("Tea", StockAction::Add, 1, T2), &connection);

        assert_eq!(result, Err(Error::ProductNotFound("Tea".to_owned())));
        assert_eq!(get_all_transactions(&connection).unwrap().len(), 1);
    }
}
