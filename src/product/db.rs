//! Database operations for the product catalog.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error, is_unique_violation,
    product::{NewProduct, Product, ProductCreator, ProductId},
    validation::{ValidationErrors, required},
};

/// Add a product to the catalog.
///
/// The candidate is validated, then handed to `creator`, which assigns the
/// product's identifier and canonical name. The catalog is only written once
/// the creator has accepted the product.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the candidate has invalid fields,
/// - [Error::CreationError] if `creator` rejected the product or returned a
///   blank name,
/// - [Error::DuplicateProductId] if the assigned ID is already in the catalog
///   or is still referred to by ledger entries of a deleted product,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_product(
    candidate: NewProduct,
    creator: &impl ProductCreator,
    connection: &Connection,
) -> Result<Product, Error> {
    candidate.validate()?;

    let created = creator.create(&candidate).map_err(|message| {
        tracing::warn!("product creator rejected \"{}\": {message}", candidate.name);
        Error::CreationError(message)
    })?;

    let mut errors = ValidationErrors::new();
    let Some(name) = required(&created.name, "name", "Product name is required", &mut errors)
    else {
        tracing::warn!("product creator returned a blank name for {}", created.id);
        return Err(Error::CreationError("Product name is required".to_owned()));
    };

    // Ledger entries keep the IDs of deleted products, an ID they still
    // refer to must not be given to a new product.
    let id_has_history: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM stock_transaction WHERE product_id = ?1)",
        [created.id.as_ref()],
        |row| row.get(0),
    )?;
    if id_has_history {
        tracing::warn!("product creator returned the retired ID {}", created.id);
        return Err(Error::DuplicateProductId(created.id.to_string()));
    }

    let product = Product {
        id: created.id,
        name,
        description: candidate.description,
        category: candidate.category,
        price: candidate.price,
        quantity: candidate.quantity,
    };

    connection
        .execute(
            "INSERT INTO product (id, name, description, category, price, quantity)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                product.id.as_ref(),
                &product.name,
                &product.description,
                &product.category,
                product.price,
                product.quantity,
            ),
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                Error::DuplicateProductId(product.id.to_string())
            } else {
                error.into()
            }
        })?;

    tracing::info!("created product {} \"{}\"", product.id, product.name);

    Ok(product)
}

/// Retrieve a single product by ID.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a product.
pub fn get_product(id: &ProductId, connection: &Connection) -> Result<Product, Error> {
    connection
        .prepare(
            "SELECT id, name, description, category, price, quantity FROM product WHERE id = :id",
        )?
        .query_row(&[(":id", id.as_ref())], map_row)
        .map_err(|error| error.into())
}

/// Find the first product, in insertion order, named exactly `name`.
pub fn find_product_by_name(name: &str, connection: &Connection) -> Result<Option<Product>, Error> {
    connection
        .prepare(
            "SELECT id, name, description, category, price, quantity FROM product
             WHERE name = :name ORDER BY rowid ASC LIMIT 1",
        )?
        .query_row(&[(":name", name)], map_row)
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve all products in the order they were added.
pub fn get_all_products(connection: &Connection) -> Result<Vec<Product>, Error> {
    connection
        .prepare(
            "SELECT id, name, description, category, price, quantity FROM product
             ORDER BY rowid ASC",
        )?
        .query_map([], map_row)?
        .map(|maybe_product| maybe_product.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the stored product that has the same ID as `product`.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if `product` has invalid fields,
/// - [Error::UpdateMissingProduct] if no product has the ID,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_product(product: &Product, connection: &Connection) -> Result<(), Error> {
    product.validate()?;

    let rows_affected = connection.execute(
        "UPDATE product
         SET name = ?1, description = ?2, category = ?3, price = ?4, quantity = ?5
         WHERE id = ?6",
        (
            &product.name,
            &product.description,
            &product.category,
            product.price,
            product.quantity,
            product.id.as_ref(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingProduct);
    }

    tracing::info!("updated product {}", product.id);

    Ok(())
}

/// Set the stock quantity of a product, leaving the other fields alone.
pub(crate) fn set_product_quantity(
    id: &ProductId,
    quantity: u32,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE product SET quantity = ?1 WHERE id = ?2",
        (quantity, id.as_ref()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingProduct);
    }

    Ok(())
}

/// Delete a product by ID.
///
/// Ledger entries that refer to the product are kept.
///
/// # Errors
/// Returns [Error::DeleteMissingProduct] if no product has the ID.
pub fn delete_product(id: &ProductId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM product WHERE id = ?1", [id.as_ref()])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingProduct);
    }

    tracing::info!("deleted product {id}");

    Ok(())
}

/// Create the product table and the product ID sequence.
pub fn create_product_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS product (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            price REAL NOT NULL CHECK (price >= 0),
            quantity INTEGER NOT NULL CHECK (quantity >= 0)
        );

        CREATE INDEX IF NOT EXISTS idx_product_name ON product(name);

        CREATE TABLE IF NOT EXISTS product_id_sequence (
            id INTEGER PRIMARY KEY AUTOINCREMENT
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Product, rusqlite::Error> {
    let raw_id: String = row.get(0)?;
    let name = row.get(1)?;
    let description = row.get(2)?;
    let category = row.get(3)?;
    let price = row.get(4)?;
    let quantity = row.get(5)?;

    Ok(Product {
        id: ProductId::new(&raw_id),
        name,
        description,
        category,
        price,
        quantity,
    })
}

#[cfg(test)]
mod product_query_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        db::initialize,
        ledger::{NewStockTransaction, StockAction, append_transaction, get_all_transactions},
        product::{
            CreatedProduct, LocalProductCreator, NewProduct, Product, ProductCreator, ProductId,
        },
    };

    use super::{
        create_product, delete_product, find_product_by_name, get_all_products, get_product,
        set_product_quantity, update_product,
    };

    struct RejectingCreator;

    impl ProductCreator for RejectingCreator {
        fn create(&self, _product: &NewProduct) -> Result<CreatedProduct, String> {
            Err("Product name already taken".to_owned())
        }
    }

    struct FixedIdCreator(&'static str);

    impl ProductCreator for FixedIdCreator {
        fn create(&self, product: &NewProduct) -> Result<CreatedProduct, String> {
            Ok(CreatedProduct {
                id: ProductId::new(self.0),
                name: product.name.to_uppercase(),
            })
        }
    }

    struct BlankNameCreator;

    impl ProductCreator for BlankNameCreator {
        fn create(&self, _product: &NewProduct) -> Result<CreatedProduct, String> {
            Ok(CreatedProduct {
                id: ProductId::new("blank"),
                name: "  ".to_owned(),
            })
        }
    }

    struct PaddedNameCreator;

    impl ProductCreator for PaddedNameCreator {
        fn create(&self, product: &NewProduct) -> Result<CreatedProduct, String> {
            Ok(CreatedProduct {
                id: ProductId::new("padded"),
                name: format!(" {} ", product.name),
            })
        }
    }

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn candidate(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            description: format!("{name} description"),
            category: "Drinks".to_owned(),
            price: 10.0,
            quantity: 20,
        }
    }

    fn create_local(name: &str, connection: &Connection) -> Product {
        create_product(
            candidate(name),
            &LocalProductCreator::new(connection),
            connection,
        )
        .expect("Could not create test product")
    }

    #[test]
    fn create_product_succeeds() {
        let connection = get_test_connection();

        let product = create_local("Tea", &connection);

        assert_eq!(product.name, "Tea");
        assert_eq!(get_product(&product.id, &connection), Ok(product));
    }

    #[test]
    fn create_product_uses_creator_id_and_name() {
        let connection = get_test_connection();

        let product = create_product(candidate("Tea"), &FixedIdCreator("abc"), &connection)
            .expect("Could not create product");

        assert_eq!(product.id, ProductId::new("abc"));
        assert_eq!(product.name, "TEA");
        assert_eq!(product.description, "Tea description");
    }

    #[test]
    fn create_product_fails_when_creator_rejects() {
        let connection = get_test_connection();

        let result = create_product(candidate("Tea"), &RejectingCreator, &connection);

        assert_eq!(
            result,
            Err(Error::CreationError("Product name already taken".to_owned()))
        );
        assert_eq!(get_all_products(&connection), Ok(vec![]));
    }

    #[test]
    fn create_product_fails_on_duplicate_id() {
        let connection = get_test_connection();
        create_product(candidate("Tea"), &FixedIdCreator("abc"), &connection)
            .expect("Could not create product");

        let result = create_product(candidate("Coffee"), &FixedIdCreator("abc"), &connection);

        assert_eq!(result, Err(Error::DuplicateProductId("abc".to_owned())));
        assert_eq!(get_all_products(&connection).unwrap().len(), 1);
    }

    #[test]
    fn create_product_validates_before_calling_creator() {
        let connection = get_test_connection();
        let invalid = NewProduct {
            price: -1.0,
            ..candidate("Tea")
        };

        let result = create_product(invalid, &RejectingCreator, &connection);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn get_product_with_invalid_id_returns_not_found() {
        let connection = get_test_connection();

        let result = get_product(&ProductId::new("missing"), &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn list_keeps_insertion_order() {
        let connection = get_test_connection();
        let names = ["Tea", "Coffee", "Biscuits"];
        for name in names {
            create_local(name, &connection);
        }

        let products = get_all_products(&connection).unwrap();

        let got_names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(got_names, names);
    }

    #[test]
    fn find_by_name_returns_first_match() {
        let connection = get_test_connection();
        let first = create_local("Tea", &connection);
        create_local("Tea", &connection);

        let found = find_product_by_name("Tea", &connection).unwrap();

        assert_eq!(found, Some(first));
    }

    #[test]
    fn find_by_name_returns_none_for_unknown_name() {
        let connection = get_test_connection();
        create_local("Tea", &connection);

        assert_eq!(find_product_by_name("tea", &connection), Ok(None));
    }

    #[test]
    fn update_product_overwrites_fields() {
        let connection = get_test_connection();
        let product = create_local("Tea", &connection);
        let edited = Product {
            name: "Green Tea".to_owned(),
            price: 12.5,
            quantity: 3,
            ..product
        };

        update_product(&edited, &connection).expect("Could not update product");

        assert_eq!(get_product(&edited.id, &connection), Ok(edited));
    }

    #[test]
    fn update_product_with_invalid_id_returns_error() {
        let connection = get_test_connection();
        let product = create_local("Tea", &connection);
        let stray = Product {
            id: ProductId::new("missing"),
            ..product
        };

        assert_eq!(
            update_product(&stray, &connection),
            Err(Error::UpdateMissingProduct)
        );
    }

    #[test]
    fn set_quantity_only_changes_quantity() {
        let connection = get_test_connection();
        let product = create_local("Tea", &connection);

        set_product_quantity(&product.id, 7, &connection).unwrap();

        let got = get_product(&product.id, &connection).unwrap();
        assert_eq!(got, Product { quantity: 7, ..product });
    }

    #[test]
    fn delete_product_succeeds() {
        let connection = get_test_connection();
        let product = create_local("Tea", &connection);

        delete_product(&product.id, &connection).expect("Could not delete product");

        assert_eq!(get_product(&product.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_product_with_invalid_id_returns_error() {
        let connection = get_test_connection();

        let result = delete_product(&ProductId::new("missing"), &connection);

        assert_eq!(result, Err(Error::DeleteMissingProduct));
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let connection = get_test_connection();
        let first = create_local("Tea", &connection);
        delete_product(&first.id, &connection).unwrap();

        let second = create_local("Coffee", &connection);

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn creator_cannot_reuse_id_of_deleted_product_with_ledger_entries() {
        let connection = get_test_connection();
        let tea = create_product(candidate("Tea"), &FixedIdCreator("abc"), &connection).unwrap();
        append_transaction(
            NewStockTransaction {
                product_id: tea.id.clone(),
                product_name: tea.name.clone(),
                quantity: 7,
                action: StockAction::Deduct,
                timestamp: datetime!(2025-10-05 09:30 UTC),
            },
            &connection,
        )
        .unwrap();
        delete_product(&tea.id, &connection).unwrap();

        let result = create_product(candidate("Coffee"), &FixedIdCreator("abc"), &connection);

        assert_eq!(result, Err(Error::DuplicateProductId("abc".to_owned())));
        assert_eq!(get_all_products(&connection), Ok(vec![]));
        let entries = get_all_transactions(&connection).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].product_name, "TEA");
    }

    #[test]
    fn id_of_deleted_product_without_ledger_entries_can_be_reused() {
        let connection = get_test_connection();
        let tea = create_product(candidate("Tea"), &FixedIdCreator("abc"), &connection).unwrap();
        delete_product(&tea.id, &connection).unwrap();

        let coffee = create_product(candidate("Coffee"), &FixedIdCreator("abc"), &connection);

        assert_eq!(coffee.map(|product| product.name), Ok("COFFEE".to_owned()));
    }

    #[test]
    fn blank_name_from_creator_is_rejected() {
        let connection = get_test_connection();

        let result = create_product(candidate("Tea"), &BlankNameCreator, &connection);

        assert_eq!(
            result,
            Err(Error::CreationError("Product name is required".to_owned()))
        );
        assert_eq!(get_all_products(&connection), Ok(vec![]));
    }

    #[test]
    fn creator_name_is_trimmed() {
        let connection = get_test_connection();

        let product = create_product(candidate("Tea"), &PaddedNameCreator, &connection).unwrap();

        assert_eq!(product.name, "Tea");
        assert_eq!(get_product(&product.id, &connection), Ok(product));
    }
}
