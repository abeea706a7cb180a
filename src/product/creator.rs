//! The collaborator that assigns identifiers to new products.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::product::{NewProduct, ProductId};

/// The record returned by a [ProductCreator] for an accepted product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedProduct {
    /// The identifier assigned to the product.
    pub id: ProductId,
    /// The canonical name of the product.
    pub name: String,
}

/// Accepts new products and assigns them an identifier and canonical name.
///
/// In a full deployment this is the product service that sits behind the
/// "add product" endpoint. The catalog only stores a product once the creator
/// has accepted it.
pub trait ProductCreator {
    /// Register `product` and return its identifier and canonical name.
    ///
    /// # Errors
    /// Returns a message suitable for showing to the user if the product was
    /// rejected or the creator could not be reached.
    fn create(&self, product: &NewProduct) -> Result<CreatedProduct, String>;
}

/// A [ProductCreator] that allocates identifiers from the local database.
///
/// Identifiers come from an autoincrementing sequence, so an identifier is
/// never handed out twice, even after the product that held it is deleted.
#[derive(Debug, Clone, Copy)]
pub struct LocalProductCreator<'a> {
    connection: &'a Connection,
}

impl<'a> LocalProductCreator<'a> {
    /// Create a creator that allocates identifiers using `connection`.
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }
}

impl ProductCreator for LocalProductCreator<'_> {
    fn create(&self, product: &NewProduct) -> Result<CreatedProduct, String> {
        let id = allocate_product_id(self.connection).map_err(|error| {
            tracing::error!("could not allocate a product ID: {error}");
            "Could not allocate a product ID".to_owned()
        })?;

        Ok(CreatedProduct {
            id,
            name: product.name.trim().to_owned(),
        })
    }
}

/// Take the next identifier from the product ID sequence.
pub(crate) fn allocate_product_id(connection: &Connection) -> Result<ProductId, rusqlite::Error> {
    connection.execute("INSERT INTO product_id_sequence DEFAULT VALUES", ())?;
    let id = connection.last_insert_rowid();

    // AUTOINCREMENT remembers the high-water mark, the old rows are not needed.
    connection.execute("DELETE FROM product_id_sequence WHERE id < ?1", [id])?;

    Ok(ProductId::new(&id.to_string()))
}
