//! Core product domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    validation::{ValidationErrors, required},
};

/// The identifier of a product in the catalog.
///
/// Identifiers are assigned by a [crate::ProductCreator] when the product is
/// created and never change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    /// Wrap an identifier string.
    pub fn new(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An item that is stocked and sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// The unique identifier of the product.
    pub id: ProductId,
    /// The display name, also used to find products when changing stock.
    pub name: String,
    /// A short description of the product.
    pub description: String,
    /// The category the product is listed under, e.g. "Drinks".
    pub category: String,
    /// The unit price.
    pub price: f64,
    /// The number of units in stock.
    pub quantity: u32,
}

impl Product {
    /// The value of the stock held for this product.
    pub fn stock_value(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    /// Check that every field holds an acceptable value.
    ///
    /// # Errors
    /// Returns an [Error::Validation] listing every invalid field.
    pub fn validate(&self) -> Result<(), Error> {
        validate_fields(&self.name, &self.description, &self.category, self.price)
    }
}

/// The details of a product that has not been added to the catalog yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// The requested display name. The creator may canonicalise it.
    pub name: String,
    /// A short description of the product.
    pub description: String,
    /// The category the product is listed under.
    pub category: String,
    /// The unit price.
    pub price: f64,
    /// The number of units in stock to start with.
    pub quantity: u32,
}

impl NewProduct {
    /// Check that every field holds an acceptable value.
    ///
    /// # Errors
    /// Returns an [Error::Validation] listing every invalid field.
    pub fn validate(&self) -> Result<(), Error> {
        validate_fields(&self.name, &self.description, &self.category, self.price)
    }
}

fn validate_fields(name: &str, description: &str, category: &str, price: f64) -> Result<(), Error> {
    let mut errors = ValidationErrors::new();

    required(name, "name", "Product name is required", &mut errors);
    required(
        description,
        "description",
        "Description is required",
        &mut errors,
    );
    required(category, "category", "Category is required", &mut errors);

    if !price.is_finite() || price < 0.0 {
        errors.add("price", "A valid price is required");
    }

    errors.into_result()
}
