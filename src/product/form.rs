//! Form data for adding and editing products.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    product::{NewProduct, Product, ProductId},
    validation::{ValidationErrors, required},
};

/// Raw form data for product creation and editing.
///
/// Every field is kept as the text the user entered so that parsing problems
/// can be reported per field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductForm {
    /// The product name.
    pub name: String,
    /// A short description.
    pub description: String,
    /// The category, e.g. "Drinks".
    pub category: String,
    /// The unit price as entered, e.g. "10.50".
    pub price: String,
    /// The number of units in stock as entered.
    pub quantity: String,
}

impl ProductForm {
    /// Parse and validate the form into a product candidate.
    ///
    /// # Errors
    /// Returns an [Error::Validation] with a message for each invalid field.
    pub fn validate(&self) -> Result<NewProduct, Error> {
        let mut errors = ValidationErrors::new();

        let name = required(&self.name, "name", "Product name is required", &mut errors);
        let description = required(
            &self.description,
            "description",
            "Description is required",
            &mut errors,
        );
        let category = required(
            &self.category,
            "category",
            "Category is required",
            &mut errors,
        );

        let price = match self.price.trim().parse::<f64>() {
            Ok(price) if price.is_finite() && price >= 0.0 => Some(price),
            _ => {
                errors.add("price", "A valid price is required");
                None
            }
        };

        let quantity = match self.quantity.trim().parse::<u32>() {
            Ok(quantity) => Some(quantity),
            Err(_) => {
                errors.add("quantity", "A valid quantity is required");
                None
            }
        };

        match (name, description, category, price, quantity) {
            (Some(name), Some(description), Some(category), Some(price), Some(quantity)) => {
                Ok(NewProduct {
                    name,
                    description,
                    category,
                    price,
                    quantity,
                })
            }
            _ => Err(Error::Validation(errors)),
        }
    }

    /// Parse and validate the form as an edit of the product `id`.
    ///
    /// # Errors
    /// Returns an [Error::Validation] with a message for each invalid field.
    pub fn validate_edit(&self, id: ProductId) -> Result<Product, Error> {
        let candidate = self.validate()?;

        Ok(Product {
            id,
            name: candidate.name,
            description: candidate.description,
            category: candidate.category,
            price: candidate.price,
            quantity: candidate.quantity,
        })
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            quantity: product.quantity.to_string(),
        }
    }
}
