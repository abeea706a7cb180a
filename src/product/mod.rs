//! The product catalog: product types, form parsing, identifier allocation and
//! database queries.

mod creator;
mod db;
mod domain;
mod form;

pub use creator::{CreatedProduct, LocalProductCreator, ProductCreator};
pub use db::{
    create_product, create_product_tables, delete_product, find_product_by_name,
    get_all_products, get_product, update_product,
};
pub use domain::{NewProduct, Product, ProductId};
pub use form::ProductForm;

pub(crate) use db::set_product_quantity;
