pub mod catalog;
pub mod order;

pub use catalog::{Product, ProductCatalog};
pub use order::{OrderSelection, Recipient};
