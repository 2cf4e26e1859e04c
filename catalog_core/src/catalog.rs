pub mod category;
pub mod product;

pub use category::{AttributeBlock, AttributeField, CategorySchema};
pub use product::{Product, ProductDecodeError, ProductId};
