pub mod product;

pub use product::{Product, ProductPatch, ProductType, ProductTypeError};
