//! Product catalog domain.
//!
//! A product is a plain record; the catalog assigns ids and stores it.

pub mod product;

pub use product::{Product, ProductDraft};
