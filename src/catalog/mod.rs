//! Catalog services sitting between the HTTP handlers and the package store.
//!
//! Reads go through [`CatalogQuery`]; every mutation goes through [`CatalogAdmin`].

mod admin;
mod query;

pub use admin::*;
pub use query::*;
