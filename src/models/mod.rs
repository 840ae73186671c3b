//! Data models for the tour catalog.
//!
//! Field names match the JSON documents consumed by the landing and admin pages.

mod package;
mod revision;

pub use package::*;
pub use revision::*;
