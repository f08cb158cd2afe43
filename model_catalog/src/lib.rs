//! Persistence for a catalog of models (products) tracked across a dynamic set
//! of markets (price sources), plus fuzzy resolution of scraped names onto
//! catalog entries.
//!
//! Start with [`catalog::Database`]; [`resolve`] is usable on its own.

#![deny(missing_docs)]

pub mod catalog;
pub mod config;
pub mod db;
pub mod models;
pub mod resolve;
/// Diesel table definitions for the fixed catalog tables.
#[allow(missing_docs)]
pub mod schema;

pub use catalog::{CatalogError, CatalogResult, Database, MarketHooks, Model, NoopHooks};
pub use resolve::Resolution;
