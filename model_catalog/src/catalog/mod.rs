//! Model/market catalog.
//!
//! [`Database`] is the facade callers use: it opens one connection per call and
//! runs every multi-step mutation in a single immediate transaction. The free
//! functions in [`repo`] take an explicit connection and are what the facade
//! (and [`MarketHooks`] implementations) compose inside those transactions.

mod database;
pub mod repo;

use diesel::SqliteConnection;
use indexmap::IndexMap;

pub use database::Database;
pub use repo::set_market_value_in;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Domain errors raised by catalog operations.
///
/// Storage failures are not represented here; they surface as the underlying
/// diesel error inside the returned `anyhow::Error`.
pub enum CatalogError {
    #[error("invalid argument: {0}")]
    /// A required identifying argument was missing or unusable.
    InvalidArgument(String),
    #[error("model \"{0}\" already exists")]
    /// A model with this name is already tracked.
    ModelExists(String),
    #[error("model {0} does not exist")]
    /// No model matched the lookup (name or `#id`).
    ModelNotFound(String),
    #[error("market \"{0}\" already exists")]
    /// A market with this name is already registered.
    MarketExists(String),
    #[error("market \"{0}\" does not exist")]
    /// No market with this name is registered.
    MarketNotFound(String),
    #[error("a table named \"{0}\" already exists (table names ignore case)")]
    /// The model's history table name is taken by another table.
    ///
    /// SQLite compares table names case-insensitively, so this includes the
    /// history table of a model whose name differs only in case.
    HistoryTableExists(String),
}

/// Result type used throughout the catalog for fallible operations.
pub type CatalogResult<T> = anyhow::Result<T>;

/// A tracked product together with its last observed value on every market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// Storage-assigned identifier, stable for the model's lifetime.
    pub id: i32,
    /// Unique name; doubles as the name of the model's history table.
    pub name: String,
    /// Last known canonical price.
    pub price: i64,
    /// Market name -> last observed value, in market creation order.
    ///
    /// Every registered market has an entry; `None` until a value is recorded.
    pub markets: IndexMap<String, Option<String>>,
}

impl Model {
    /// Last observed value for `market`, if the market exists and has a value.
    pub fn market_value(&self, market: &str) -> Option<&str> {
        self.markets.get(market).and_then(|v| v.as_deref())
    }
}

/// Per-model bookkeeping invoked after the catalog's market set changes.
///
/// Hooks run inside the transaction of the operation that triggered them, on
/// the same connection. Returning an error rolls the whole operation back.
pub trait MarketHooks {
    /// Called for every model after `market` was added, and for every market
    /// of a freshly added model.
    fn market_added(
        &self,
        conn: &mut SqliteConnection,
        model: &Model,
        market: &str,
    ) -> anyhow::Result<()>;

    /// Called for every remaining model after `market` was removed.
    fn market_removed(
        &self,
        conn: &mut SqliteConnection,
        model: &Model,
        market: &str,
    ) -> anyhow::Result<()>;
}

/// Hooks that do nothing; market values stay NULL until written explicitly.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl MarketHooks for NoopHooks {
    fn market_added(&self, _: &mut SqliteConnection, _: &Model, _: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn market_removed(&self, _: &mut SqliteConnection, _: &Model, _: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Table names a model may not take, compared case-insensitively.
const RESERVED_TABLES: &[&str] = &[
    "models",
    "markets",
    "model_markets",
    "__diesel_schema_migrations",
];

/// Check that `name` can be used as a model name (and so as a table name).
pub fn validate_model_name(name: &str) -> CatalogResult<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::InvalidArgument("model name cannot be empty".into()).into());
    }
    let lower = name.to_lowercase();
    if lower.starts_with("sqlite_") || RESERVED_TABLES.contains(&lower.as_str()) {
        return Err(
            CatalogError::InvalidArgument(format!("model name \"{name}\" is reserved")).into(),
        );
    }
    Ok(())
}
