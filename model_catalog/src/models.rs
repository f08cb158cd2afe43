//! Diesel models mapping to the database schema.
//!
//! These types mirror the tables defined in the embedded migrations and in
//! [`crate::schema`] for use with Diesel’s Queryable/Insertable APIs:
//! - [`crate::schema::models`] — one row per tracked model (name, canonical price)
//! - [`crate::schema::markets`] — registry of price sources, in creation order
//! - [`crate::schema::model_markets`] — last observed value per (model, market)
//!
//! The domain-facing [`crate::catalog::Model`] is assembled from these rows.

use diesel::prelude::*;

use crate::schema::*;

/// A row in [`crate::schema::models`].
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = models, check_for_backend(diesel::sqlite::Sqlite))]
pub struct ModelRow {
    /// Database primary key. Populated by the DB.
    pub id: i32,
    /// Unique model name; also the name of the model's history table.
    pub name: String,
    /// Last known canonical price.
    pub price: i64,
}

/// Insertable form of [`ModelRow`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = models)]
pub struct NewModel<'a> {
    /// Unique model name.
    pub name: &'a str,
    /// Initial canonical price.
    pub price: i64,
}

/// A row in [`crate::schema::markets`]: one price source.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = markets, check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketRow {
    /// Database primary key; ascending order is creation order.
    pub id: i32,
    /// Unique market name.
    pub name: String,
}

/// Insertable form of [`MarketRow`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = markets)]
pub struct NewMarket<'a> {
    /// Unique market name.
    pub name: &'a str,
}

/// A row in [`crate::schema::model_markets`].
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = model_markets, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(primary_key(model_id, market_id))]
#[diesel(belongs_to(ModelRow, foreign_key = model_id))]
#[diesel(belongs_to(MarketRow, foreign_key = market_id))]
pub struct ModelMarketRow {
    /// FK to [`ModelRow::id`].
    pub model_id: i32,
    /// FK to [`MarketRow::id`].
    pub market_id: i32,
    /// Last observed value; NULL until a collector fills it in.
    pub value: Option<String>,
}

/// Insertable form of [`ModelMarketRow`]; the value starts out NULL.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = model_markets)]
pub struct NewModelMarket {
    /// FK to [`ModelRow::id`].
    pub model_id: i32,
    /// FK to [`MarketRow::id`].
    pub market_id: i32,
}
