//! Connection-level catalog statements.
//!
//! Every function here takes the caller's connection and leaves transaction
//! control to the caller. [`super::Database`] wraps them in transactions; hook
//! implementations call them on the connection they are handed.
use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::{Date, Text};
use diesel::{QueryableByName, insert_into};
use indexmap::IndexMap;

use crate::catalog::{CatalogError, CatalogResult, Model};
use crate::db::statement::{self, SqlParam, quote_ident};
use crate::models::{MarketRow, ModelMarketRow, ModelRow, NewMarket, NewModel, NewModelMarket};
use crate::schema::{markets, model_markets, models};

/// How a single model is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKey<'a> {
    /// Exact name match.
    Name(&'a str),
    /// Storage identifier.
    Id(i32),
}

impl fmt::Display for ModelKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKey::Name(name) => write!(f, "\"{name}\""),
            ModelKey::Id(id) => write!(f, "#{id}"),
        }
    }
}

#[derive(QueryableByName)]
struct NameRow {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct DateRow {
    #[diesel(sql_type = Date)]
    date: NaiveDate,
}

// ---------------------------- introspection ----------------------------

/// Column names of `table` in declaration order; empty if the table is unknown.
pub fn table_columns(conn: &mut SqliteConnection, table: &str) -> CatalogResult<Vec<String>> {
    let rows: Vec<NameRow> = statement::fetch_all(
        conn,
        "SELECT name FROM pragma_table_info(?) ORDER BY cid",
        &[table.into()],
    )?;
    Ok(rows.into_iter().map(|r| r.name).collect())
}

/// True iff SQLite reports column metadata for `table`.
pub fn table_exists(conn: &mut SqliteConnection, table: &str) -> CatalogResult<bool> {
    Ok(!table_columns(conn, table)?.is_empty())
}

/// All table names defined in the database.
pub fn list_tables(conn: &mut SqliteConnection) -> CatalogResult<Vec<String>> {
    let rows: Vec<NameRow> = statement::fetch_all(
        conn,
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        &[],
    )?;
    Ok(rows.into_iter().map(|r| r.name).collect())
}

// ------------------------------- markets -------------------------------

/// Registered markets in creation order.
pub fn load_markets(conn: &mut SqliteConnection) -> CatalogResult<Vec<MarketRow>> {
    let rows: Vec<MarketRow> = markets::table
        .order(markets::id.asc())
        .select(MarketRow::as_select())
        .load(conn)?;
    Ok(rows)
}

/// Identifier of the market called `name`, if registered.
pub fn market_id(conn: &mut SqliteConnection, name: &str) -> CatalogResult<Option<i32>> {
    let id = markets::table
        .filter(markets::name.eq(name))
        .select(markets::id)
        .first::<i32>(conn)
        .optional()?;
    Ok(id)
}

/// Register a market and return its id.
pub fn insert_market(conn: &mut SqliteConnection, name: &str) -> CatalogResult<i32> {
    let id: i32 = insert_into(markets::table)
        .values(&NewMarket { name })
        .returning(markets::id)
        .get_result(conn)?;
    Ok(id)
}

/// Delete a market; its per-model values go with it (`ON DELETE CASCADE`).
pub fn delete_market(conn: &mut SqliteConnection, id: i32) -> CatalogResult<usize> {
    Ok(diesel::delete(markets::table.find(id)).execute(conn)?)
}

/// Create NULL values for every (model, market) pair given.
fn insert_value_slots(conn: &mut SqliteConnection, slots: Vec<NewModelMarket>) -> CatalogResult<usize> {
    if slots.is_empty() {
        return Ok(0);
    }
    Ok(insert_into(model_markets::table).values(&slots).execute(conn)?)
}

/// Give every existing model an empty value for `market_id`.
pub fn attach_market_to_models(conn: &mut SqliteConnection, market_id: i32) -> CatalogResult<usize> {
    let model_ids: Vec<i32> = models::table.select(models::id).load(conn)?;
    let slots = model_ids
        .into_iter()
        .map(|model_id| NewModelMarket { model_id, market_id })
        .collect();
    insert_value_slots(conn, slots)
}

/// Give `model_id` an empty value for every registered market.
pub fn attach_markets_to_model(conn: &mut SqliteConnection, model_id: i32) -> CatalogResult<usize> {
    let market_ids: Vec<i32> = markets::table.select(markets::id).load(conn)?;
    let slots = market_ids
        .into_iter()
        .map(|market_id| NewModelMarket { model_id, market_id })
        .collect();
    insert_value_slots(conn, slots)
}

/// Record the last observed `value` of `market` for the model called `model`.
///
/// Upserts, so it also repairs a missing value slot.
pub fn set_market_value_in(
    conn: &mut SqliteConnection,
    model: &str,
    market: &str,
    value: Option<&str>,
) -> CatalogResult<()> {
    let model_pk = model_id(conn, model)?
        .ok_or_else(|| CatalogError::ModelNotFound(ModelKey::Name(model).to_string()))?;
    let market_pk =
        market_id(conn, market)?.ok_or_else(|| CatalogError::MarketNotFound(market.to_string()))?;

    insert_into(model_markets::table)
        .values((
            model_markets::model_id.eq(model_pk),
            model_markets::market_id.eq(market_pk),
            model_markets::value.eq(value),
        ))
        .on_conflict((model_markets::model_id, model_markets::market_id))
        .do_update()
        .set(model_markets::value.eq(value))
        .execute(conn)?;
    Ok(())
}

// -------------------------------- models -------------------------------

/// Identifier of the model called `name`, if tracked.
pub fn model_id(conn: &mut SqliteConnection, name: &str) -> CatalogResult<Option<i32>> {
    let id = models::table
        .filter(models::name.eq(name))
        .select(models::id)
        .first::<i32>(conn)
        .optional()?;
    Ok(id)
}

/// Insert a model row and return its id.
pub fn insert_model(conn: &mut SqliteConnection, name: &str, price: i64) -> CatalogResult<i32> {
    let id: i32 = insert_into(models::table)
        .values(&NewModel { name, price })
        .returning(models::id)
        .get_result(conn)?;
    Ok(id)
}

/// Delete a model row; its market values cascade.
pub fn delete_model(conn: &mut SqliteConnection, id: i32) -> CatalogResult<usize> {
    Ok(diesel::delete(models::table.find(id)).execute(conn)?)
}

/// Update the canonical price; returns the number of rows touched.
pub fn update_price(conn: &mut SqliteConnection, name: &str, price: i64) -> CatalogResult<usize> {
    let n = diesel::update(models::table.filter(models::name.eq(name)))
        .set(models::price.eq(price))
        .execute(conn)?;
    Ok(n)
}

/// Every model with its market map, ordered by id.
pub fn load_models(conn: &mut SqliteConnection) -> CatalogResult<Vec<Model>> {
    let rows: Vec<ModelRow> = models::table
        .order(models::id.asc())
        .select(ModelRow::as_select())
        .load(conn)?;
    let markets = load_markets(conn)?;
    let values: Vec<ModelMarketRow> = model_markets::table
        .select(ModelMarketRow::as_select())
        .load(conn)?;

    let mut by_pair: HashMap<(i32, i32), Option<String>> = values
        .into_iter()
        .map(|v| ((v.model_id, v.market_id), v.value))
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| assemble(row, &markets, &mut by_pair))
        .collect())
}

/// A single model, or `None` if nothing matches `key`.
pub fn find_model(conn: &mut SqliteConnection, key: ModelKey<'_>) -> CatalogResult<Option<Model>> {
    let row: Option<ModelRow> = match key {
        ModelKey::Name(name) => models::table
            .filter(models::name.eq(name))
            .select(ModelRow::as_select())
            .first(conn)
            .optional()?,
        ModelKey::Id(id) => models::table
            .find(id)
            .select(ModelRow::as_select())
            .first(conn)
            .optional()?,
    };
    let Some(row) = row else {
        return Ok(None);
    };

    let markets = load_markets(conn)?;
    let mut by_pair: HashMap<(i32, i32), Option<String>> = ModelMarketRow::belonging_to(&row)
        .select(ModelMarketRow::as_select())
        .load::<ModelMarketRow>(conn)?
        .into_iter()
        .map(|v| ((v.model_id, v.market_id), v.value))
        .collect();

    Ok(Some(assemble(row, &markets, &mut by_pair)))
}

/// Like [`find_model`] but a miss is [`CatalogError::ModelNotFound`].
pub fn get_model(conn: &mut SqliteConnection, key: ModelKey<'_>) -> CatalogResult<Model> {
    find_model(conn, key)?.ok_or_else(|| CatalogError::ModelNotFound(key.to_string()).into())
}

fn assemble(
    row: ModelRow,
    markets: &[MarketRow],
    values: &mut HashMap<(i32, i32), Option<String>>,
) -> Model {
    let markets: IndexMap<String, Option<String>> = markets
        .iter()
        .map(|m| (m.name.clone(), values.remove(&(row.id, m.id)).flatten()))
        .collect();
    Model {
        id: row.id,
        name: row.name,
        price: row.price,
        markets,
    }
}

// ---------------------------- history tables ---------------------------

/// Create the model's history table; `date` defaults to today's local date.
pub fn create_history_table(conn: &mut SqliteConnection, name: &str) -> CatalogResult<()> {
    let sql = format!(
        "CREATE TABLE {} (date DATE NOT NULL DEFAULT (date('now', 'localtime')))",
        quote_ident(name)
    );
    statement::execute(conn, &sql, &[])?;
    Ok(())
}

/// Drop the model's history table if it exists.
pub fn drop_history_table(conn: &mut SqliteConnection, name: &str) -> CatalogResult<()> {
    let sql = format!("DROP TABLE IF EXISTS {}", quote_ident(name));
    statement::execute(conn, &sql, &[])?;
    Ok(())
}

/// Dates logged in the model's history table, in insertion order.
pub fn history_dates(conn: &mut SqliteConnection, name: &str) -> CatalogResult<Vec<NaiveDate>> {
    let sql = format!("SELECT date FROM {} ORDER BY rowid", quote_ident(name));
    let rows: Vec<DateRow> = statement::fetch_all(conn, &sql, &[] as &[SqlParam])?;
    Ok(rows.into_iter().map(|r| r.date).collect())
}
