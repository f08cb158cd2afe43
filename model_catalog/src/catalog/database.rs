use anyhow::Context;
use chrono::NaiveDate;
use diesel::sqlite::Sqlite;
use diesel::{QueryableByName, SqliteConnection};

use crate::catalog::repo::{self, ModelKey};
use crate::catalog::{
    CatalogError, CatalogResult, MarketHooks, Model, NoopHooks, validate_model_name,
};
use crate::config::CatalogConfig;
use crate::db::statement::{self, SqlParam};
use crate::db::{connection, migrate};
use crate::resolve::{self, DEFAULT_REVIEW_THRESHOLD, Resolution};

/// Facade over the catalog database.
///
/// Holds no connection: every method opens its own via [`Database::connect`]
/// and drops it before returning. Multi-step mutations (adding/removing models
/// and markets) run inside one `BEGIN IMMEDIATE` transaction together with the
/// [`MarketHooks`] they trigger, so they either fully apply or leave the
/// database untouched.
#[derive(Debug, Clone)]
pub struct Database<H = NoopHooks> {
    url: String,
    hooks: H,
    review_threshold: u8,
}

impl Database<NoopHooks> {
    /// Facade over `url` without touching the database.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            hooks: NoopHooks,
            review_threshold: DEFAULT_REVIEW_THRESHOLD,
        }
    }

    /// Facade over `url` with pending migrations applied.
    pub fn open(url: impl Into<String>) -> CatalogResult<Self> {
        let db = Self::new(url);
        db.migrate()?;
        Ok(db)
    }

    /// Facade configured from a [`CatalogConfig`].
    pub fn from_config(config: &CatalogConfig) -> CatalogResult<Self> {
        let db = Self::new(config.database_url.clone()).with_review_threshold(config.review_threshold);
        if config.apply_migrations {
            db.migrate()?;
        }
        Ok(db)
    }
}

impl<H> Database<H> {
    /// Replace the market hooks.
    pub fn with_hooks<H2: MarketHooks>(self, hooks: H2) -> Database<H2> {
        Database {
            url: self.url,
            hooks,
            review_threshold: self.review_threshold,
        }
    }

    /// Similarity score below which a resolved name is flagged for review.
    pub fn with_review_threshold(mut self, threshold: u8) -> Self {
        self.review_threshold = threshold;
        self
    }

    /// Database URL (a SQLite file path).
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The installed market hooks.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Apply pending migrations; returns how many ran.
    pub fn migrate(&self) -> CatalogResult<usize> {
        migrate::run_sqlite(&self.url)
    }

    /// Open a fresh connection with the catalog PRAGMAs and statement logging.
    pub fn connect(&self) -> CatalogResult<SqliteConnection> {
        connection::connect_sqlite(&self.url)
    }

    // ------------------------------ statements ------------------------------

    /// Run one statement in autocommit mode; returns affected rows.
    pub fn execute(&self, sql: &str, params: &[SqlParam]) -> CatalogResult<usize> {
        let mut conn = self.connect()?;
        statement::execute(&mut conn, sql, params).with_context(|| format!("execute: {sql}"))
    }

    /// Run a query and decode its first row by column name.
    pub fn fetch_one<T>(&self, sql: &str, params: &[SqlParam]) -> CatalogResult<Option<T>>
    where
        T: QueryableByName<Sqlite> + 'static,
    {
        let mut conn = self.connect()?;
        statement::fetch_one(&mut conn, sql, params).with_context(|| format!("fetch one: {sql}"))
    }

    /// Run a query and decode every row by column name.
    pub fn fetch_all<T>(&self, sql: &str, params: &[SqlParam]) -> CatalogResult<Vec<T>>
    where
        T: QueryableByName<Sqlite> + 'static,
    {
        let mut conn = self.connect()?;
        statement::fetch_all(&mut conn, sql, params).with_context(|| format!("fetch all: {sql}"))
    }

    // ---------------------------- introspection -----------------------------

    /// True iff the database reports columns for `table`.
    pub fn table_exists(&self, table: &str) -> CatalogResult<bool> {
        repo::table_exists(&mut self.connect()?, table)
    }

    /// Every table name in the database.
    pub fn list_tables(&self) -> CatalogResult<Vec<String>> {
        repo::list_tables(&mut self.connect()?)
    }

    /// Column names of `table` in declaration order.
    pub fn table_columns(&self, table: &str) -> CatalogResult<Vec<String>> {
        repo::table_columns(&mut self.connect()?, table)
    }

    // -------------------------------- models --------------------------------

    /// All models, ordered by id, each with every market's value.
    pub fn get_models(&self) -> CatalogResult<Vec<Model>> {
        repo::load_models(&mut self.connect()?)
    }

    /// Look a model up by exactly one of `name` or `id`.
    ///
    /// Passing neither, or both, is [`CatalogError::InvalidArgument`]; an unknown
    /// model is [`CatalogError::ModelNotFound`].
    pub fn get_model(&self, name: Option<&str>, id: Option<i32>) -> CatalogResult<Model> {
        let key = match (name, id) {
            (Some(name), None) => ModelKey::Name(name),
            (None, Some(id)) => ModelKey::Id(id),
            (None, None) => {
                return Err(CatalogError::InvalidArgument(
                    "model id and name were not passed".into(),
                )
                .into());
            }
            (Some(_), Some(_)) => {
                return Err(CatalogError::InvalidArgument(
                    "pass either a model id or a name, not both".into(),
                )
                .into());
            }
        };
        repo::get_model(&mut self.connect()?, key)
    }

    /// Shorthand for `get_model(Some(name), None)`.
    pub fn get_model_by_name(&self, name: &str) -> CatalogResult<Model> {
        self.get_model(Some(name), None)
    }

    /// Shorthand for `get_model(None, Some(id))`.
    pub fn get_model_by_id(&self, id: i32) -> CatalogResult<Model> {
        self.get_model(None, Some(id))
    }

    /// Names of all models, ordered by id.
    pub fn get_models_names(&self) -> CatalogResult<Vec<String>> {
        Ok(self.get_models()?.into_iter().map(|m| m.name).collect())
    }

    /// Update a model's canonical price.
    pub fn set_price(&self, name: &str, price: i64) -> CatalogResult<()> {
        if repo::update_price(&mut self.connect()?, name, price)? == 0 {
            return Err(CatalogError::ModelNotFound(ModelKey::Name(name).to_string()).into());
        }
        Ok(())
    }

    /// Dates logged in the model's history table, oldest first.
    pub fn history(&self, name: &str) -> CatalogResult<Vec<NaiveDate>> {
        let mut conn = self.connect()?;
        if repo::model_id(&mut conn, name)?.is_none() {
            return Err(CatalogError::ModelNotFound(ModelKey::Name(name).to_string()).into());
        }
        repo::history_dates(&mut conn, name)
    }

    // -------------------------------- markets -------------------------------

    /// Market names in creation order.
    pub fn markets(&self) -> CatalogResult<Vec<String>> {
        Ok(repo::load_markets(&mut self.connect()?)?
            .into_iter()
            .map(|m| m.name)
            .collect())
    }

    /// Record the last observed value of `market` for `model`.
    pub fn set_market_value(&self, model: &str, market: &str, value: Option<&str>) -> CatalogResult<()> {
        repo::set_market_value_in(&mut self.connect()?, model, market, value)
    }
}

impl<H: MarketHooks> Database<H> {
    /// Register a market and give every model a value slot for it.
    ///
    /// Fails with [`CatalogError::MarketExists`] if the name is taken. Calls
    /// [`MarketHooks::market_added`] for every model inside the same transaction.
    pub fn add_market(&self, name: &str) -> CatalogResult<()> {
        if name.trim().is_empty() {
            return Err(CatalogError::InvalidArgument("market name cannot be empty".into()).into());
        }

        let mut conn = self.connect()?;
        let touched = conn.immediate_transaction(|conn| -> CatalogResult<usize> {
            if repo::market_id(conn, name)?.is_some() {
                return Err(CatalogError::MarketExists(name.to_string()).into());
            }
            let market_id = repo::insert_market(conn, name)?;
            repo::attach_market_to_models(conn, market_id)?;

            let models = repo::load_models(conn)?;
            for model in &models {
                self.hooks
                    .market_added(conn, model, name)
                    .with_context(|| format!("market_added hook for {} / {name}", model.name))?;
            }
            Ok(models.len())
        })?;

        tracing::info!(market = name, models = touched, "market added");
        Ok(())
    }

    /// Unregister a market, dropping its value from every model.
    ///
    /// Fails with [`CatalogError::MarketNotFound`] if the name is unknown. Calls
    /// [`MarketHooks::market_removed`] for every model inside the same transaction.
    pub fn remove_market(&self, name: &str) -> CatalogResult<()> {
        let mut conn = self.connect()?;
        let touched = conn.immediate_transaction(|conn| -> CatalogResult<usize> {
            let market_id = repo::market_id(conn, name)?
                .ok_or_else(|| CatalogError::MarketNotFound(name.to_string()))?;
            repo::delete_market(conn, market_id)?;

            let models = repo::load_models(conn)?;
            for model in &models {
                self.hooks
                    .market_removed(conn, model, name)
                    .with_context(|| format!("market_removed hook for {} / {name}", model.name))?;
            }
            Ok(models.len())
        })?;

        tracing::info!(market = name, models = touched, "market removed");
        Ok(())
    }

    /// Track a new model: its row, its history table, and a value slot per market.
    ///
    /// Fails with [`CatalogError::ModelExists`] on duplicate names and with
    /// [`CatalogError::HistoryTableExists`] if another table already uses the
    /// name, compared case-insensitively (so "Foo" clashes with a model "foo"). [`MarketHooks::market_added`] runs for every market before the
    /// model is reloaded and returned.
    pub fn add_model(&self, name: &str, price: i64) -> CatalogResult<Model> {
        validate_model_name(name)?;

        let mut conn = self.connect()?;
        let model = conn.immediate_transaction(|conn| -> CatalogResult<Model> {
            if repo::model_id(conn, name)?.is_some() {
                return Err(CatalogError::ModelExists(name.to_string()).into());
            }
            if repo::table_exists(conn, name)? {
                return Err(CatalogError::HistoryTableExists(name.to_string()).into());
            }

            let id = repo::insert_model(conn, name, price)?;
            repo::create_history_table(conn, name)?;
            repo::attach_markets_to_model(conn, id)?;

            let model = repo::get_model(conn, ModelKey::Id(id))?;
            for market in model.markets.keys() {
                self.hooks
                    .market_added(conn, &model, market)
                    .with_context(|| format!("market_added hook for {name} / {market}"))?;
            }
            repo::get_model(conn, ModelKey::Id(id))
        })?;

        tracing::info!(model = %model.name, id = model.id, price, "model added");
        Ok(model)
    }

    /// Stop tracking a model: delete its row, values and history table.
    pub fn remove_model(&self, name: &str) -> CatalogResult<()> {
        let mut conn = self.connect()?;
        let id = conn.immediate_transaction(|conn| -> CatalogResult<i32> {
            let id = repo::model_id(conn, name)?
                .ok_or_else(|| CatalogError::ModelNotFound(ModelKey::Name(name).to_string()))?;
            repo::delete_model(conn, id)?;
            repo::drop_history_table(conn, name)?;
            Ok(id)
        })?;

        tracing::info!(model = name, id, "model removed");
        Ok(())
    }

    // ------------------------------ resolution ------------------------------

    /// Map a scraped name onto a tracked model name.
    ///
    /// See [`resolve::resolve_against`] for the matching rules.
    pub fn resolve_model_name(&self, observed: &str) -> CatalogResult<Resolution> {
        let names = self.get_models_names()?;
        Ok(resolve::resolve_against(observed, &names, self.review_threshold))
    }
}
