//! SQLite connection helpers.
//!
//! Provides [`connect_sqlite`] that opens a connection, applies connection-wide
//! PRAGMAs (WAL journaling, foreign_keys=ON, 5000ms busy_timeout) and installs
//! statement logging: every statement is traced at debug level, failing ones at
//! error level together with their bind values.
//!
//! Example:
//! ```no_run
//! use model_catalog::db::connection::connect_sqlite;
//!
//! let path = std::env::temp_dir().join("model_catalog_example.db");
//! let _conn = connect_sqlite(path.to_str().unwrap()).expect("open sqlite");
//! ```

use anyhow::Context;
use diesel::connection::{Instrumentation, InstrumentationEvent};
use diesel::{Connection, RunQueryDsl, SqliteConnection, sql_query};

/// Tracing target used for per-statement events.
pub const SQL_TARGET: &str = "model_catalog::sql";

/// Open a SQLite connection and apply connection-wide PRAGMAs.
pub fn connect_sqlite(database_url: &str) -> anyhow::Result<SqliteConnection> {
    let mut conn = SqliteConnection::establish(database_url)
        .with_context(|| format!("open sqlite database {database_url}"))?;
    conn.set_instrumentation(StatementLog);

    sql_query("PRAGMA journal_mode=WAL;").execute(&mut conn)?;
    sql_query("PRAGMA foreign_keys=ON;").execute(&mut conn)?;
    sql_query("PRAGMA busy_timeout=5000;").execute(&mut conn)?;
    Ok(conn)
}

/// Instrumentation that forwards diesel's query events to `tracing`.
struct StatementLog;

impl Instrumentation for StatementLog {
    fn on_connection_event(&mut self, event: InstrumentationEvent<'_>) {
        match event {
            InstrumentationEvent::StartQuery { query, .. } => {
                tracing::debug!(target: SQL_TARGET, statement = %query, "executing");
            }
            InstrumentationEvent::FinishQuery {
                query,
                error: Some(err),
                ..
            } => {
                // `{query:?}` renders the SQL together with its binds.
                tracing::error!(target: SQL_TARGET, statement = ?query, error = %err, "statement failed");
            }
            InstrumentationEvent::RollbackTransaction { depth, .. } => {
                tracing::debug!(target: SQL_TARGET, depth = depth.get(), "rollback");
            }
            _ => {}
        }
    }
}
