//! Raw SQL execution with positional parameters.
//!
//! The three entry points correspond to the three fetch modes a caller can ask
//! for: nothing ([`execute`]), a single row ([`fetch_one`]) or every row
//! ([`fetch_all`]). Rows are decoded by column name through
//! [`QueryableByName`], never by position.
//!
//! Statements run on the connection they are given. Outside a transaction that
//! means SQLite autocommit; inside `Connection::transaction` they commit or roll
//! back with the rest of the transaction.

use std::fmt;

use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::sqlite::Sqlite;
use diesel::{OptionalExtension, QueryableByName, RunQueryDsl, SqliteConnection};

/// A positional bind value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    /// Bound as `BIGINT`.
    Integer(i64),
    /// Bound as `TEXT`.
    Text(String),
    /// Bound as a NULL `TEXT`.
    Null,
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlParam::Integer(v) => write!(f, "{v}"),
            SqlParam::Text(v) => write!(f, "{v:?}"),
            SqlParam::Null => f.write_str("NULL"),
        }
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Integer(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Integer(v.into())
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlParam::Null, Into::into)
    }
}

/// Build a boxed `sql_query` with every parameter bound in order.
fn bind_params<'f>(statement: &str, params: &'f [SqlParam]) -> BoxedSqlQuery<'f, Sqlite, SqlQuery> {
    let mut query = diesel::sql_query(statement).into_boxed::<Sqlite>();
    for param in params {
        query = match param {
            SqlParam::Integer(v) => query.bind::<BigInt, _>(*v),
            SqlParam::Text(v) => query.bind::<Text, _>(v.as_str()),
            SqlParam::Null => query.bind::<Nullable<Text>, _>(None::<String>),
        };
    }
    query
}

/// Run a statement and return the number of affected rows.
pub fn execute(
    conn: &mut SqliteConnection,
    statement: &str,
    params: &[SqlParam],
) -> diesel::QueryResult<usize> {
    bind_params(statement, params).execute(conn)
}

/// Run a query and decode its first row, if any.
pub fn fetch_one<T>(
    conn: &mut SqliteConnection,
    statement: &str,
    params: &[SqlParam],
) -> diesel::QueryResult<Option<T>>
where
    T: QueryableByName<Sqlite> + 'static,
{
    bind_params(statement, params).get_result::<T>(conn).optional()
}

/// Run a query and decode every row.
pub fn fetch_all<T>(
    conn: &mut SqliteConnection,
    statement: &str,
    params: &[SqlParam],
) -> diesel::QueryResult<Vec<T>>
where
    T: QueryableByName<Sqlite> + 'static,
{
    bind_params(statement, params).load::<T>(conn)
}

/// Quote an identifier for interpolation into DDL (`"name"` with inner quotes doubled).
///
/// Table names cannot be bound as parameters, so per-model history tables go
/// through this instead.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
