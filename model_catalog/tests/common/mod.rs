#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;

use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text};
use model_catalog::catalog::set_market_value_in;
use model_catalog::{Database, MarketHooks, Model};
use tempfile::TempDir;

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}
#[derive(QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}
#[derive(QueryableByName)]
struct BusyTimeout {
    #[diesel(sql_type = Integer, column_name = "timeout")]
    busy_timeout: i32,
}
#[derive(QueryableByName)]
struct Count {
    #[diesel(sql_type = BigInt)]
    cnt: i64,
}

pub struct TestDb {
    _dir: TempDir,    // keep alive for the life of the test
    pub path: String, // <tmpdir>/test.db
}

/// Fresh migrated database in a temp dir.
pub fn setup_db() -> (TestDb, Database) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    let db = Database::open(path.clone()).expect("open + migrate");
    (TestDb { _dir: dir, path }, db)
}

pub fn assert_sqlite_pragmas(conn: &mut SqliteConnection) {
    use diesel::sql_query;

    let jm: JournalMode = sql_query("PRAGMA journal_mode;").get_result(conn).unwrap();
    assert_eq!(jm.journal_mode.to_lowercase(), "wal"); // WAL is persistent per DB file

    let fk: ForeignKeys = sql_query("PRAGMA foreign_keys;").get_result(conn).unwrap();
    assert_eq!(fk.foreign_keys, 1);

    let bt: BusyTimeout = sql_query("PRAGMA busy_timeout;").get_result(conn).unwrap();
    assert_eq!(bt.busy_timeout, 5000);
}

/// Row count of `table`.
pub fn count(conn: &mut SqliteConnection, table: &str) -> i64 {
    let c: Count = diesel::sql_query(format!("SELECT COUNT(*) AS cnt FROM \"{table}\""))
        .get_result(conn)
        .unwrap();
    c.cnt
}

/// `PRAGMA foreign_key_check` reports nothing.
pub fn fk_check_empty(conn: &mut SqliteConnection) {
    #[derive(QueryableByName)]
    struct Violation {
        #[diesel(sql_type = Text)]
        table: String,
    }
    let rows: Vec<Violation> = diesel::sql_query("PRAGMA foreign_key_check;")
        .load(conn)
        .unwrap();
    let tables: Vec<String> = rows.into_iter().map(|r| r.table).collect();
    assert!(tables.is_empty(), "foreign key violations in {tables:?}");
}

/// Records every hook call; optionally writes a value or fails on a given market.
#[derive(Default)]
pub struct RecordingHooks {
    pub calls: RefCell<Vec<String>>,
    pub fill_with: Option<String>,
    pub fail_on: Option<String>,
}

impl MarketHooks for RecordingHooks {
    fn market_added(
        &self,
        conn: &mut SqliteConnection,
        model: &Model,
        market: &str,
    ) -> anyhow::Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("added {market} -> {}", model.name));
        if self.fail_on.as_deref() == Some(market) {
            anyhow::bail!("collector for {market} is down");
        }
        if let Some(v) = &self.fill_with {
            set_market_value_in(conn, &model.name, market, Some(v.as_str()))?;
        }
        Ok(())
    }

    fn market_removed(
        &self,
        _conn: &mut SqliteConnection,
        model: &Model,
        market: &str,
    ) -> anyhow::Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("removed {market} -> {}", model.name));
        Ok(())
    }
}
