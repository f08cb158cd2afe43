//! Database utilities for connections, schema migrations and raw statements.
//!
//! This module provides:
//! - SQLite connection helpers: [`connection::connect_sqlite`] applies WAL, foreign_keys=ON,
//!   a 5000ms busy_timeout, and per-statement `tracing` instrumentation.
//! - Embedded Diesel migrations and their runner: [`migrate::run_sqlite`].
//! - Raw statement execution with positional parameters: [`statement`].
//!
//! Example:
//! ```no_run
//! use model_catalog::db::{connection, migrate};
//!
//! let db_path = std::env::temp_dir().join("model_catalog_example.db");
//! migrate::run_sqlite(db_path.to_str().unwrap()).expect("migrations");
//!
//! let _conn = connection::connect_sqlite(db_path.to_str().unwrap()).expect("connect");
//! ```

pub mod connection;
pub mod migrate;
pub mod statement;
