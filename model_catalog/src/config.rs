//! Catalog configuration: parsing, validation, and environment overrides.
//!
//! A TOML file such as
//!
//! ```toml
//! database_url = "data/main.db"
//! review_threshold = 96
//! apply_migrations = true
//! ```
//!
//! Every key is optional. Environment variables win over the file:
//! - `MODEL_CATALOG_DATABASE_URL`, falling back to `DATABASE_URL`
//! - `MODEL_CATALOG_REVIEW_THRESHOLD`
//!
//! Entrypoints: [`load_config_str`], [`load_config_path`], and
//! [`CatalogConfig::from_env`] for environment-only setups.

use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use shared_utils::env;

use crate::resolve::DEFAULT_REVIEW_THRESHOLD;

/// Environment variable holding the database path.
pub const ENV_DATABASE_URL: &str = "MODEL_CATALOG_DATABASE_URL";
/// Generic fallback for [`ENV_DATABASE_URL`].
pub const ENV_DATABASE_URL_FALLBACK: &str = "DATABASE_URL";
/// Environment variable overriding [`CatalogConfig::review_threshold`].
pub const ENV_REVIEW_THRESHOLD: &str = "MODEL_CATALOG_REVIEW_THRESHOLD";

/// Default SQLite file used when nothing is configured.
pub const DEFAULT_DATABASE_URL: &str = "data/main.db";

/// Runtime configuration for [`crate::catalog::Database`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// SQLite database path.
    pub database_url: String,
    /// Similarity score (0..=100) below which name resolution asks for review.
    pub review_threshold: u8,
    /// Run embedded migrations when the database is opened.
    pub apply_migrations: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            review_threshold: DEFAULT_REVIEW_THRESHOLD,
            apply_migrations: true,
        }
    }
}

impl CatalogConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env()?;
        Ok(cfg)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|name| {
            if name == ENV_DATABASE_URL {
                env::first_env_var(&[ENV_DATABASE_URL, ENV_DATABASE_URL_FALLBACK])
            } else {
                env::get_env_var_opt(name)
            }
        })
    }

    /// Apply overrides from an arbitrary lookup (keys are the `ENV_*` names).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database_url = url;
        }
        if let Some(t) = env::parse_value::<u8>(ENV_REVIEW_THRESHOLD, lookup(ENV_REVIEW_THRESHOLD))? {
            self.review_threshold = t;
        }
        self.validate()
    }

    /// Reject values the catalog cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.trim().is_empty() {
            bail!("database_url cannot be empty");
        }
        if self.review_threshold > 100 {
            bail!(
                "review_threshold must be within 0..=100, got {}",
                self.review_threshold
            );
        }
        Ok(())
    }
}

/// Parse and validate a config from a TOML string (no environment overrides).
pub fn load_config_str(s: &str) -> anyhow::Result<CatalogConfig> {
    let cfg: CatalogConfig = toml::from_str(s).context("parse catalog config TOML")?;
    cfg.validate()?;
    Ok(cfg)
}

/// Read a config file, parse it, then apply environment overrides.
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<CatalogConfig> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read catalog config {}", path.display()))?;
    let mut cfg = load_config_str(&raw).with_context(|| format!("in {}", path.display()))?;
    cfg.apply_env()?;
    Ok(cfg)
}
