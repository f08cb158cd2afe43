//! Environment variable lookups with structured errors.
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// The variable is set but its value could not be parsed.
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid {
        /// Variable name.
        name: String,
        /// Raw value as found in the environment.
        value: String,
    },
}

/// Reads an environment variable, treating unset and blank values as `None`.
pub fn get_env_var_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Returns the value of the first variable in `names` that is set.
pub fn first_env_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|n| get_env_var_opt(n))
}

/// Parses an optional raw value, naming `name` in the error.
///
/// Kept separate from the lookup so callers can feed values from any source.
pub fn parse_value<T: FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>, EnvError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| EnvError::Invalid {
                name: name.to_string(),
                value,
            }),
    }
}
