//! Configuration utility functions
//!
//! Helpers for reading and parsing `CLEARMARK_*` override values. Unlike a
//! silent fallback, a value that is present but unparsable is reported as a
//! configuration error.

use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Reads an environment variable, treating unset and non-UTF-8 values alike.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parses an optional raw value into `T`.
pub fn parse_value<T: FromStr>(key: &str, raw: Option<String>) -> CoreResult<Option<T>> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| CoreError::Config(format!("invalid value for {key}: '{value}'"))),
    }
}

/// Parses an optional raw boolean: `true`/`1`/`yes` and `false`/`0`/`no`.
pub fn parse_bool(key: &str, raw: Option<String>) -> CoreResult<Option<bool>> {
    match raw {
        None => Ok(None),
        Some(value) => match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(CoreError::Config(format!(
                "invalid boolean for {key}: '{value}'"
            ))),
        },
    }
}
