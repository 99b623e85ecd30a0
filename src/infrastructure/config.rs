//! Server configuration from environment variables.
//!
//! # Environment Variables
//!
//! - `HOST`: bind address (default: `0.0.0.0`)
//! - `PORT`: bind port (default: `5000`)
//! - `ITEMS_COUNT`: number of items in the collection (default: `1000000`, minimum 1)
//! - `SEARCH_CACHE_CAPACITY`: filtered-order cache entries (default: `64`, `0` disables)
//! - `WORKER_THREADS`: tokio worker threads (default: logical CPU count)

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

/// Default collection size.
pub const DEFAULT_ITEMS_COUNT: u32 = 1_000_000;

/// Default bind port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default filtered-order cache capacity.
pub const DEFAULT_SEARCH_CACHE_CAPACITY: usize = 64;

/// Errors that can occur while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// `HOST` and `PORT` do not form a socket address.
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),
}

/// Runtime settings for the server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub items_count: u32,
    pub search_cache_capacity: usize,
    /// `None` uses tokio's default.
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: DEFAULT_PORT,
            items_count: DEFAULT_ITEMS_COUNT,
            search_cache_capacity: DEFAULT_SEARCH_CACHE_CAPACITY,
            worker_threads: None,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if a variable is set to an unparsable
    /// or out-of-range value.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Empty or whitespace-only values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if a value is unparsable or out of range.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let defaults = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let items_count = parse_or(read("ITEMS_COUNT"), "ITEMS_COUNT", defaults.items_count)?;
        if items_count == 0 {
            return Err(ConfigurationError::InvalidValue {
                key: "ITEMS_COUNT",
                value: "0".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }

        let worker_threads = match read("WORKER_THREADS") {
            None => None,
            Some(value) => match value.parse::<usize>() {
                Ok(0) | Err(_) => {
                    return Err(ConfigurationError::InvalidValue {
                        key: "WORKER_THREADS",
                        value,
                        reason: "must be a positive integer".to_owned(),
                    });
                }
                Ok(threads) => Some(threads),
            },
        };

        Ok(Self {
            host: read("HOST").unwrap_or(defaults.host),
            port: parse_or(read("PORT"), "PORT", defaults.port)?,
            items_count,
            search_cache_capacity: parse_or(
                read("SEARCH_CACHE_CAPACITY"),
                "SEARCH_CACHE_CAPACITY",
                defaults.search_cache_capacity,
            )?,
            worker_threads,
        })
    }

    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidAddress`] if `host:port` does not parse.
    pub fn socket_address(&self) -> Result<SocketAddr, ConfigurationError> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|_| ConfigurationError::InvalidAddress(address))
    }
}

fn parse_or<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigurationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |value| {
        value
            .parse()
            .map_err(|error: T::Err| ConfigurationError::InvalidValue {
                key,
                reason: error.to_string(),
                value,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[rstest]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.items_count, 1_000_000);
        assert_eq!(config.port, 5000);
    }

    #[rstest]
    fn test_reads_all_values() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("ITEMS_COUNT", "500"),
            ("SEARCH_CACHE_CAPACITY", "0"),
            ("WORKER_THREADS", " 4 "),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.items_count, 500);
        assert_eq!(config.search_cache_capacity, 0);
        assert_eq!(config.worker_threads, Some(4));
        assert_eq!(config.socket_address().unwrap().port(), 8080);
    }

    #[rstest]
    #[case("PORT", "http")]
    #[case("PORT", "70000")]
    #[case("ITEMS_COUNT", "0")]
    #[case("ITEMS_COUNT", "-3")]
    #[case("WORKER_THREADS", "0")]
    #[case("SEARCH_CACHE_CAPACITY", "many")]
    fn test_rejects_invalid_values(#[case] key: &str, #[case] value: &str) {
        let result = ServerConfig::from_lookup(lookup(&[(key, value)]));

        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { key: reported, .. }) if reported == key
        ));
    }

    #[rstest]
    fn test_empty_value_counts_as_unset() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "  ")])).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[rstest]
    fn test_invalid_host() {
        let config = ServerConfig::from_lookup(lookup(&[("HOST", "not a host")])).unwrap();

        assert!(matches!(
            config.socket_address(),
            Err(ConfigurationError::InvalidAddress(_))
        ));
    }
}
