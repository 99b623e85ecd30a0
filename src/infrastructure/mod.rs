//! Infrastructure module for process-level concerns.
//!
//! This module contains configuration loading for the server binary.

pub mod config;

pub use config::{ConfigurationError, ServerConfig};
