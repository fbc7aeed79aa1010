//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the configured engine is actually registered
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure: (&DaemonConfig, engines) → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::DaemonConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("data.dir must not be empty")]
    EmptyDataDir,

    #[error("data.engine {name:?} is not registered (available: {available})")]
    UnknownEngine { name: String, available: String },

    #[error("{field} {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Check `config` for semantic problems.
///
/// `engines` is the set of registered engine names; pass `None` to skip the
/// engine check (e.g. when only printing the configuration).
pub fn validate_config(
    config: &DaemonConfig,
    engines: Option<&[&str]>,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.data.dir.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyDataDir);
    }

    if let Some(engines) = engines {
        if !engines.contains(&config.data.engine.as_str()) {
            errors.push(ValidationError::UnknownEngine {
                name: config.data.engine.clone(),
                available: engines.join(", "),
            });
        }
    }

    if config.http.enabled && config.http.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "http.bind_address",
            value: config.http.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.monitor.enabled && config.monitor.store_interval_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "monitor.store_interval_secs",
        });
    }

    if config.shutdown.timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "shutdown.timeout_secs",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
