//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TesterConfig → Result<(), Vec<ValidationError>>
//! - Fault values are never rejected; their out-of-range semantics are defined

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::TesterConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is not a socket address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Check a configuration, collecting every error.
pub fn validate_config(config: &TesterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let positives = [
        ("upstream.timeout_secs", config.upstream.timeout_secs as usize),
        ("upstream.connect_timeout_secs", config.upstream.connect_timeout_secs as usize),
        ("upstream.max_body_bytes", config.upstream.max_body_bytes),
    ];
    let optional = [("timeouts.request_secs", config.timeouts.request_secs)];
    for (field, value) in positives {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }
    for (field, value) in optional {
        if value == Some(0) {
            errors.push(ValidationError::Zero { field });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
