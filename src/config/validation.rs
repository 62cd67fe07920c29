//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (page size, timeouts)
//! - Check the endpoint parses and the proxy address is literal IPv4
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::IpAddr;

use crate::config::schema::AppConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    MissingEndpoint,
    InvalidEndpoint(String),
    ZeroPageSize,
    ZeroTimeout,
    InvalidProxyAddress(String),
    DryRunWithoutCleanup,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingEndpoint => write!(f, "api.endpoint is required"),
            ValidationError::InvalidEndpoint(e) => {
                write!(f, "api.endpoint is not a valid URL: {}", e)
            }
            ValidationError::ZeroPageSize => write!(f, "api.page_size must be at least 1"),
            ValidationError::ZeroTimeout => write!(f, "api.timeout_secs must be at least 1"),
            ValidationError::InvalidProxyAddress(addr) => {
                write!(f, "sync.proxy_address '{}' must be a literal IPv4 address", addr)
            }
            ValidationError::DryRunWithoutCleanup => {
                write!(f, "sync.cleanup.dry_run has no effect without sync.cleanup.enabled")
            }
        }
    }
}

/// Check every semantic constraint, collecting all violations.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.api.endpoint.is_empty() {
        errors.push(ValidationError::MissingEndpoint);
    } else if let Err(e) = config.api.endpoint.parse::<url::Url>() {
        errors.push(ValidationError::InvalidEndpoint(e.to_string()));
    }

    if config.api.page_size == 0 {
        errors.push(ValidationError::ZeroPageSize);
    }

    if config.api.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if let Some(addr) = &config.sync.proxy_address {
        match addr.parse::<IpAddr>() {
            Ok(IpAddr::V4(_)) => {}
            _ => errors.push(ValidationError::InvalidProxyAddress(addr.clone())),
        }
    }

    if config.sync.cleanup.dry_run && !config.sync.cleanup.enabled {
        errors.push(ValidationError::DryRunWithoutCleanup);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
