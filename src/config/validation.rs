//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits >= 1, buffer large enough)
//! - Check addresses parse when the feature using them is enabled
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs after file and CLI values are merged, before any socket is bound

use std::fmt;
use std::net::SocketAddr;
use tokio::sync::Semaphore;

use crate::config::schema::ServerConfig;

/// Smallest read buffer that can hold a minimal request line.
pub const MIN_READ_BUFFER_BYTES: usize = 16;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a merged configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.limits.max_per_client == 0 {
        errors.push(ValidationError::new("limits.max_per_client", "must be at least 1"));
    }
    if config.limits.max_total == 0 {
        errors.push(ValidationError::new("limits.max_total", "must be at least 1"));
    } else if config.limits.max_total > Semaphore::MAX_PERMITS {
        errors.push(ValidationError::new(
            "limits.max_total",
            format!("must not exceed {}", Semaphore::MAX_PERMITS),
        ));
    }

    if config.connection.read_buffer_bytes < MIN_READ_BUFFER_BYTES {
        errors.push(ValidationError::new(
            "connection.read_buffer_bytes",
            format!("must be at least {MIN_READ_BUFFER_BYTES}"),
        ));
    }

    let index = config.files.index_file.trim_start_matches('/');
    if index.is_empty() {
        errors.push(ValidationError::new("files.index_file", "must not be empty"));
    }

    if config
        .security
        .blocked_user_agents
        .iter()
        .any(|pattern| pattern.trim().is_empty())
    {
        errors.push(ValidationError::new(
            "security.blocked_user_agents",
            "patterns must not be empty (an empty pattern blocks everyone)",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let mut config = ServerConfig::default();
        config.limits.max_per_client = 0;
        config.limits.max_total = 0;
        config.connection.read_buffer_bytes = 4;
        config.files.index_file = "/".into();
        config.security.blocked_user_agents.push("  ".into());
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "limits.max_per_client",
                "limits.max_total",
                "connection.read_buffer_bytes",
                "files.index_file",
                "security.blocked_user_agents",
                "observability.metrics_address",
            ]
        );
    }

    #[test]
    fn metrics_address_ignored_when_disabled() {
        let mut config = ServerConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn max_total_bounded_by_semaphore() {
        let mut config = ServerConfig::default();
        config.limits.max_total = Semaphore::MAX_PERMITS + 1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "limits.max_total");
    }
}
