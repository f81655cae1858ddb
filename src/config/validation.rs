//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("listener.max_connections must be greater than 0")]
    ZeroMaxConnections,

    #[error("backend.address {0:?} is not host:port")]
    InvalidBackendAddress(String),

    #[error("backend.connect_timeout_ms must be greater than 0")]
    ZeroConnectTimeout,

    #[error("backend.address must differ from listener.bind_address")]
    BackendIsListener,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let bind_address = &config.listener.bind_address;
    if bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(bind_address.clone()));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }

    let backend_address = &config.backend.address;
    if !is_host_port(backend_address) {
        errors.push(ValidationError::InvalidBackendAddress(backend_address.clone()));
    }
    if config.backend.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }
    if backend_address == bind_address {
        errors.push(ValidationError::BackendIsListener);
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port` with a non-empty host and a numeric port. IPv6 hosts use brackets.
fn is_host_port(address: &str) -> bool {
    if address.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match address.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty() && !host.contains(':') && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn hostname_backend_is_valid() {
        let mut config = ProxyConfig::default();
        config.backend.address = "redis.internal:6379".to_string();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "localhost".to_string();
        config.listener.max_connections = 0;
        config.backend.address = "no-port".to_string();
        config.backend.connect_timeout_ms = 0;
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidBindAddress("localhost".to_string()),
                ValidationError::ZeroMaxConnections,
                ValidationError::InvalidBackendAddress("no-port".to_string()),
                ValidationError::ZeroConnectTimeout,
                ValidationError::InvalidMetricsAddress("nowhere".to_string()),
            ]
        );
    }

    #[test]
    fn backend_must_not_loop_back_to_listener() {
        let mut config = ProxyConfig::default();
        config.backend.address = config.listener.bind_address.clone();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::BackendIsListener])
        );
    }

    #[test]
    fn host_port_forms() {
        assert!(is_host_port("127.0.0.1:6379"));
        assert!(is_host_port("[::1]:6379"));
        assert!(is_host_port("cache:6379"));
        assert!(!is_host_port(":6379"));
        assert!(!is_host_port("cache:port"));
        assert!(!is_host_port("::1:6379"));
    }
}
