//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and cross-field
//! rules. All errors are collected, not just the first.

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),
    #[error("timeouts.request_secs must be at least 1")]
    RequestTimeout,
    #[error("timeouts.shutdown_grace_secs must be at least 1")]
    ShutdownGrace,
    #[error("limiter.requests_per_second must be a positive number, got {0}")]
    RequestsPerSecond(f64),
    #[error("limiter.burst must be at least 1")]
    Burst,
    #[error("jwt.secret must not be empty")]
    EmptySecret,
    #[error("jwt.token_ttl_hours must be at least 1")]
    TokenTtl,
    #[error("cors.trusted_origins contains an invalid origin `{0}`")]
    Origin(String),
    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
    #[error("users contains an empty public_id")]
    EmptyUserId,
    #[error("users contains duplicate public_id `{0}`")]
    DuplicateUserId(String),
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }
    if config.timeouts.shutdown_grace_secs == 0 {
        errors.push(ValidationError::ShutdownGrace);
    }

    if config.limiter.enabled {
        let rps = config.limiter.requests_per_second;
        if !rps.is_finite() || rps <= 0.0 {
            errors.push(ValidationError::RequestsPerSecond(rps));
        }
        if config.limiter.burst == 0 {
            errors.push(ValidationError::Burst);
        }
    }

    if config.jwt.secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }
    if config.jwt.token_ttl_hours == 0 {
        errors.push(ValidationError::TokenTtl);
    }

    for origin in &config.cors.trusted_origins {
        if origin.trim().is_empty() || HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::Origin(origin.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for user in &config.users {
        if user.public_id.trim().is_empty() {
            errors.push(ValidationError::EmptyUserId);
        } else if !seen.insert(user.public_id.as_str()) {
            errors.push(ValidationError::DuplicateUserId(user.public_id.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
