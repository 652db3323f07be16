//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the API.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Deployment environment (development, staging, production).
    pub environment: String,

    /// Request and shutdown deadlines.
    pub timeouts: TimeoutConfig,

    /// Per-client rate limiting.
    pub limiter: RateLimitConfig,

    /// Cross-origin resource sharing.
    pub cors: CorsConfig,

    /// Bearer token signing.
    pub jwt: JwtConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Users served by the in-memory directory.
    pub users: Vec<UserSeed>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5500").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5500".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Maximum time to produce a response before answering 408.
    pub request_secs: u64,

    /// How long in-flight requests may drain after shutdown is triggered.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_grace_secs: 5,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Tokens refilled per second for each client.
    pub requests_per_second: f64,

    /// Burst capacity.
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 2.0,
            burst: 4,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to make cross-origin requests (exact match).
    pub trusted_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            trusted_origins: vec!["http://localhost:5500".to_string()],
        }
    }
}

/// Token signing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Shared HMAC secret.
    pub secret: String,

    /// Lifetime of minted tokens, in hours.
    pub token_ttl_hours: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            // WARNING: development secret. Override in production.
            secret: "pei3einoh0Beem6uM6Ungohn2heiv5lah1ael4joopie5JaigeikoozaoTew2Eh6".to_string(),
            token_ttl_hours: 24,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A user record seeded into the in-memory directory.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserSeed {
    /// Public identifier, used as the token subject.
    pub public_id: String,
    pub name: String,
    pub email: String,
    #[serde(default = "default_activated")]
    pub activated: bool,
}

fn default_activated() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            environment: "development".to_string(),
            timeouts: TimeoutConfig::default(),
            limiter: RateLimitConfig::default(),
            cors: CorsConfig::default(),
            jwt: JwtConfig::default(),
            observability: ObservabilityConfig::default(),
            users: Vec::new(),
        }
    }
}
