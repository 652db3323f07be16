//! Command-line overrides applied on top of the file configuration.

use clap::Args;

use crate::config::schema::AppConfig;

/// Flags that override individual configuration values.
#[derive(Debug, Clone, Default, Args)]
pub struct CliOverrides {
    /// API server port (keeps the configured host).
    #[arg(long)]
    pub port: Option<u16>,

    /// Environment (development|staging|production).
    #[arg(long)]
    pub env: Option<String>,

    /// Rate limiter maximum requests per second.
    #[arg(long)]
    pub limiter_rps: Option<f64>,

    /// Rate limiter maximum burst.
    #[arg(long)]
    pub limiter_burst: Option<u32>,

    /// Enable or disable the rate limiter.
    #[arg(long)]
    pub limiter_enabled: Option<bool>,

    /// Trusted CORS origins (space separated).
    #[arg(long)]
    pub cors_trusted_origins: Option<String>,

    /// Token signing secret.
    #[arg(long)]
    pub jwt_secret: Option<String>,
}

impl CliOverrides {
    /// Apply every flag that was given to `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            let host = config
                .listener
                .bind_address
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or("0.0.0.0");
            config.listener.bind_address = format!("{}:{}", host, port);
        }
        if let Some(env) = &self.env {
            config.environment = env.clone();
        }
        if let Some(rps) = self.limiter_rps {
            config.limiter.requests_per_second = rps;
        }
        if let Some(burst) = self.limiter_burst {
            config.limiter.burst = burst;
        }
        if let Some(enabled) = self.limiter_enabled {
            config.limiter.enabled = enabled;
        }
        if let Some(origins) = &self.cors_trusted_origins {
            config.cors.trusted_origins = origins.split_whitespace().map(String::from).collect();
        }
        if let Some(secret) = &self.jwt_secret {
            config.jwt.secret = secret.clone();
        }
    }
}
