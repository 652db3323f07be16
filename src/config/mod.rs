//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → cli.rs (command-line overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → read once at startup by every subsystem
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; nothing re-reads it per request
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::CliOverrides;
pub use loader::{load_config, ConfigError};
pub use schema::{
    AppConfig, CorsConfig, JwtConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    RateLimitConfig, TimeoutConfig, UserSeed,
};
pub use validation::{validate_config, ValidationError};
