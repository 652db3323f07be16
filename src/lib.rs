//! Request pipeline for an HTTP API.
//!
//! Every request passes metrics, panic recovery, CORS, per-client rate
//! limiting and bearer-token authentication before it reaches a route.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
