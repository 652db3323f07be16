//! Pipeline stages implemented as axum middleware functions.
//!
//! The rate limiting and CORS stages live in `crate::security`.

pub mod authenticate;
pub mod metrics;
pub mod recover;
pub mod require_auth;

pub use authenticate::{authenticate_middleware, Authenticator};
pub use metrics::metrics_middleware;
pub use recover::recover_panic_middleware;
pub use require_auth::require_authenticated_user;
