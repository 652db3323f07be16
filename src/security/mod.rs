//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (trusted origins, preflight short-circuit)
//!     → rate_limit.rs (per-IP admission)
//!         → client_registry.rs (bucket per client, idle reclamation)
//!         → token_bucket.rs (refill arithmetic)
//!     → authentication
//! ```
//!
//! # Design Decisions
//! - Fail closed: a request whose client cannot be identified is not admitted
//! - Limiter state never leaves the registry

pub mod client_registry;
pub mod cors;
pub mod rate_limit;
pub mod token_bucket;

pub use client_registry::{Admission, ClientRegistry};
pub use cors::CorsPolicy;
pub use rate_limit::RateLimiter;
