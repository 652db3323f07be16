//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, connect info, graceful shutdown)
//!     → pipeline.rs (ordered stages, see middleware/ and security/)
//!     → routes.rs (dispatcher)
//!     → response.rs (errors as JSON)
//!     → Send to client
//! ```

pub mod middleware;
pub mod pipeline;
pub mod response;
pub mod routes;
pub mod server;

pub use response::ApiError;
pub use server::{build_router, AppState, HttpServer};
