//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Authorization: Bearer <token>
//!     → token.rs (HS256 signature, nbf/exp window)
//!     → identity.rs (subject → UserRecord via UserDirectory)
//!     → context.rs (Identity stored in request extensions)
//!     → handlers / authorization gate read it back
//! ```

pub mod context;
pub mod identity;
pub mod token;

pub use context::CurrentIdentity;
pub use identity::{
    DirectoryError, Identity, IdentityResolver, InMemoryDirectory, ResolveError, UserDirectory,
    UserRecord,
};
pub use token::{ttl_from_hours, Claims, TokenError, TokenVerifier};
