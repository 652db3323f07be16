//! Identity resolution.
//!
//! # Responsibilities
//! - Define the per-request `Identity` (anonymous or a known user)
//! - Map a verified token subject to a user record via a `UserDirectory`
//! - Provide an in-memory directory seeded from configuration
//!
//! # Design Decisions
//! - `Identity` is matched by tag; there is no sentinel "anonymous user" value
//! - An unknown subject stays distinct from a lookup failure internally, so the
//!   caller can answer 401 for one and 500 for the other

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;

use crate::config::UserSeed;

/// A user as returned by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub public_id: String,
    pub name: String,
    pub email: String,
    pub activated: bool,
}

impl From<UserSeed> for UserRecord {
    fn from(seed: UserSeed) -> Self {
        Self {
            public_id: seed.public_id,
            name: seed.name,
            email: seed.email,
            activated: seed.activated,
        }
    }
}

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated(Arc<UserRecord>),
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(user) => Some(user),
        }
    }
}

/// Errors reported by a [`UserDirectory`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("record not found")]
    NotFound,
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Source of user records, keyed by public id.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn lookup_by_subject(&self, subject: &str) -> Result<UserRecord, DirectoryError>;
}

/// Errors from [`IdentityResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no user for subject")]
    NotFound,
    #[error("user lookup failed: {0}")]
    Lookup(String),
}

impl From<DirectoryError> for ResolveError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::NotFound => ResolveError::NotFound,
            DirectoryError::Unavailable(msg) => ResolveError::Lookup(msg),
        }
    }
}

/// Turns a verified subject into an [`Identity`].
#[derive(Clone)]
pub struct IdentityResolver {
    directory: Arc<dyn UserDirectory>,
}

impl IdentityResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    pub fn anonymous(&self) -> Identity {
        Identity::Anonymous
    }

    pub async fn resolve(&self, subject: &str) -> Result<Identity, ResolveError> {
        let record = self.directory.lookup_by_subject(subject).await?;
        Ok(Identity::Authenticated(Arc::new(record)))
    }
}

/// A [`UserDirectory`] held in memory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: DashMap<String, UserRecord>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from configured seeds.
    pub fn from_seeds(seeds: impl IntoIterator<Item = UserSeed>) -> Self {
        let directory = Self::new();
        for seed in seeds {
            directory.insert(seed.into());
        }
        directory
    }

    pub fn insert(&self, record: UserRecord) {
        self.users.insert(record.public_id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn lookup_by_subject(&self, subject: &str) -> Result<UserRecord, DirectoryError> {
        self.users
            .get(subject)
            .map(|entry| entry.value().clone())
            .ok_or(DirectoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenDirectory;

    #[async_trait]
    impl UserDirectory for BrokenDirectory {
        async fn lookup_by_subject(&self, _subject: &str) -> Result<UserRecord, DirectoryError> {
            Err(DirectoryError::Unavailable("connection refused".into()))
        }
    }

    fn seed(id: &str) -> UserSeed {
        UserSeed {
            public_id: id.to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            activated: true,
        }
    }

    #[tokio::test]
    async fn resolves_known_subject() {
        let resolver = IdentityResolver::new(Arc::new(InMemoryDirectory::from_seeds([seed("usr_1")])));

        let identity = resolver.resolve("usr_1").await.unwrap();
        assert!(!identity.is_anonymous());
        assert_eq!(identity.user().unwrap().public_id, "usr_1");
    }

    #[tokio::test]
    async fn unknown_subject_is_not_found() {
        let resolver = IdentityResolver::new(Arc::new(InMemoryDirectory::new()));
        assert_eq!(resolver.resolve("usr_404").await, Err(ResolveError::NotFound));
    }

    #[tokio::test]
    async fn directory_failure_is_lookup_error() {
        let resolver = IdentityResolver::new(Arc::new(BrokenDirectory));
        assert_eq!(
            resolver.resolve("usr_1").await,
            Err(ResolveError::Lookup("connection refused".into()))
        );
    }

    #[test]
    fn anonymous_has_no_user() {
        let resolver = IdentityResolver::new(Arc::new(InMemoryDirectory::new()));
        let identity = resolver.anonymous();
        assert!(identity.is_anonymous());
        assert!(identity.user().is_none());
    }
}
