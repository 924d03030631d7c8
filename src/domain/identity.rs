//! Caller identity resolution

use std::fmt::Debug;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

/// Resolves the identity of the current caller
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync + Debug {
    /// Returns the caller's user ID, or `None` for guests
    async fn current_user(&self) -> Result<Option<String>, DomainError>;
}

/// Resolver for unauthenticated contexts; every caller is a guest
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousIdentity;

#[async_trait]
impl IdentityResolver for AnonymousIdentity {
    async fn current_user(&self) -> Result<Option<String>, DomainError> {
        Ok(None)
    }
}

/// Resolver bound to a single known user
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    user_id: String,
}

impl StaticIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentity {
    async fn current_user(&self) -> Result<Option<String>, DomainError> {
        Ok(Some(self.user_id.clone()))
    }
}
