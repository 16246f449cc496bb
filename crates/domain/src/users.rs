//! User directory: who the store's customers are and where their
//! wallet, cart and library live.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{AggregateId, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::CommerceError;

/// A registered user and the aggregates opened for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub wallet_id: AggregateId,
    pub cart_id: AggregateId,
    pub library_id: AggregateId,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<UserRef, CommerceError>;

    /// Email lookup ignores ASCII case.
    async fn find_by_email(&self, email: &str) -> Option<UserRef>;

    /// Publishes a user. Fails if the email is already taken.
    async fn insert(&self, user: UserRef) -> Result<(), CommerceError>;
}

#[derive(Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, UserRef>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, id: UserId) -> Result<UserRef, CommerceError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CommerceError::not_found("User", id))
    }

    async fn find_by_email(&self, email: &str) -> Option<UserRef> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    async fn insert(&self, user: UserRef) -> Result<(), CommerceError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(CommerceError::invalid_input(format!(
                "email already registered: {}",
                user.email
            )));
        }
        users.insert(user.id, user);
        Ok(())
    }
}
