use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{error::StoreError, repo::CredentialStore, repo_types::Credential};

/// In-process credential store keyed by email.
///
/// The existence check and the write in `insert` happen under one write
/// guard, which gives the same guarantee as a unique constraint.
#[derive(Default)]
pub struct MemoryCredentialStore {
    by_email: RwLock<HashMap<String, Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.by_email.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.by_email.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Credential, StoreError> {
        self.by_email
            .read()
            .await
            .get(email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Credential, StoreError> {
        self.by_email
            .read()
            .await
            .values()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Credential, StoreError> {
        let mut map = self.by_email.write().await;
        if map.contains_key(email) || map.values().any(|c| c.id == id) {
            return Err(StoreError::Conflict);
        }
        let credential = Credential {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        map.insert(email.to_string(), credential.clone());
        Ok(credential)
    }
}
