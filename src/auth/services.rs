use std::{future::Future, sync::Arc, time::Duration};

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        error::{AuthError, HashError, IssuerError, StoreError},
        jwt::TokenIssuer,
        password::PasswordHasher,
        repo::CredentialStore,
    },
    config::Timeouts,
};

/// Registration and login over an injected store and token issuer.
///
/// Holds no mutable state; one instance is shared by all request handlers.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    issuer: Arc<dyn TokenIssuer>,
    hasher: PasswordHasher,
    timeouts: Timeouts,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        issuer: Arc<dyn TokenIssuer>,
        hasher: PasswordHasher,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            store,
            issuer,
            hasher,
            timeouts,
        }
    }

    /// Exchanges a verified email/password pair for a custom token.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let credential = match self.store_call(self.store.find_by_email(email)).await {
            Ok(c) => c,
            Err(StoreError::NotFound) => {
                self.verify_dummy_blocking(password.to_owned()).await;
                warn!("login unknown email");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "find_by_email failed");
                return Err(AuthError::Internal);
            }
        };

        let ok = self
            .verify_blocking(password.to_owned(), credential.password_hash.clone())
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %credential.id, "verify_password failed");
                AuthError::Internal
            })?;

        if !ok {
            warn!(user_id = %credential.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.mint(credential.id).await?;
        info!(user_id = %credential.id, "user logged in");
        Ok(token)
    }

    /// Creates a credential and returns a custom token for it.
    ///
    /// The lookup is only a fast path; the store's uniqueness check on insert
    /// decides races between concurrent registrations of one email.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<String, AuthError> {
        match self.store_call(self.store.find_by_email(email)).await {
            Ok(_) => {
                warn!("email already registered");
                return Err(AuthError::AlreadyExists);
            }
            Err(StoreError::NotFound) => {}
            Err(e) => {
                error!(error = %e, "find_by_email failed");
                return Err(AuthError::Internal);
            }
        }

        let id = Uuid::new_v4();

        let hash = self.hash_blocking(password.to_owned()).await.map_err(|e| {
            error!(error = %e, "hash_password failed");
            AuthError::Internal
        })?;

        match self.store_call(self.store.insert(id, email, &hash)).await {
            Ok(_) => {}
            Err(StoreError::Conflict) => {
                warn!("email registered concurrently");
                return Err(AuthError::AlreadyExists);
            }
            Err(e) => {
                error!(error = %e, "insert credential failed");
                return Err(AuthError::Internal);
            }
        }

        let token = self.mint(id).await?;
        info!(user_id = %id, "user registered");
        Ok(token)
    }

    async fn mint(&self, id: Uuid) -> Result<String, AuthError> {
        let res = with_timeout(
            self.timeouts.issuer,
            self.issuer.mint_custom_token(id),
            || IssuerError::Timeout,
        )
        .await;
        res.map_err(|e| {
            error!(error = %e, user_id = %id, "mint_custom_token failed");
            AuthError::Internal
        })
    }

    async fn store_call<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        let limit = self.timeouts.store;
        with_timeout(limit, fut, || {
            StoreError::Unavailable(anyhow::anyhow!("store call timed out after {limit:?}"))
        })
        .await
    }

    async fn hash_blocking(&self, plain: String) -> Result<String, HashError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| HashError::Hashing(e.to_string()))?
    }

    /// Spends one verification's worth of work so an unknown email is not
    /// answered faster than a wrong password.
    async fn verify_dummy_blocking(&self, plain: String) {
        let hasher = self.hasher.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || hasher.verify_dummy(&plain)).await {
            error!(error = %e, "dummy verify task failed");
        }
    }

    async fn verify_blocking(&self, plain: String, hash: String) -> Result<bool, HashError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
            .await
            .map_err(|e| HashError::Hashing(e.to_string()))?
    }
}

async fn with_timeout<T, E>(
    limit: Duration,
    fut: impl Future<Output = Result<T, E>>,
    on_timeout: impl FnOnce() -> E,
) -> Result<T, E> {
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(on_timeout()),
    }
}
