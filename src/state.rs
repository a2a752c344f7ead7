use std::sync::Arc;

use anyhow::Context;

use crate::auth::{AuthService, JwtIssuer, PasswordHasher, PgCredentialStore};
use crate::config::AppConfig;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Connects the database and wires the auth service from configuration.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(config).await?;
        db::migrate(&pool).await?;

        let store = Arc::new(PgCredentialStore::new(pool));
        let issuer = Arc::new(JwtIssuer::new(&config.token).context("build token issuer")?);
        let hasher = PasswordHasher::new(config.hash).context("build password hasher")?;

        Ok(Self::from_service(AuthService::new(
            store,
            issuer,
            hasher,
            config.timeouts,
        )))
    }

    pub fn from_service(auth: AuthService) -> Self {
        Self {
            auth: Arc::new(auth),
        }
    }
}
