use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod error;
pub mod handlers;
pub mod jwt;
pub mod memory;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use error::AuthError;
pub use jwt::{JwtIssuer, TokenIssuer};
pub use memory::MemoryCredentialStore;
pub use password::PasswordHasher;
pub use repo::{CredentialStore, PgCredentialStore};
pub use services::AuthService;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
