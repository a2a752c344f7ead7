use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Credential record in the database.
#[derive(Clone, FromRow)]
pub struct Credential {
    pub id: Uuid,                   // token subject, never reused
    pub email: String,              // exact match, case-sensitive
    pub password_hash: String,      // Argon2 PHC string, never serialized
    pub created_at: OffsetDateTime, // set by the store
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}
