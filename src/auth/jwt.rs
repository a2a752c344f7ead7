use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::error::IssuerError,
    config::{SigningKey, TokenConfig},
};

/// Custom tokens are short-lived; they are meant to be exchanged, not kept.
const MAX_TTL_MINUTES: i64 = 60;

/// Mints opaque signed tokens for a credential id.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn mint_custom_token(&self, subject: Uuid) -> Result<String, IssuerError>;
}

/// Custom token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomClaims {
    pub iss: String, // issuing service
    pub sub: String, // issuing service, as for identity-platform custom tokens
    pub aud: String, // audience
    pub uid: Uuid,   // credential id
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
}

/// Local JWT issuer signing with HS256 or RS256.
#[derive(Clone)]
pub struct JwtIssuer {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: Option<DecodingKey>,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtIssuer {
    pub fn new(cfg: &TokenConfig) -> Result<Self, IssuerError> {
        let (algorithm, encoding, decoding) = match &cfg.key {
            SigningKey::Secret(secret) => (
                Algorithm::HS256,
                EncodingKey::from_secret(secret.as_bytes()),
                Some(DecodingKey::from_secret(secret.as_bytes())),
            ),
            SigningKey::Rsa {
                private_pem,
                public_pem,
            } => (
                Algorithm::RS256,
                EncodingKey::from_rsa_pem(private_pem)?,
                public_pem
                    .as_deref()
                    .map(DecodingKey::from_rsa_pem)
                    .transpose()?,
            ),
        };
        let minutes = cfg.ttl_minutes.clamp(1, MAX_TTL_MINUTES);
        Ok(Self {
            algorithm,
            encoding,
            decoding,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((minutes as u64) * 60),
        })
    }

    pub fn sign(&self, uid: Uuid) -> Result<String, IssuerError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = CustomClaims {
            iss: self.issuer.clone(),
            sub: self.issuer.clone(),
            aud: self.audience.clone(),
            uid,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(user_id = %uid, alg = ?self.algorithm, "custom token signed");
        Ok(token)
    }

    /// Decodes a token minted by this issuer, checking signature, issuer,
    /// audience and expiry.
    pub fn verify(&self, token: &str) -> anyhow::Result<CustomClaims> {
        let decoding = self
            .decoding
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no verification key configured"))?;
        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<CustomClaims>(token, decoding, &validation)?;
        debug!(user_id = %data.claims.uid, "custom token verified");
        Ok(data.claims)
    }
}

#[async_trait]
impl TokenIssuer for JwtIssuer {
    async fn mint_custom_token(&self, subject: Uuid) -> Result<String, IssuerError> {
        self.sign(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_issuer(secret: &str, issuer: &str, audience: &str) -> JwtIssuer {
        JwtIssuer::new(&TokenConfig {
            key: SigningKey::Secret(secret.into()),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 5,
        })
        .expect("hs256 issuer")
    }

    #[tokio::test]
    async fn mint_and_verify_custom_token() {
        let issuer = make_issuer("dev-secret", "test-issuer", "test-aud");
        let uid = Uuid::new_v4();
        let token = issuer.mint_custom_token(uid).await.expect("mint");
        let claims = issuer.verify(&token).expect("verify token");
        assert_eq!(claims.uid, uid);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.sub, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.exp - claims.iat, 5 * 60);
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_issuer("same-secret", "good-iss", "good-aud");
        let bad = make_issuer("same-secret", "bad-iss", "bad-aud");
        let token = good.sign(Uuid::new_v4()).expect("sign");
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_other_secret() {
        let a = make_issuer("secret-a", "iss", "aud");
        let b = make_issuer("secret-b", "iss", "aud");
        let token = a.sign(Uuid::new_v4()).unwrap();
        assert!(b.verify(&token).is_err());
    }

    #[test]
    fn ttl_is_clamped() {
        let issuer = JwtIssuer::new(&TokenConfig {
            key: SigningKey::Secret("s".into()),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: 24 * 60,
        })
        .unwrap();
        let claims = issuer.verify(&issuer.sign(Uuid::new_v4()).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    fn rsa_config(public_pem: Option<&[u8]>) -> TokenConfig {
        TokenConfig {
            key: SigningKey::Rsa {
                private_pem: include_bytes!("../../tests/fixtures/rs256_private.pem").to_vec(),
                public_pem: public_pem.map(<[u8]>::to_vec),
            },
            issuer: "svc@keyward.test".into(),
            audience: "keyward-clients".into(),
            ttl_minutes: 30,
        }
    }

    #[tokio::test]
    async fn rsa_mint_and_verify() {
        let public_pem: &[u8] = include_bytes!("../../tests/fixtures/rs256_public.pem");
        let issuer = JwtIssuer::new(&rsa_config(Some(public_pem))).expect("rs256 issuer");
        let uid = Uuid::new_v4();
        let token = issuer.mint_custom_token(uid).await.expect("mint");

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);

        let claims = issuer.verify(&token).expect("verify");
        assert_eq!(claims.uid, uid);
        assert_eq!(claims.sub, "svc@keyward.test");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn rsa_without_public_key_cannot_verify() {
        let issuer = JwtIssuer::new(&rsa_config(None)).expect("rs256 issuer");
        let token = issuer.sign(Uuid::new_v4()).expect("sign");
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn rsa_token_rejected_by_hs256_issuer() {
        let rsa = JwtIssuer::new(&rsa_config(None)).unwrap();
        let hs = make_issuer("secret", "svc@keyward.test", "keyward-clients");
        let token = rsa.sign(Uuid::new_v4()).unwrap();
        assert!(hs.verify(&token).is_err());
    }

    #[test]
    fn rsa_rejects_garbage_pem() {
        let res = JwtIssuer::new(&TokenConfig {
            key: SigningKey::Rsa {
                private_pem: b"not a pem".to_vec(),
                public_pem: None,
            },
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: 60,
        });
        assert!(matches!(res, Err(IssuerError::Signing(_))));
    }
}
