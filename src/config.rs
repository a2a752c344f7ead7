use std::time::Duration;

use anyhow::Context;

/// Signing material for custom tokens.
#[derive(Debug, Clone)]
pub enum SigningKey {
    /// HS256 shared secret.
    Secret(String),
    /// RS256 private key (PEM), with an optional public key for verification.
    Rsa {
        private_pem: Vec<u8>,
        public_pem: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub key: SigningKey,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Argon2 work factor.
#[derive(Debug, Clone, Copy)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub store: Duration,
    pub issuer: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            store: Duration::from_millis(5000),
            issuer: Duration::from_millis(5000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub token: TokenConfig,
    pub hash: HashConfig,
    pub timeouts: Timeouts,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let key = match (
            std::env::var("TOKEN_SECRET").ok(),
            std::env::var("TOKEN_PRIVATE_KEY_PATH").ok(),
        ) {
            (_, Some(path)) => {
                let private_pem = std::fs::read(&path)
                    .with_context(|| format!("read token private key {path}"))?;
                let public_pem = match std::env::var("TOKEN_PUBLIC_KEY_PATH") {
                    Ok(p) => Some(
                        std::fs::read(&p)
                            .with_context(|| format!("read token public key {p}"))?,
                    ),
                    Err(_) => None,
                };
                SigningKey::Rsa {
                    private_pem,
                    public_pem,
                }
            }
            (Some(secret), None) => SigningKey::Secret(secret),
            (None, None) => {
                anyhow::bail!("either TOKEN_SECRET or TOKEN_PRIVATE_KEY_PATH must be set")
            }
        };

        let token = TokenConfig {
            key,
            issuer: std::env::var("TOKEN_ISSUER").unwrap_or_else(|_| "keyward".into()),
            audience: std::env::var("TOKEN_AUDIENCE")
                .unwrap_or_else(|_| "keyward-clients".into()),
            ttl_minutes: env_or("TOKEN_TTL_MINUTES", 60),
        };

        let defaults = HashConfig::default();
        let hash = HashConfig {
            memory_kib: env_or("HASH_MEMORY_KIB", defaults.memory_kib),
            iterations: env_or("HASH_ITERATIONS", defaults.iterations),
            parallelism: env_or("HASH_PARALLELISM", defaults.parallelism),
        };

        let timeouts = Timeouts {
            store: Duration::from_millis(env_or("STORE_TIMEOUT_MS", 5000)),
            issuer: Duration::from_millis(env_or("ISSUER_TIMEOUT_MS", 5000)),
        };

        Ok(Self {
            database_url,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080),
            token,
            hash,
            timeouts,
        })
    }
}
