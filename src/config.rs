use axum_extra::extract::cookie::Key;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Development-only fallback. `main` warns whenever it is in effect.
pub const INSECURE_DEFAULT_SECRET: &str =
    "insecure-development-session-secret-replace-me-via-SESSION_SECRET-env-var";

/// Cookie signing/encryption needs a 64-byte master key.
pub const MIN_SECRET_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("SESSION_SECRET must be at least 64 bytes, got {0}")]
    SecretTooShort(usize),

    #[error("bcrypt cost must be within 4..=31, got {0}")]
    BcryptCost(u32),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub database_url: String,
    pub session_secret: String,
    pub loglevel: String,
    pub static_dir: PathBuf,
    pub bcrypt_cost: u32,
    pub min_password_len: usize,
    pub session_ttl_secs: u64,
    pub session_sweep_secs: u64,
    pub query_timeout_secs: u64,
    pub protect_reads: bool,
    pub protect_writes: bool,
    /// Drop the `Secure` cookie flag, for plain-HTTP local development.
    ///
    /// Off by default: browsers then only send the session cookie back over
    /// HTTPS (or to `localhost`), so a plain-HTTP deployment on another host
    /// cannot stay logged in.
    pub insecure_cookie: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            database_url: "sqlite:backrooms.db".to_string(),
            session_secret: INSECURE_DEFAULT_SECRET.to_string(),
            loglevel: "info".to_string(),
            static_dir: PathBuf::from("public"),
            bcrypt_cost: 10,
            min_password_len: 6,
            session_ttl_secs: 60 * 60 * 8,
            session_sweep_secs: 60 * 10,
            query_timeout_secs: 5,
            protect_reads: false,
            protect_writes: true,
            insecure_cookie: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("database_url", &self.database_url)
            .field("session_secret", &"<redacted>")
            .field("loglevel", &self.loglevel)
            .field("static_dir", &self.static_dir)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("min_password_len", &self.min_password_len)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("session_sweep_secs", &self.session_sweep_secs)
            .field("query_timeout_secs", &self.query_timeout_secs)
            .field("protect_reads", &self.protect_reads)
            .field("protect_writes", &self.protect_writes)
            .field("insecure_cookie", &self.insecure_cookie)
            .finish()
    }
}

impl Config {
    /// Defaults, then `DATABASE_URL`/`SESSION_SECRET`/`LOGLEVEL`/`LISTEN_ADDR`,
    /// then any `BACKROOMS_*` variable.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(&[
                "database_url",
                "session_secret",
                "loglevel",
                "listen_addr",
            ]))
            .merge(Env::prefixed("BACKROOMS_"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        let cfg: Config = Self::figment().extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort(self.session_secret.len()));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::BcryptCost(self.bcrypt_cost));
        }
        Ok(())
    }

    pub fn uses_default_secret(&self) -> bool {
        self.session_secret == INSECURE_DEFAULT_SECRET
    }

    /// Development defaults paired with a `Secure` cookie: the usual sign of a
    /// plain-HTTP setup where logins will not stick.
    pub fn secure_cookie_with_dev_defaults(&self) -> bool {
        !self.insecure_cookie && self.uses_default_secret()
    }

    pub fn cookie_key(&self) -> Result<Key, ConfigError> {
        Key::try_from(self.session_secret.as_bytes())
            .map_err(|_| ConfigError::SecretTooShort(self.session_secret.len()))
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_secs.max(1))
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}
