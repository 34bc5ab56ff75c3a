use crate::db::{DbSession, SessionsStorage, UsersStorage};
use crate::error::CatalogError;
use crate::sanitize::contains_markup;
use crate::service::password::{MAX_PASSWORD_BYTES, hash_password, verify_password};
use crate::validation::ValidationError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const MAX_USERNAME_LEN: usize = 64;

/// Letters, digits, underscore and period only.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]{1,64}$").unwrap());

/// Hashed when a login names an unknown user so both failure paths cost one bcrypt run.
const DUMMY_PASSWORD: &str = "backrooms-dummy-password";

/// Username/password pair as submitted by a client.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CredentialPolicy {
    pub bcrypt_cost: u32,
    pub min_password_len: usize,
    pub session_ttl: Duration,
}

/// An authenticated identity bound to a session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub id: String,
    pub user_id: i64,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl From<DbSession> for AuthSession {
    fn from(s: DbSession) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            username: s.username,
            expires_at: DateTime::from_timestamp(s.expires_at, 0).unwrap_or_default(),
        }
    }
}

/// Registration, login and session lifecycle over the user and session tables.
#[derive(Clone)]
pub struct CredentialManager {
    users: UsersStorage,
    sessions: SessionsStorage,
    policy: CredentialPolicy,
    dummy_hash: Arc<str>,
}

impl CredentialManager {
    pub async fn new(
        users: UsersStorage,
        sessions: SessionsStorage,
        policy: CredentialPolicy,
    ) -> Result<Self, CatalogError> {
        let cost = policy.bcrypt_cost;
        let dummy_hash =
            tokio::task::spawn_blocking(move || hash_password(DUMMY_PASSWORD, cost)).await??;
        Ok(Self {
            users,
            sessions,
            policy,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// Create a user. Returns the new user id.
    pub async fn register(&self, creds: Credentials) -> Result<i64, CatalogError> {
        let (username, password) =
            check_registration(&creds.username, &creds.password, self.policy.min_password_len)?;

        if self.users.exists(&username).await? {
            info!(username = %username, "registration rejected: username taken");
            return Err(CatalogError::DuplicateUser);
        }

        let cost = self.policy.bcrypt_cost;
        let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??;

        let id = self.users.insert(&username, &hash).await?;
        info!(username = %username, user_id = id, "user registered");
        Ok(id)
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown usernames and wrong passwords both end in `InvalidCredentials`.
    pub async fn login(&self, creds: Credentials) -> Result<AuthSession, CatalogError> {
        let username = creds.username.trim().to_string();
        if username.is_empty() || creds.password.is_empty() {
            return Err(ValidationError::Missing(
                if username.is_empty() { "username" } else { "password" }.to_string(),
            )
            .into());
        }

        let user = self.users.find_by_username(&username).await?;
        let (user_id, stored_hash) = match &user {
            Some(u) => (Some(u.id), u.password_hash.clone()),
            None => (None, self.dummy_hash.to_string()),
        };

        let password = creds.password;
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await?;

        let Some(user_id) = user_id.filter(|_| matches) else {
            warn!(username = %username, "login failed");
            return Err(CatalogError::InvalidCredentials);
        };

        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.policy.session_ttl)
                .unwrap_or_else(|_| chrono::Duration::hours(8));
        let id = Uuid::new_v4().simple().to_string();
        self.sessions
            .insert(&id, user_id, expires_at.timestamp())
            .await?;
        info!(username = %username, user_id, "session opened");

        Ok(AuthSession {
            id,
            user_id,
            username,
            expires_at,
        })
    }

    /// Look up a live session by id.
    pub async fn resolve_session(&self, id: &str) -> Result<Option<AuthSession>, CatalogError> {
        let session = self
            .sessions
            .find_active(id, Utc::now().timestamp())
            .await?;
        Ok(session.map(AuthSession::from))
    }

    pub async fn logout(&self, id: &str) -> Result<(), CatalogError> {
        if self.sessions.delete(id).await? {
            debug!("session closed");
        }
        Ok(())
    }

    /// Drop expired sessions. Returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> Result<u64, CatalogError> {
        self.sessions.purge_expired(Utc::now().timestamp()).await
    }
}

/// Registration input rules. Returns the normalized username and the password.
///
/// Any markup in either value rejects the registration outright. Nothing is
/// stripped, so usernames and passwords are stored exactly as submitted.
pub fn check_registration(
    username: &str,
    password: &str,
    min_password_len: usize,
) -> Result<(String, String), ValidationError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::Missing("username".to_string()));
    }
    if password.is_empty() {
        return Err(ValidationError::Missing("password".to_string()));
    }

    for (field, value) in [("username", username), ("password", password)] {
        if contains_markup(value) {
            return Err(ValidationError::MarkupDetected(field.to_string()));
        }
    }

    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::InvalidUsername {
            max: MAX_USERNAME_LEN,
        });
    }
    if password.chars().count() < min_password_len {
        return Err(ValidationError::PasswordTooShort {
            min: min_password_len,
        });
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::PasswordTooLong {
            max: MAX_PASSWORD_BYTES,
        });
    }
    Ok((username.to_string(), password.to_string()))
}
