use axum::{
    Router,
    extract::FromRef,
    routing::{delete, get, get_service},
};
use axum_extra::extract::cookie::Key;
use std::path::PathBuf;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::{BackroomsStorage, Database, SessionsStorage, UsersStorage};
use crate::error::CatalogError;
use crate::handlers::{auth, backrooms};
use crate::service::{CredentialManager, CredentialPolicy};

/// Which catalog routes need a logged-in session.
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    pub protect_reads: bool,
    pub protect_writes: bool,
}

/// Services shared by every handler. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub backrooms: BackroomsStorage,
    pub credentials: CredentialManager,
    pub access: AccessPolicy,
    pub key: Key,
    pub secure_cookie: bool,
    pub static_dir: PathBuf,
}

impl AppState {
    pub async fn build(cfg: &Config, db: Database) -> Result<Self, CatalogError> {
        let policy = CredentialPolicy {
            bcrypt_cost: cfg.bcrypt_cost,
            min_password_len: cfg.min_password_len,
            session_ttl: cfg.session_ttl(),
        };
        let credentials = CredentialManager::new(
            UsersStorage::new(db.clone()),
            SessionsStorage::new(db.clone()),
            policy,
        )
        .await?;
        let key = cfg.cookie_key()?;

        Ok(Self {
            backrooms: BackroomsStorage::new(db),
            credentials,
            access: AccessPolicy {
                protect_reads: cfg.protect_reads,
                protect_writes: cfg.protect_writes,
            },
            key,
            secure_cookie: !cfg.insecure_cookie,
            static_dir: cfg.static_dir.clone(),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

pub fn app_router(state: AppState) -> Router {
    let static_dir = state.static_dir.clone();
    Router::new()
        .route(
            "/backrooms",
            get(backrooms::list_backrooms).post(backrooms::create_backroom),
        )
        .route("/backrooms/{id}", delete(backrooms::delete_backroom))
        .route(
            "/register",
            get_service(ServeFile::new(static_dir.join("register.html")))
                .post(auth::register),
        )
        .route(
            "/login",
            get_service(ServeFile::new(static_dir.join("login.html"))).post(auth::login),
        )
        .route("/logout", get(auth::logout))
        .route("/me", get(auth::me))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
