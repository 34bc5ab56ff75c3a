use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use time::Duration;

use crate::error::CatalogError;
use crate::router::AppState;
use crate::service::AuthSession;

pub const SESSION_COOKIE: &str = "backrooms_session";

/// Session attached to the request, if any.
///
/// Resolving it reads only the private cookie and the sessions table, so
/// handlers can gate on it before touching any catalog data.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<AuthSession>);

impl CurrentSession {
    pub fn require(self) -> Result<AuthSession, CatalogError> {
        self.0.ok_or(CatalogError::Unauthorized)
    }

    /// Require a session only when `protected` is set.
    pub fn require_if(self, protected: bool) -> Result<Option<AuthSession>, CatalogError> {
        if protected {
            self.require().map(Some)
        } else {
            Ok(self.0)
        }
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let jar = PrivateCookieJar::<Key>::from_headers(&parts.headers, state.key.clone());
        let Some(session_id) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
            return Ok(Self(None));
        };
        let session = state.credentials.resolve_session(&session_id).await?;
        Ok(Self(session))
    }
}

/// Extractor that rejects with 401 unless a live session is present.
#[derive(Debug, Clone)]
pub struct RequireSession(pub AuthSession);

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;
        session.map(Self).ok_or(CatalogError::Unauthorized)
    }
}

pub fn session_cookie(id: String, ttl: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(ttl)
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
