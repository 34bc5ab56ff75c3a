use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Serialize;
use time::Duration;

use crate::error::CatalogError;
use crate::handlers::backrooms::Message;
use crate::middleware::auth::{SESSION_COOKIE, clear_session_cookie, session_cookie};
use crate::middleware::RequireSession;
use crate::router::AppState;
use crate::service::Credentials;

#[derive(Debug, Serialize)]
pub struct Identity {
    pub username: String,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Message>, CatalogError> {
    let Json(creds) = body?;
    state.credentials.register(creds).await?;
    Ok(Json(Message {
        message: "User registered.",
    }))
}

/// POST /login: on success the session id travels in an encrypted cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, CatalogError> {
    let Json(creds) = body?;
    let session = state.credentials.login(creds).await?;

    let ttl = Duration::seconds(
        (session.expires_at - chrono::Utc::now())
            .num_seconds()
            .max(0),
    );
    let jar = jar.add(session_cookie(session.id, ttl, state.secure_cookie));
    Ok((
        jar,
        Json(Identity {
            username: session.username,
        }),
    ))
}

/// GET /logout: drop the session, clear the cookie, back to the login view.
pub async fn logout(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<impl IntoResponse, CatalogError> {
    if let Some(id) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) {
        state.credentials.logout(&id).await?;
    }
    let jar = jar.remove(clear_session_cookie());
    Ok((jar, Redirect::to("/login")))
}

/// GET /me
pub async fn me(RequireSession(session): RequireSession) -> Json<Identity> {
    Json(Identity {
        username: session.username,
    })
}

