use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::db::{Backroom, NewBackroom};
use crate::error::CatalogError;
use crate::middleware::CurrentSession;
use crate::router::AppState;
use crate::validation::{BACKROOM_SCHEMA, validate};

#[derive(Debug, Serialize)]
pub struct Created {
    pub message: &'static str,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

/// GET /backrooms
pub async fn list_backrooms(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<Vec<Backroom>>, CatalogError> {
    session.require_if(state.access.protect_reads)?;
    Ok(Json(state.backrooms.list().await?))
}

/// POST /backrooms: validate and sanitize the body, then insert it.
pub async fn create_backroom(
    State(state): State<AppState>,
    session: CurrentSession,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Created>, CatalogError> {
    let session = session.require_if(state.access.protect_writes)?;
    let Json(body) = body?;

    let record = validate(&BACKROOM_SCHEMA, &body)?;
    let entry = NewBackroom::try_from(&record)?;

    let id = state.backrooms.insert(entry).await?;
    info!(
        id,
        user = %session.as_ref().map(|s| s.username.as_str()).unwrap_or("<anonymous>"),
        "backroom created"
    );
    Ok(Json(Created {
        message: "Backroom created.",
        id,
    }))
}

/// DELETE /backrooms/{id}
pub async fn delete_backroom(
    State(state): State<AppState>,
    session: CurrentSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Message>, CatalogError> {
    let session = session.require_if(state.access.protect_writes)?;
    let Path(id) = id?;
    state.backrooms.delete(id).await?;
    info!(
        id,
        user = %session.as_ref().map(|s| s.username.as_str()).unwrap_or("<anonymous>"),
        "backroom deleted"
    );
    Ok(Json(Message {
        message: "Backroom deleted.",
    }))
}
