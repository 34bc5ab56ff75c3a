use crate::validation::{Record, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Backroom {
    pub id: i64,
    pub level: String,
    pub entities: Option<String>,
    pub danger_level: i64,
    pub entry_method: String,
    pub investigation_status: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Column values for an insert, taken from a validated [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewBackroom {
    pub level: String,
    pub entities: Option<String>,
    pub danger_level: i64,
    pub entry_method: String,
    pub investigation_status: Option<String>,
    pub description: String,
}

impl TryFrom<&Record> for NewBackroom {
    type Error = ValidationError;

    fn try_from(r: &Record) -> Result<Self, Self::Error> {
        let text = |name: &str| {
            r.text(name)
                .map(str::to_string)
                .ok_or_else(|| ValidationError::Missing(name.to_string()))
        };
        Ok(Self {
            level: text("level")?,
            entities: r.text("entities").map(str::to_string),
            danger_level: r
                .integer("danger_level")
                .ok_or_else(|| ValidationError::Missing("danger_level".to_string()))?,
            entry_method: text("entry_method")?,
            investigation_status: r.text("investigation_status").map(str::to_string),
            description: text("description")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbUser {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbSession {
    pub id: String,
    pub user_id: i64,
    pub username: String,
    pub expires_at: i64,
}
