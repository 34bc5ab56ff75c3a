//! Schema-driven field validation for submitted records.
//!
//! Layout:
//! - `schema.rs`: field declarations and the catalog schema
//! - `validator.rs`: rule evaluation producing a normalized [`Record`]

pub mod schema;
pub mod validator;

pub use schema::{BACKROOM_SCHEMA, FieldKind, FieldSpec, Schema};
pub use validator::{FieldValue, Record, validate};

use thiserror::Error;

/// A submitted value that failed a validation rule. Always a client fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("field `{0}` is required")]
    Missing(String),

    #[error("field `{0}` must be a string or a number")]
    UnsupportedType(String),

    #[error("field `{0}` must be an integer")]
    NotAnInteger(String),

    #[error("field `{0}` requires a selection")]
    NoneSelected(String),

    #[error("field `{0}` must not contain HTML tags")]
    MarkupDetected(String),

    #[error("field `{0}` is empty after removing disallowed content")]
    EmptyAfterSanitization(String),

    #[error("username may only contain letters, digits, underscores and periods (max {max} chars)")]
    InvalidUsername { max: usize },

    #[error("password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("password must be at most {max} bytes long")]
    PasswordTooLong { max: usize },
}
