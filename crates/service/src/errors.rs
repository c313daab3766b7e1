use thiserror::Error;

use models::errors::ModelError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn forbidden(action: &str) -> Self { Self::Forbidden(format!("{} requires staff role", action)) }

    /// Lift model-level variants so callers only match one layer.
    pub fn flatten(self) -> Self {
        match self {
            Self::Model(ModelError::Validation(m)) => Self::Validation(m),
            Self::Model(ModelError::Conflict(m)) => Self::Conflict(m),
            Self::Model(ModelError::NotFound(m)) => Self::NotFound(m),
            Self::Model(ModelError::Db(m)) => Self::Db(m),
            other => other,
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}
