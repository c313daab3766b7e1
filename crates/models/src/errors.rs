use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    /// Map a driver error, surfacing constraint violations as conflicts.
    pub fn from_db(e: DbErr, what: &str) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict(format!("{what} already exists")),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => Self::Conflict(format!("{what} is still referenced")),
            _ => Self::Db(e.to_string()),
        }
    }
}
