use thiserror::Error;

/// Token and identity failures
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("missing or malformed credentials")]
    Unauthorized,
    #[error("token expired")]
    Expired,
    #[error("token error: {0}")]
    TokenError(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Unauthorized => 1004,
            AuthError::Expired => 1005,
            AuthError::TokenError(_) => 1102,
        }
    }
}
