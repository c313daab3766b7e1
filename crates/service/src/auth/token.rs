use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::domain::{Claims, Principal, Role};
use super::errors::AuthError;

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self { secret: secret.into(), ttl: Duration::hours(ttl_hours.max(1)) }
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Self {
        Self::new(cfg.jwt_secret.clone(), cfg.token_ttl_hours)
    }

    /// Mint a token for `id` acting as `role`.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{TokenService, Role};
    /// let tokens = TokenService::new("secret", 1);
    /// let id = uuid::Uuid::new_v4();
    /// let jwt = tokens.issue(id, Role::Staff).unwrap();
    /// let who = tokens.verify(&jwt).unwrap();
    /// assert_eq!(who.id, id);
    /// assert_eq!(who.role, Role::Staff);
    /// ```
    pub fn issue(&self, id: Uuid, role: Role) -> Result<String, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::Validation("jwt secret not configured".into()));
        }
        let exp = (Utc::now() + self.ttl).timestamp() as usize;
        let claims = Claims { sub: id.to_string(), role, exp };
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    #[instrument(skip_all)]
    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => {
                    debug!(error = %e, "token rejected");
                    AuthError::Unauthorized
                }
            })?;
        let id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::Unauthorized)?;
        Ok(Principal::new(id, data.claims.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_secret_is_unauthorized() {
        let jwt = TokenService::new("a", 1).issue(Uuid::new_v4(), Role::Client).unwrap();
        let err = TokenService::new("b", 1).verify(&jwt).unwrap_err();
        assert_eq!(err.code(), 1004);
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = TokenService::new("secret", 1);
        let claims = Claims { sub: Uuid::new_v4().to_string(), role: Role::Client, exp: (Utc::now() - Duration::hours(2)).timestamp() as usize };
        let jwt = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();
        assert!(matches!(svc.verify(&jwt), Err(AuthError::Expired)));
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let claims = Claims { sub: "someone".into(), role: Role::Admin, exp: (Utc::now() + Duration::hours(1)).timestamp() as usize };
        let jwt = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();
        assert!(TokenService::new("secret", 1).verify(&jwt).is_err());
    }

    #[test]
    fn empty_secret_cannot_issue() {
        assert!(TokenService::new("", 1).issue(Uuid::new_v4(), Role::Staff).is_err());
    }
}
