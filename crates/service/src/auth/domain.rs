use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Staff,
    Admin,
}

impl Role {
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Staff | Role::Admin)
    }

    pub fn ensure_staff(&self, action: &str) -> Result<(), ServiceError> {
        if self.is_staff() { Ok(()) } else { Err(ServiceError::forbidden(action)) }
    }
}

/// Authenticated caller. For `Role::Client` the id is the client's own id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(id: Uuid, role: Role) -> Self { Self { id, role } }

    pub fn is_staff(&self) -> bool { self.role.is_staff() }

    /// Staff may act on any client; a client only on themselves.
    pub fn ensure_can_act_for(&self, client_id: Uuid) -> Result<(), ServiceError> {
        if self.is_staff() || self.id == client_id {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("clients may only act on their own records".into()))
        }
    }
}

/// JWT claims carried by bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}
