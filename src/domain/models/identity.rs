use serde::{Deserialize, Serialize};

use crate::domain::models::profile::UserId;

/// Caller resolved by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    user_id: UserId,
    email: String,
}

impl Identity {
    pub fn new(user_id: UserId, email: String) -> Self {
        Self { user_id, email }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
    pub fn email(&self) -> &str {
        &self.email
    }
}
