use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    error::DomainError,
    models::{identity::Identity, profile::UserId},
    services::identity_service::IdentityResolver,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // Subject (stable user ID)
    pub email: String, // Main email
    pub exp: i64,      // Expiration time
    pub iat: i64,      // Issued at
}

/// Accepts HS256 tokens minted by the identity provider
#[derive(Clone)]
pub struct JwtIdentityResolver {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl IdentityResolver for JwtIdentityResolver {
    fn resolve(&self, bearer_token: &str) -> Result<Identity, DomainError> {
        let claims = decode::<Claims>(bearer_token, &self.key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "rejected bearer token");
                DomainError::Unauthenticated
            })?
            .claims;

        let user_id = UserId::new(claims.sub).map_err(|_| DomainError::Unauthenticated)?;
        Ok(Identity::new(user_id, claims.email))
    }
}
