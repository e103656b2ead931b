use crate::domain::{error::DomainError, models::identity::Identity};

/// Turns the credential presented with a request into a caller identity
pub trait IdentityResolver: Send + Sync {
    /// Fails with `DomainError::Unauthenticated` when the credential is not acceptable
    fn resolve(&self, bearer_token: &str) -> Result<Identity, DomainError>;
}
