use axum::http::{HeaderMap, header};

use crate::domain::{
    error::DomainError, models::identity::Identity, services::identity_service::IdentityResolver,
};

/// Resolve the caller from an `Authorization: Bearer <token>` header
pub fn authenticate<I: IdentityResolver>(resolver: &I, headers: &HeaderMap) -> Result<Identity, DomainError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(DomainError::Unauthenticated)?;

    resolver.resolve(token)
}
