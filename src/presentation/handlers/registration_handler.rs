use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        error::{DomainError, ErrorKind},
        repositories::registration_repository::RegistrationRepository,
        services::{identity_service::IdentityResolver, notification_service::ConfirmationNotifier},
    },
    presentation::{auth::authenticate, error::status_for},
    usecase::registration_usecase::{RegistrationResult, RegistrationUsecase},
};

// Response

/// json for register and unregister responses; `kind` is set whenever `result` is false
#[derive(Debug, Serialize, Deserialize)]
pub struct WrappedBoolean {
    pub result: bool,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl WrappedBoolean {
    fn into_response_with_status(self) -> Response {
        let status = self.kind.map_or(StatusCode::OK, status_for);
        (status, Json(self)).into_response()
    }
}

impl From<RegistrationResult> for WrappedBoolean {
    fn from(result: RegistrationResult) -> Self {
        let kind = match result {
            RegistrationResult::Rejected(reason) => Some(reason.kind()),
            RegistrationResult::Registered | RegistrationResult::Unregistered => None,
        };
        Self {
            result: result.success(),
            reason: result.reason().to_string(),
            kind,
        }
    }
}

impl From<DomainError> for WrappedBoolean {
    fn from(err: DomainError) -> Self {
        let kind = err.kind();
        let reason = match kind {
            ErrorKind::Unknown => "Unknown exception".to_string(),
            _ => err.to_string(),
        };
        Self {
            result: false,
            reason,
            kind: Some(kind),
        }
    }
}

/* Router Function and Handler Function */

pub fn create_registration_router<
    R: RegistrationRepository + Send + Sync + 'static + Clone,
    N: ConfirmationNotifier + 'static + Clone,
    I: IdentityResolver + 'static + Clone,
>(
    registration_service: RegistrationUsecase<R, N>,
    identity_resolver: I,
) -> Router {
    let state = AppState {
        registration_service: Arc::new(registration_service),
        identity_resolver: Arc::new(identity_resolver),
    };

    Router::new()
        .route(
            "/conference/{websafe_key}/registration",
            post(register::<R, N, I>).delete(unregister::<R, N, I>),
        )
        .with_state(state)
}

pub struct AppState<R: RegistrationRepository, N: ConfirmationNotifier, I: IdentityResolver> {
    pub registration_service: Arc<RegistrationUsecase<R, N>>,
    pub identity_resolver: Arc<I>,
}

impl<R: RegistrationRepository, N: ConfirmationNotifier, I: IdentityResolver> Clone for AppState<R, N, I> {
    fn clone(&self) -> Self {
        Self {
            registration_service: Arc::clone(&self.registration_service),
            identity_resolver: Arc::clone(&self.identity_resolver),
        }
    }
}

// handler function

/// handler function for registerForConference
async fn register<R: RegistrationRepository + Send + Sync, N: ConfirmationNotifier, I: IdentityResolver>(
    State(state): State<AppState<R, N, I>>,
    headers: HeaderMap,
    Path(websafe_key): Path<String>,
) -> impl IntoResponse {
    let result = async {
        let identity = authenticate(state.identity_resolver.as_ref(), &headers)?;
        state.registration_service.register(&identity, &websafe_key).await
    };
    let body = match result.await {
        Ok(outcome) => WrappedBoolean::from(outcome),
        Err(err) => WrappedBoolean::from(err),
    };
    body.into_response_with_status()
}

/// handler function for unregisterFromConference
async fn unregister<R: RegistrationRepository + Send + Sync, N: ConfirmationNotifier, I: IdentityResolver>(
    State(state): State<AppState<R, N, I>>,
    headers: HeaderMap,
    Path(websafe_key): Path<String>,
) -> impl IntoResponse {
    let result = async {
        let identity = authenticate(state.identity_resolver.as_ref(), &headers)?;
        state.registration_service.unregister(&identity, &websafe_key).await
    };
    let body = match result.await {
        Ok(outcome) => WrappedBoolean::from(outcome),
        Err(err) => WrappedBoolean::from(err),
    };
    body.into_response_with_status()
}
