use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        error::DomainError,
        models::profile::{Profile, TeeShirtSize},
        repositories::profile_repository::ProfileRepository,
        services::identity_service::IdentityResolver,
    },
    presentation::{auth::authenticate, error::error_response},
    usecase::profile_usecase::{ProfileForm, ProfileUsecase},
};

// Response

/// json for a stored profile
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub display_name: String,
    pub main_email: String,
    pub tee_shirt_size: TeeShirtSize,
    pub conference_keys_to_attend: Vec<String>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.user_id().to_string(),
            display_name: profile.display_name().to_string(),
            main_email: profile.main_email().to_string(),
            tee_shirt_size: profile.tee_shirt_size(),
            conference_keys_to_attend: profile
                .conference_keys_to_attend()
                .iter()
                .map(|id| id.websafe())
                .collect(),
        }
    }
}

/* Router Function and Handler Function */

/// Suppose to be nested by main router
pub fn create_profile_router<
    P: ProfileRepository + Send + Sync + 'static + Clone,
    I: IdentityResolver + 'static + Clone,
>(
    profile_service: ProfileUsecase<P>,
    identity_resolver: I,
) -> Router {
    let state = AppState {
        profile_service: Arc::new(profile_service),
        identity_resolver: Arc::new(identity_resolver),
    };

    Router::new()
        .route("/profile", post(save_profile::<P, I>).get(get_profile::<P, I>))
        .with_state(state)
}

pub struct AppState<P: ProfileRepository, I: IdentityResolver> {
    pub profile_service: Arc<ProfileUsecase<P>>,
    pub identity_resolver: Arc<I>,
}

impl<P: ProfileRepository, I: IdentityResolver> Clone for AppState<P, I> {
    fn clone(&self) -> Self {
        Self {
            profile_service: Arc::clone(&self.profile_service),
            identity_resolver: Arc::clone(&self.identity_resolver),
        }
    }
}

/// handler function for saveProfile
async fn save_profile<P: ProfileRepository + Send + Sync, I: IdentityResolver>(
    State(state): State<AppState<P, I>>,
    headers: HeaderMap,
    Json(payload): Json<ProfileForm>,
) -> impl IntoResponse {
    let result = async {
        let identity = authenticate(state.identity_resolver.as_ref(), &headers)?;
        state.profile_service.save_profile(&identity, payload).await
    };
    match result.await {
        Ok(profile) => (StatusCode::OK, Json(ProfileResponse::from(profile))).into_response(),
        Err(err) => error_response(err),
    }
}

/// handler function for getProfile
async fn get_profile<P: ProfileRepository + Send + Sync, I: IdentityResolver>(
    State(state): State<AppState<P, I>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let result = async {
        let identity = authenticate(state.identity_resolver.as_ref(), &headers)?;
        state
            .profile_service
            .get_profile(&identity)
            .await?
            .ok_or(DomainError::NotFound("profile"))
    };
    match result.await {
        Ok(profile) => (StatusCode::OK, Json(ProfileResponse::from(profile))).into_response(),
        Err(err) => error_response(err),
    }
}
