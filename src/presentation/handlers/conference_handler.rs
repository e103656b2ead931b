use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        error::DomainError,
        models::{
            conference::{Conference, ConferenceDraft},
            query::QueryFilter,
        },
        repositories::{
            conference_repository::ConferenceRepository, profile_repository::ProfileRepository,
        },
        services::{identity_service::IdentityResolver, notification_service::ConfirmationNotifier},
    },
    presentation::{auth::authenticate, error::error_response},
    usecase::{conference_usecase::ConferenceUsecase, query_usecase::QueryUsecase},
};

// Request

/// json for queryConferences request
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConferenceQueryRequest {
    #[serde(default)]
    pub filters: Vec<QueryFilter>,
}

// Response

#[derive(Debug, Serialize, Deserialize)]
pub struct ConferenceResponse {
    pub websafe_key: String,
    pub organizer_user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub topics: Vec<String>,
    pub city: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub month: u32,
    pub max_attendees: u32,
    pub seats_available: u32,
}

impl From<Conference> for ConferenceResponse {
    fn from(conference: Conference) -> Self {
        Self {
            websafe_key: conference.id().websafe(),
            organizer_user_id: conference.organizer_user_id().to_string(),
            name: conference.name().to_string(),
            description: conference.description().map(str::to_string),
            topics: conference.topics().to_vec(),
            city: conference.city().map(str::to_string),
            start_date: conference.start_date(),
            end_date: conference.end_date(),
            month: conference.month(),
            max_attendees: conference.max_attendees(),
            seats_available: conference.seats_available(),
        }
    }
}

fn list_response(conferences: Vec<Conference>) -> Json<Vec<ConferenceResponse>> {
    Json(conferences.into_iter().map(ConferenceResponse::from).collect())
}

/* Router Function and Handler Function */

pub fn create_conference_router<
    C: ConferenceRepository + Send + Sync + 'static + Clone,
    P: ProfileRepository + Send + Sync + 'static + Clone,
    N: ConfirmationNotifier + 'static + Clone,
    I: IdentityResolver + 'static + Clone,
>(
    conference_service: ConferenceUsecase<C, P, N>,
    query_service: QueryUsecase<C, P>,
    identity_resolver: I,
) -> Router {
    let state = AppState {
        conference_service: Arc::new(conference_service),
        query_service: Arc::new(query_service),
        identity_resolver: Arc::new(identity_resolver),
    };

    Router::new()
        .route("/conference", post(create_conference::<C, P, N, I>))
        .route("/conference/{websafe_key}", get(get_conference::<C, P, N, I>))
        .route("/queryConferences", post(query_conferences::<C, P, N, I>))
        .route("/getConferencesCreated", get(conferences_created::<C, P, N, I>))
        .route("/getConferencesToAttend", get(conferences_to_attend::<C, P, N, I>))
        .with_state(state)
}

pub struct AppState<C: ConferenceRepository, P: ProfileRepository, N: ConfirmationNotifier, I: IdentityResolver> {
    pub conference_service: Arc<ConferenceUsecase<C, P, N>>,
    pub query_service: Arc<QueryUsecase<C, P>>,
    pub identity_resolver: Arc<I>,
}

impl<C: ConferenceRepository, P: ProfileRepository, N: ConfirmationNotifier, I: IdentityResolver> Clone
    for AppState<C, P, N, I>
{
    fn clone(&self) -> Self {
        Self {
            conference_service: Arc::clone(&self.conference_service),
            query_service: Arc::clone(&self.query_service),
            identity_resolver: Arc::clone(&self.identity_resolver),
        }
    }
}

// handler function

/// handler function for createConference
async fn create_conference<
    C: ConferenceRepository + Send + Sync,
    P: ProfileRepository + Send + Sync,
    N: ConfirmationNotifier,
    I: IdentityResolver,
>(
    State(state): State<AppState<C, P, N, I>>,
    headers: HeaderMap,
    Json(payload): Json<ConferenceDraft>,
) -> impl IntoResponse {
    let result = async {
        let identity = authenticate(state.identity_resolver.as_ref(), &headers)?;
        state.conference_service.create_conference(&identity, payload).await
    };
    match result.await {
        Ok(conference) => (StatusCode::CREATED, Json(ConferenceResponse::from(conference))).into_response(),
        Err(err) => error_response(err),
    }
}

/// handler function for getConference, open to anonymous callers
async fn get_conference<
    C: ConferenceRepository + Send + Sync,
    P: ProfileRepository + Send + Sync,
    N: ConfirmationNotifier,
    I: IdentityResolver,
>(
    State(state): State<AppState<C, P, N, I>>,
    Path(websafe_key): Path<String>,
) -> impl IntoResponse {
    match state.query_service.get_conference(&websafe_key).await {
        Ok(conference) => (StatusCode::OK, Json(ConferenceResponse::from(conference))).into_response(),
        Err(err) => error_response(err),
    }
}

/// handler function for queryConferences, open to anonymous callers
async fn query_conferences<
    C: ConferenceRepository + Send + Sync,
    P: ProfileRepository + Send + Sync,
    N: ConfirmationNotifier,
    I: IdentityResolver,
>(
    State(state): State<AppState<C, P, N, I>>,
    Json(payload): Json<ConferenceQueryRequest>,
) -> impl IntoResponse {
    match state.query_service.query_conferences(payload.filters).await {
        Ok(conferences) => (StatusCode::OK, list_response(conferences)).into_response(),
        Err(err) => error_response(err),
    }
}

/// handler function for getConferencesCreated
async fn conferences_created<
    C: ConferenceRepository + Send + Sync,
    P: ProfileRepository + Send + Sync,
    N: ConfirmationNotifier,
    I: IdentityResolver,
>(
    State(state): State<AppState<C, P, N, I>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let result = async {
        let identity = authenticate(state.identity_resolver.as_ref(), &headers)?;
        state.query_service.conferences_created_by(identity.user_id()).await
    };
    match result.await {
        Ok(conferences) => (StatusCode::OK, list_response(conferences)).into_response(),
        Err(err) => error_response(err),
    }
}

/// handler function for getConferencesToAttend
async fn conferences_to_attend<
    C: ConferenceRepository + Send + Sync,
    P: ProfileRepository + Send + Sync,
    N: ConfirmationNotifier,
    I: IdentityResolver,
>(
    State(state): State<AppState<C, P, N, I>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let result: Result<Vec<Conference>, DomainError> = async {
        let identity = authenticate(state.identity_resolver.as_ref(), &headers)?;
        state.query_service.conferences_attended_by(identity.user_id()).await
    }
    .await;
    match result {
        Ok(conferences) => (StatusCode::OK, list_response(conferences)).into_response(),
        Err(err) => error_response(err),
    }
}
