use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        repositories::conference_repository::ConferenceRepository,
        services::announcement_service::AnnouncementCache,
    },
    usecase::announcement_usecase::AnnouncementUsecase,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Announcement {
    pub message: String,
}

pub fn create_announcement_router<
    C: ConferenceRepository + Send + Sync + 'static,
    K: AnnouncementCache + 'static,
>(
    announcement_service: Arc<AnnouncementUsecase<C, K>>,
) -> Router {
    Router::new()
        .route("/announcement", get(get_announcement::<C, K>))
        .with_state(announcement_service)
}

/// handler function for getAnnouncement; 204 when nothing is announced
async fn get_announcement<C: ConferenceRepository + Send + Sync, K: AnnouncementCache>(
    State(service): State<Arc<AnnouncementUsecase<C, K>>>,
) -> impl IntoResponse {
    match service.current().await {
        Some(message) => (StatusCode::OK, Json(Announcement { message })).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
