use tracing::debug;

use crate::domain::{
    error::DomainError,
    repositories::conference_repository::ConferenceRepository,
    services::announcement_service::{ANNOUNCEMENT_KEY, AnnouncementCache},
};

/// Conferences with fewer free seats than this are announced
pub const NEARLY_SOLD_OUT_THRESHOLD: u32 = 5;

pub struct AnnouncementUsecase<C: ConferenceRepository, K: AnnouncementCache> {
    conference_repository: C,
    cache: K,
}

impl<C: ConferenceRepository, K: AnnouncementCache> AnnouncementUsecase<C, K> {
    pub fn new(conference_repository: C, cache: K) -> Self {
        Self {
            conference_repository,
            cache,
        }
    }

    /// Recompute the announcement and publish it, or clear it when nothing qualifies
    pub async fn refresh(&self) -> Result<Option<String>, DomainError>
    where
        C: Send + Sync,
    {
        let conferences = self
            .conference_repository
            .find_nearly_sold_out(NEARLY_SOLD_OUT_THRESHOLD)
            .await?;

        if conferences.is_empty() {
            self.cache.delete(ANNOUNCEMENT_KEY).await;
            debug!("no conference nearly sold out, announcement cleared");
            return Ok(None);
        }

        let names: Vec<&str> = conferences.iter().map(|conference| conference.name()).collect();
        let message = format!(
            "Last chance to attend! The following conferences are nearly sold out: {}",
            names.join(", ")
        );
        self.cache.put(ANNOUNCEMENT_KEY, message.clone()).await;
        debug!(conferences = names.len(), "announcement published");
        Ok(Some(message))
    }

    pub async fn current(&self) -> Option<String> {
        self.cache.get(ANNOUNCEMENT_KEY).await
    }
}
