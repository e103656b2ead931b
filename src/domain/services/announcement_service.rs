use async_trait::async_trait;

pub const ANNOUNCEMENT_KEY: &str = "RECENT_ANNOUNCEMENTS";

/// Key to string cache the announcement is published through
#[async_trait]
pub trait AnnouncementCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn put(&self, key: &str, value: String);
    async fn delete(&self, key: &str);
}
