use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::services::announcement_service::AnnouncementCache;

#[derive(Clone, Default)]
pub struct InMemoryAnnouncementCache {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryAnnouncementCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnnouncementCache for InMemoryAnnouncementCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    async fn put(&self, key: &str, value: String) {
        self.entries.write().await.insert(key.to_string(), value);
    }

    async fn delete(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}
