use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

/// Cache for AI responses, injected so deployments can bound its size.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn put(&self, key: String, value: String);
}

/// Lives as long as the process and never evicts.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    async fn put(&self, key: String, value: String) {
        self.entries.write().await.insert(key, value);
    }
}

/// `namespace:` followed by the hex SHA-256 of `input`.
pub fn cache_key(namespace: &str, input: &str) -> String {
    format!("{namespace}:{}", hex::encode(Sha256::digest(input.as_bytes())))
}
