use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::idiom::Idiom;

/// 进程内缓存，重启即丢失，只用来加速
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Idiom>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Idiom> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn put(&self, idiom: Idiom) {
        self.entries.write().await.insert(idiom.key.clone(), idiom);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }
}
