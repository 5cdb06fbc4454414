use async_trait::async_trait;
use rand::seq::IteratorRandom;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::idiom::Idiom;

/// 持久层接口。以成语为主键 upsert，upsert 必须幂等。
#[async_trait]
pub trait IdiomStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Idiom>, StoreError>;

    /// 不存在则插入，存在则覆盖所有字段（served 标记保留）
    async fn upsert(&self, idiom: &Idiom) -> Result<(), StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    async fn count_served(&self) -> Result<usize, StoreError>;

    async fn delete_all(&self) -> Result<usize, StoreError>;

    async fn mark_served(&self, key: &str) -> Result<(), StoreError>;

    async fn random_sample(&self, n: usize) -> Result<Vec<Idiom>, StoreError>;

    async fn keys(&self) -> Result<Vec<String>, StoreError>;
}

#[derive(Debug, Clone)]
struct StoredIdiom {
    idiom: Idiom,
    served: bool,
}

/// 内存版持久层，用于测试和本地无数据库运行。
/// 可以切换成“不可用”状态来模拟数据库故障。
#[derive(Debug)]
pub struct MemoryIdiomStore {
    rows: RwLock<HashMap<String, StoredIdiom>>,
    available: AtomicBool,
    upserts: AtomicUsize,
}

impl Default for MemoryIdiomStore {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            upserts: AtomicUsize::new(0),
        }
    }
}

impl MemoryIdiomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// 累计成功的 upsert 次数
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub async fn is_served(&self, key: &str) -> bool {
        self.rows.read().await.get(key).is_some_and(|r| r.served)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }
}

#[async_trait]
impl IdiomStore for MemoryIdiomStore {
    async fn get(&self, key: &str) -> Result<Option<Idiom>, StoreError> {
        self.check()?;
        Ok(self.rows.read().await.get(key).map(|r| r.idiom.clone()))
    }

    async fn upsert(&self, idiom: &Idiom) -> Result<(), StoreError> {
        self.check()?;
        let mut rows = self.rows.write().await;
        let served = rows.get(&idiom.key).is_some_and(|r| r.served);
        rows.insert(
            idiom.key.clone(),
            StoredIdiom {
                idiom: idiom.clone(),
                served,
            },
        );
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.check()?;
        Ok(self.rows.read().await.len())
    }

    async fn count_served(&self) -> Result<usize, StoreError> {
        self.check()?;
        Ok(self.rows.read().await.values().filter(|r| r.served).count())
    }

    async fn delete_all(&self) -> Result<usize, StoreError> {
        self.check()?;
        let mut rows = self.rows.write().await;
        let deleted = rows.len();
        rows.clear();
        Ok(deleted)
    }

    async fn mark_served(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        if let Some(row) = self.rows.write().await.get_mut(key) {
            row.served = true;
        }
        Ok(())
    }

    async fn random_sample(&self, n: usize) -> Result<Vec<Idiom>, StoreError> {
        self.check()?;
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .map(|r| r.idiom.clone())
            .choose_multiple(&mut rand::thread_rng(), n))
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.check()?;
        Ok(self.rows.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_keeps_served_flag() {
        let store = MemoryIdiomStore::new();
        store.upsert(&Idiom::new("塞翁失马")).await.unwrap();
        store.mark_served("塞翁失马").await.unwrap();

        let mut richer = Idiom::new("塞翁失马");
        richer.meaning = "比喻一时虽然受到损失，也许反而因此能得到好处。".into();
        store.upsert(&richer).await.unwrap();

        assert!(store.is_served("塞翁失马").await);
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.count_served().await.unwrap(), 1);
        assert_eq!(store.get("塞翁失马").await.unwrap(), Some(richer));
    }

    #[tokio::test]
    async fn random_sample_is_bounded() {
        let store = MemoryIdiomStore::new();
        for key in ["甲", "乙", "丙"] {
            store.upsert(&Idiom::new(key)).await.unwrap();
        }
        assert_eq!(store.random_sample(2).await.unwrap().len(), 2);
        assert_eq!(store.random_sample(10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unavailable_store_errors() {
        let store = MemoryIdiomStore::new();
        store.set_available(false);
        assert!(matches!(store.count().await, Err(StoreError::Unavailable)));
        assert!(store.upsert(&Idiom::new("甲")).await.is_err());
        assert_eq!(store.upsert_count(), 0);
    }

    #[tokio::test]
    async fn delete_all_resets_counts() {
        let store = MemoryIdiomStore::new();
        store.upsert(&Idiom::new("甲")).await.unwrap();
        store.mark_served("甲").await.unwrap();
        assert_eq!(store.delete_all().await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.count_served().await.unwrap(), 0);
    }
}
