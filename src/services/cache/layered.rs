use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::task::TaskTracker;

use super::memory::MemoryCache;
use super::store::IdiomStore;
use crate::models::idiom::Idiom;
use crate::models::report::CacheStats;
use crate::services::catalog::Catalog;
use crate::services::seed::SeedBundle;

/// 种子数据写入持久层时每批并发条数
pub const DEFAULT_SEED_BATCH: usize = 20;

/// 三级缓存。
///
/// 读顺序：内存 → 持久层 → 种子数据。写入时先同步写内存，再在后台写持久层，
/// 后台写失败只记日志。持久层的任何错误都降级成“没有数据”。
///
/// `gate` 保证整体重置是一个时间点事件：单条写入持有读锁，重置持有写锁，
/// 重置不会和进行中的写入交错。
pub struct LayeredCache {
    memory: MemoryCache,
    store: Arc<dyn IdiomStore>,
    seeds: Arc<SeedBundle>,
    catalog: Arc<Catalog>,
    seed_batch: usize,
    gate: Arc<RwLock<()>>,
    writes: TaskTracker,
}

impl LayeredCache {
    pub fn new(store: Arc<dyn IdiomStore>, seeds: Arc<SeedBundle>, catalog: Arc<Catalog>) -> Self {
        Self {
            memory: MemoryCache::new(),
            store,
            seeds,
            catalog,
            seed_batch: DEFAULT_SEED_BATCH,
            gate: Arc::new(RwLock::new(())),
            writes: TaskTracker::new(),
        }
    }

    pub fn with_seed_batch(mut self, seed_batch: usize) -> Self {
        self.seed_batch = seed_batch.max(1);
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn seeds(&self) -> &Arc<SeedBundle> {
        &self.seeds
    }

    pub async fn memory_get(&self, key: &str) -> Option<Idiom> {
        self.memory.get(key).await
    }

    pub async fn store_get(&self, key: &str) -> Option<Idiom> {
        match self.store.get(key).await {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!("--- 持久层读取失败, key={}: {}", key, e);
                None
            }
        }
    }

    pub fn seed_get(&self, key: &str) -> Option<Idiom> {
        self.seeds.get(key).cloned()
    }

    /// 只写内存（数据本来就来自持久层时用）
    pub async fn remember_local(&self, idiom: Idiom) {
        let _guard = self.gate.read().await;
        self.memory.put(idiom).await;
    }

    /// 写内存，并在后台写持久层
    pub async fn remember(&self, idiom: Idiom) {
        let guard = Arc::clone(&self.gate).read_owned().await;
        self.memory.put(idiom.clone()).await;

        let store = Arc::clone(&self.store);
        self.writes.spawn(async move {
            let _guard = guard;
            if let Err(e) = store.upsert(&idiom).await {
                tracing::warn!("--- 后台写入持久层失败, key={}: {}", idiom.key, e);
            }
        });
    }

    /// 持久层为空时把种子数据分批写进去；已有数据则跳过。
    /// 多个请求同时触发最多产生几次重复 upsert。返回持久层当前（或新写入的）条数。
    pub async fn ensure_seeded(&self) -> usize {
        let count = match self.store.count().await {
            Ok(count) => count,
            Err(e) => {
                tracing::debug!("--- 持久层不可用，跳过种子写入: {}", e);
                return 0;
            }
        };
        if count > 0 {
            return count;
        }

        tracing::info!(">>> 持久层为空，开始写入 {} 条种子数据", self.seeds.len());
        let entries: Vec<&Idiom> = self.seeds.iter().collect();
        let mut inserted = 0;
        for batch in entries.chunks(self.seed_batch) {
            let results = join_all(batch.iter().map(|idiom| self.store.upsert(idiom))).await;
            inserted += results.iter().filter(|r| r.is_ok()).count();
        }

        tracing::info!("<<< 种子数据写入完成: {} 条", inserted);
        inserted
    }

    pub async fn mark_served(&self, key: &str) {
        if let Err(e) = self.store.mark_served(key).await {
            tracing::debug!("--- 标记已展示失败, key={}: {}", key, e);
        }
    }

    /// 持久层随机取一条
    pub async fn random_stored(&self) -> Option<Idiom> {
        match self.store.random_sample(1).await {
            Ok(mut rows) => rows.pop(),
            Err(e) => {
                tracing::debug!("--- 持久层随机读取失败: {}", e);
                None
            }
        }
    }

    /// 已缓存的成语；持久层不可用时按内存层计算
    async fn cached_keys(&self) -> (HashSet<String>, bool) {
        match self.store.keys().await {
            Ok(keys) => (keys.into_iter().collect(), true),
            Err(_) => (self.memory.keys().await.into_iter().collect(), false),
        }
    }

    /// 目录中尚未缓存的成语，保持目录顺序
    pub async fn uncached_keys(&self) -> Vec<String> {
        let (cached, _) = self.cached_keys().await;
        self.catalog
            .keys()
            .iter()
            .filter(|k| !cached.contains(*k))
            .cloned()
            .collect()
    }

    pub async fn stats(&self) -> CacheStats {
        let (cached, persistent) = self.cached_keys().await;
        let served = if persistent {
            self.store.count_served().await.unwrap_or(0)
        } else {
            0
        };
        let uncached = self
            .catalog
            .keys()
            .iter()
            .filter(|k| !cached.contains(*k))
            .count();

        CacheStats {
            total_idioms: self.catalog.len(),
            cached: cached.len(),
            uncached,
            served,
            unserved: cached.len().saturating_sub(served),
            memory_cached: self.memory.len().await,
            crawl_in_progress: false,
            persistent,
        }
    }

    /// 清空持久层和内存层。等进行中的写入全部结束后才执行。
    pub async fn reset(&self) {
        let _guard = self.gate.write().await;
        match self.store.delete_all().await {
            Ok(deleted) => tracing::info!("<<< 已清空持久层 {} 条记录，准备新一轮爬取", deleted),
            Err(e) => tracing::warn!("--- 清空持久层失败: {}", e),
        }
        self.memory.clear().await;
    }

    /// 等待后台写入完成，最多等 `timeout`
    pub async fn flush(&self, timeout: Duration) -> bool {
        self.writes.close();
        let done = tokio::time::timeout(timeout, self.writes.wait()).await.is_ok();
        self.writes.reopen();
        done
    }
}
