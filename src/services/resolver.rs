use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::models::idiom::Idiom;
use crate::services::cache::LayeredCache;
use crate::services::merge::merge;
use crate::services::sources::IdiomSource;

/// 单个来源的兜底超时，略长于 HTTP 客户端自己的超时
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// 兜底超时比 HTTP 客户端超时多出的余量
pub const SOURCE_TIMEOUT_MARGIN: Duration = Duration::from_secs(2);

/// 成语解析：逐级查缓存，都没有完整记录时并发抓取全部来源并合并。
/// 永远返回一条记录，最坏情况是占位记录。
pub struct Resolver {
    cache: Arc<LayeredCache>,
    sources: Vec<Arc<dyn IdiomSource>>,
    source_timeout: Duration,
}

impl Resolver {
    pub fn new(cache: Arc<LayeredCache>, sources: Vec<Arc<dyn IdiomSource>>) -> Self {
        Self {
            cache,
            sources,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn cache(&self) -> &Arc<LayeredCache> {
        &self.cache
    }

    pub async fn resolve(&self, key: &str) -> Idiom {
        // 1. 内存
        let local = self.cache.memory_get(key).await;
        if let Some(hit) = &local {
            if hit.is_complete() {
                return hit.clone();
            }
        }

        // 2. 持久层
        let stored = self.cache.store_get(key).await;
        if let Some(hit) = &stored {
            if hit.is_complete() {
                self.cache.remember_local(hit.clone()).await;
                return hit.clone();
            }
        }

        // 3. 种子数据
        let seed = self.cache.seed_get(key);
        if let Some(hit) = &seed {
            if hit.is_complete() {
                self.cache.remember(hit.clone()).await;
                return hit.clone();
            }
        }

        // 4. 全部来源并发抓取，种子在前，已缓存的不完整记录其次，然后按来源顺序
        let previous = stored.or(local);
        let scraped = self.extract_all(key).await;
        let candidates = std::iter::once(seed.clone())
            .chain(std::iter::once(previous))
            .chain(scraped);

        match merge(candidates) {
            Some(merged) => {
                tracing::debug!(
                    "<<< 合并完成, key={}, complete={}",
                    key,
                    merged.is_complete()
                );
                self.cache.remember(merged.clone()).await;
                merged
            }
            None => seed.unwrap_or_else(|| {
                tracing::warn!("--- 所有来源都没有数据, key={}", key);
                Idiom::placeholder(key)
            }),
        }
    }

    /// 并发调用全部来源。结果顺序和来源声明顺序一致，与完成先后无关。
    /// 失败或超时的来源记为 `None`。
    pub async fn extract_all(&self, key: &str) -> Vec<Option<Idiom>> {
        let calls = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            async move {
                let name = source.name();
                match tokio::time::timeout(self.source_timeout, source.extract(key)).await {
                    Ok(Ok(idiom)) if idiom.has_content() => {
                        tracing::debug!(source = name, key = %key, "抓取成功");
                        Some(Idiom {
                            key: key.to_string(),
                            ..idiom
                        })
                    }
                    Ok(Ok(_)) => None,
                    Ok(Err(e)) => {
                        tracing::debug!(source = name, key = %key, error = %e, "抓取失败");
                        None
                    }
                    Err(_) => {
                        tracing::debug!(source = name, key = %key, "抓取超时");
                        None
                    }
                }
            }
        });

        join_all(calls).await
    }
}
