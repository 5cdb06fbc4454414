//! 全目录后台爬取。
//!
//! 单次调用有时间上限，所以爬取被切成一轮一轮：每轮在时间预算内按批处理未缓存的
//! 成语，做不完就通过 HTTP 再触发一次自己（round + 1）。每轮都重新计算待爬列表，
//! 因此某次触发丢失也没关系，下一次用户请求会重新发现剩余的成语并再次触发。

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use futures::future::join_all;
use reqwest::Url;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::models::report::{CacheStats, ChainReport, IndexReport};
use crate::services::cache::LayeredCache;
use crate::services::resolver::Resolver;

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// 每批并发条数
    pub batch_size: usize,
    /// 单轮时间预算，只在批与批之间检查
    pub time_budget: Duration,
    /// 链式触发的轮数上限
    pub max_rounds: u32,
    /// 触发下一轮的 HTTP 超时，要盖住时间预算加最后一批的最长耗时
    pub chain_timeout: Duration,
    /// 全部缓存后，未展示条数不超过此值就清空重爬。
    /// 实际阈值不超过目录的十分之一，见 `recrawl_threshold`
    pub recrawl_low_water: usize,
    /// 未来多少天要展示的成语优先爬
    pub upcoming_days: u32,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            batch_size: 5,
            time_budget: Duration::from_secs(50),
            max_rounds: 600,
            chain_timeout: Duration::from_secs(65),
            recrawl_low_water: 300,
            upcoming_days: 30,
        }
    }
}

/// 触发下一轮爬取
#[async_trait]
pub trait ChainTrigger: Send + Sync {
    async fn trigger(&self, round: u32) -> anyhow::Result<()>;
}

/// 通过 HTTP 调用自己的爬取接口
pub struct HttpChainTrigger {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpChainTrigger {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&format!("{}/api/cron/crawl", base_url.trim_end_matches('/')))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ChainTrigger for HttpChainTrigger {
    async fn trigger(&self, round: u32) -> anyhow::Result<()> {
        self.client
            .get(self.endpoint.clone())
            .query(&[("round", round)])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// 一轮爬取的任务状态：轮次 + 按优先级排好的待爬列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    pub round: u32,
    pub queue: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceOutcome {
    pub success: usize,
    pub errors: usize,
    /// 时间预算用完时还有没处理的成语
    pub timed_out: bool,
}

/// 正在运行的轮次计数，离开作用域自动减一
struct RunningGuard<'a>(&'a AtomicUsize);

impl<'a> RunningGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct CrawlScheduler {
    cache: Arc<LayeredCache>,
    resolver: Arc<Resolver>,
    trigger: Arc<dyn ChainTrigger>,
    settings: CrawlSettings,
    running: AtomicUsize,
}

impl CrawlScheduler {
    pub fn new(
        resolver: Arc<Resolver>,
        trigger: Arc<dyn ChainTrigger>,
        settings: CrawlSettings,
    ) -> Self {
        Self {
            cache: Arc::clone(resolver.cache()),
            resolver,
            trigger,
            settings,
            running: AtomicUsize::new(0),
        }
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) > 0
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            crawl_in_progress: self.is_running(),
            ..self.cache.stats().await
        }
    }

    /// 未来几天要展示的排在前面，两组内部保持目录顺序
    pub fn prioritize(&self, uncached: Vec<String>, today: NaiveDate) -> Vec<String> {
        let upcoming = self
            .cache
            .catalog()
            .upcoming_keys(today, self.settings.upcoming_days);
        let (mut soon, later): (Vec<String>, Vec<String>) =
            uncached.into_iter().partition(|k| upcoming.contains(k));
        soon.extend(later);
        soon
    }

    pub async fn plan(&self, round: u32, today: NaiveDate) -> CrawlJob {
        let uncached = self.cache.uncached_keys().await;
        CrawlJob {
            round,
            queue: self.prioritize(uncached, today),
        }
    }

    /// 分批处理，批内并发、批间串行；每批开始前检查时间预算，
    /// 已经开始的批次会跑完
    pub async fn run_slice(&self, job: &CrawlJob) -> SliceOutcome {
        let started = Instant::now();
        let mut outcome = SliceOutcome::default();

        for batch in job.queue.chunks(self.settings.batch_size.max(1)) {
            if started.elapsed() >= self.settings.time_budget {
                outcome.timed_out = true;
                break;
            }

            let results = join_all(batch.iter().map(|key| self.resolver.resolve(key))).await;
            for idiom in results {
                if idiom.is_usable() {
                    outcome.success += 1;
                } else {
                    outcome.errors += 1;
                }
            }
        }

        outcome
    }

    pub async fn auto_chain(&self, round: u32) -> ChainReport {
        self.auto_chain_on(round, Local::now().date_naive()).await
    }

    pub async fn auto_chain_on(&self, round: u32, today: NaiveDate) -> ChainReport {
        let started = Instant::now();
        let (queued, outcome) = {
            let _running = RunningGuard::enter(&self.running);
            let job = self.plan(round, today).await;
            tracing::info!(">>> 第 {} 轮爬取开始, 待爬 {} 条", round, job.queue.len());
            (job.queue.len(), self.run_slice(&job).await)
        };

        // 持久层是后台写入，这里按本轮结果推算剩余条数
        let remaining = queued.saturating_sub(outcome.success);
        tracing::info!(
            "<<< 第 {} 轮爬取结束: 成功 {}, 失败 {}, 剩余 {}, 超时 {}",
            round,
            outcome.success,
            outcome.errors,
            remaining,
            outcome.timed_out
        );

        ChainReport {
            mode: "auto-chain".to_string(),
            round,
            success: outcome.success,
            errors: outcome.errors,
            remaining,
            timed_out: outcome.timed_out,
            time_used: format!("{:.1}s", started.elapsed().as_secs_f64()),
            cache: self.stats().await,
        }
    }

    pub fn needs_follow_up(&self, report: &ChainReport) -> bool {
        report.remaining > 0 && report.round < self.settings.max_rounds
    }

    /// 在独立任务里跑一轮并决定是否触发下一轮。
    ///
    /// 调用方（上一轮的 HTTP 触发）超时断开时，handler 的 future 会被丢弃，
    /// 但这里 spawn 出去的任务会照常跑完并触发下一轮。
    pub fn spawn_round(self: &Arc<Self>, round: u32) -> JoinHandle<ChainReport> {
        let crawler = Arc::clone(self);
        tokio::spawn(async move {
            let report = crawler.auto_chain(round).await;
            if crawler.needs_follow_up(&report) {
                crawler.spawn_follow_up(round + 1);
            }
            report
        })
    }

    /// 后台触发下一轮。失败只记日志，不重试。
    pub fn spawn_follow_up(&self, round: u32) {
        let trigger = Arc::clone(&self.trigger);
        tokio::spawn(async move {
            if let Err(e) = trigger.trigger(round).await {
                tracing::warn!("--- 第 {} 轮链式触发失败: {}", round, e);
            }
        });
    }

    /// 按目录偏移量爬一段（供外部批量脚本使用），仍然先查缓存
    pub async fn crawl_index(&self, offset: usize, batch: usize) -> IndexReport {
        let catalog = Arc::clone(self.cache.catalog());
        let keys = catalog.slice(offset, batch);

        let results = join_all(keys.iter().map(|key| self.resolver.resolve(key))).await;
        let mut data = BTreeMap::new();
        let mut errors = 0;
        for idiom in results {
            if idiom.is_usable() {
                data.insert(idiom.key.clone(), idiom);
            } else {
                errors += 1;
            }
        }

        IndexReport {
            mode: "index".to_string(),
            offset,
            batch: keys.len(),
            total: catalog.len(),
            success: data.len(),
            errors,
            cache: self.stats().await,
            data,
        }
    }

    /// 重爬阈值：配置的低水位，但不超过目录条数的十分之一。
    /// 目录比低水位还小时，否则刚爬完就会立刻清空。
    pub fn recrawl_threshold(&self) -> usize {
        self.settings
            .recrawl_low_water
            .min(self.cache.catalog().len() / 10)
    }

    /// 全部缓存完毕，且未展示的不超过重爬阈值
    pub async fn should_recrawl(&self) -> bool {
        let stats = self.cache.stats().await;
        if !stats.persistent || stats.uncached > 0 {
            return false;
        }
        stats.unserved <= self.recrawl_threshold()
    }

    /// 成语展示给用户之后的后台工作：确保种子数据并标记已展示，
    /// 必要时清空重爬，还有未缓存的就触发第 0 轮
    pub async fn after_serve(&self, key: &str) {
        self.cache.ensure_seeded().await;
        self.cache.mark_served(key).await;

        if self.should_recrawl().await {
            tracing::info!(">>> 未展示的成语已不足 {} 条，开始新一轮爬取", self.recrawl_threshold());
            self.cache.reset().await;
            self.cache.ensure_seeded().await;
        }

        if self.is_running() {
            tracing::debug!("--- 本进程已有爬取在进行，跳过触发");
            return;
        }

        let uncached = self.cache.uncached_keys().await.len();
        if uncached > 0 {
            tracing::debug!(">>> 还有 {} 条未缓存，触发链式爬取", uncached);
            if let Err(e) = self.trigger.trigger(0).await {
                tracing::warn!("--- 链式爬取触发失败: {}", e);
            }
        }
    }
}
