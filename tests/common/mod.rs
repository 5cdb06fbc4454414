#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chengyu_daily::error::ExtractError;
use chengyu_daily::models::idiom::Idiom;
use chengyu_daily::services::cache::{LayeredCache, MemoryIdiomStore};
use chengyu_daily::services::catalog::Catalog;
use chengyu_daily::services::crawler::{ChainTrigger, CrawlScheduler, CrawlSettings};
use chengyu_daily::services::resolver::Resolver;
use chengyu_daily::services::seed::SeedBundle;
use chengyu_daily::services::sources::IdiomSource;
use chengyu_daily::AppState;

/// 测试替身：记录调用次数，按预设返回数据或失败
pub struct StubSource {
    name: &'static str,
    response: Option<Idiom>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubSource {
    /// 永远失败
    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            response: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    /// 返回给定字段（key 换成请求的成语）
    pub fn returning(name: &'static str, idiom: Idiom) -> Arc<Self> {
        Arc::new(Self {
            name,
            response: Some(idiom),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    /// 等 `delay` 之后再返回
    pub fn slow(name: &'static str, idiom: Idiom, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            response: Some(idiom),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdiomSource for StubSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn extract(&self, key: &str) -> Result<Idiom, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.response {
            Some(idiom) => Ok(Idiom {
                key: key.to_string(),
                ..idiom.clone()
            }),
            None => Err(ExtractError::NoMatch),
        }
    }
}

/// 记录被触发的轮次，不发任何请求
#[derive(Default)]
pub struct RecordingTrigger {
    rounds: Mutex<Vec<u32>>,
}

impl RecordingTrigger {
    pub fn rounds(&self) -> Vec<u32> {
        self.rounds.lock().unwrap().clone()
    }

    /// 等到至少触发过一次，最多等 `timeout`
    pub async fn wait_for_round(&self, timeout: Duration) -> Vec<u32> {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.rounds().is_empty() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.rounds()
    }
}

#[async_trait]
impl ChainTrigger for RecordingTrigger {
    async fn trigger(&self, round: u32) -> anyhow::Result<()> {
        self.rounds.lock().unwrap().push(round);
        Ok(())
    }
}

pub struct Harness {
    pub store: Arc<MemoryIdiomStore>,
    pub cache: Arc<LayeredCache>,
    pub resolver: Arc<Resolver>,
    pub crawler: Arc<CrawlScheduler>,
    pub trigger: Arc<RecordingTrigger>,
    pub sources: Vec<Arc<StubSource>>,
}

impl Harness {
    pub fn new(catalog: &[&str], seeds: Vec<Idiom>, sources: Vec<Arc<StubSource>>) -> Self {
        Self::with_settings(catalog, seeds, sources, CrawlSettings::default())
    }

    pub fn with_settings(
        catalog: &[&str],
        seeds: Vec<Idiom>,
        sources: Vec<Arc<StubSource>>,
        settings: CrawlSettings,
    ) -> Self {
        let store = Arc::new(MemoryIdiomStore::new());
        let catalog = Catalog::new(catalog.iter().map(|k| k.to_string()).collect()).unwrap();
        let cache = Arc::new(LayeredCache::new(
            store.clone(),
            Arc::new(SeedBundle::new(seeds)),
            Arc::new(catalog),
        ));

        let dyn_sources: Vec<Arc<dyn IdiomSource>> = sources
            .iter()
            .map(|s| s.clone() as Arc<dyn IdiomSource>)
            .collect();
        let resolver = Arc::new(
            Resolver::new(cache.clone(), dyn_sources).with_source_timeout(Duration::from_secs(2)),
        );
        let trigger = Arc::new(RecordingTrigger::default());
        let crawler = Arc::new(CrawlScheduler::new(
            resolver.clone(),
            trigger.clone(),
            settings,
        ));

        Self {
            store,
            cache,
            resolver,
            crawler,
            trigger,
            sources,
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::new(AppState::new(self.resolver.clone(), self.crawler.clone()))
    }

    pub fn total_calls(&self) -> usize {
        self.sources.iter().map(|s| s.calls()).sum()
    }

    pub async fn flush(&self) {
        assert!(self.cache.flush(Duration::from_secs(2)).await);
    }
}

/// 七个都失败的来源
pub fn failing_sources() -> Vec<Arc<StubSource>> {
    [
        "baidu_hanyu",
        "zdic",
        "guoxue",
        "cha911",
        "chazidian",
        "baike",
        "hanyuguoxue",
    ]
    .into_iter()
    .map(StubSource::failing)
    .collect()
}

pub fn complete(key: &str) -> Idiom {
    Idiom {
        pronunciation: "wēn gù zhī xīn".into(),
        meaning: format!("{key}的释义"),
        origin: format!("{key}的出处"),
        examples: vec![format!("{key}例句一"), format!("{key}例句二")],
        ..Idiom::new(key)
    }
}
