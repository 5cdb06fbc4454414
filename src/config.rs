use std::str::FromStr;
use std::time::Duration;

use crate::services::crawler::CrawlSettings;
use crate::services::resolver::SOURCE_TIMEOUT_MARGIN;

/// 链式触发超时在“时间预算 + 最后一批最长耗时”之外再留的余量
const CHAIN_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// 运行配置，全部来自环境变量（`.env` 由 dotenvy 预先加载）
#[derive(Debug, Clone)]
pub struct Config {
    /// 不设置则持久层以降级模式运行
    pub database_url: Option<String>,
    pub bind_addr: String,
    /// 链式爬取调用自己时使用的地址
    pub public_base_url: String,
    pub db_max_connections: u32,
    pub seed_batch_size: usize,
    pub source_timeout: Duration,
    pub crawl: CrawlSettings,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源读取，方便测试
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string());
        let public_base_url = lookup("PUBLIC_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| format!("http://{bind_addr}"));

        let defaults = CrawlSettings::default();
        let secs = |name: &str, default: Duration| {
            Duration::from_secs(parse_or(&lookup, name, default.as_secs()))
        };
        let source_timeout = Duration::from_secs(parse_or(&lookup, "SOURCE_TIMEOUT_SECS", 8));
        let mut crawl = CrawlSettings {
            batch_size: parse_or(&lookup, "CRAWL_BATCH_SIZE", defaults.batch_size).max(1),
            time_budget: secs("CRAWL_TIME_BUDGET_SECS", defaults.time_budget),
            max_rounds: parse_or(&lookup, "CRAWL_MAX_ROUNDS", defaults.max_rounds),
            chain_timeout: secs("CRAWL_CHAIN_TIMEOUT_SECS", defaults.chain_timeout),
            recrawl_low_water: parse_or(&lookup, "RECRAWL_LOW_WATER", defaults.recrawl_low_water),
            upcoming_days: parse_or(&lookup, "UPCOMING_WINDOW_DAYS", defaults.upcoming_days),
        };

        // 预算快用完时开始的最后一批还要跑满一个来源超时
        let chain_floor = crawl.time_budget + source_timeout + SOURCE_TIMEOUT_MARGIN + CHAIN_TIMEOUT_SLACK;
        if crawl.chain_timeout < chain_floor {
            tracing::warn!(
                "--- CRAWL_CHAIN_TIMEOUT_SECS={} 小于单轮最长耗时，调整为 {}",
                crawl.chain_timeout.as_secs(),
                chain_floor.as_secs()
            );
            crawl.chain_timeout = chain_floor;
        }

        Self {
            database_url,
            bind_addr,
            public_base_url,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5),
            seed_batch_size: parse_or(&lookup, "SEED_BATCH_SIZE", 20usize).max(1),
            source_timeout,
            crawl,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("--- 环境变量 {}={} 无效，使用默认值 {}", name, raw, default);
            default
        }),
    }
}
