//! 批量回填工具
//!
//! 从偏移量 0 开始分批调用运行中服务的 `/api/cron/crawl?mode=index`，
//! 把拿到的成语写进本地 JSON 文件。可以中断后重跑：已有文件会先读进来，
//! 占位记录不会覆盖已有条目。
//!
//! ```bash
//! backfill --server http://127.0.0.1:3000 --batch 5 --delay-ms 3000
//! ```

use anyhow::Context;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chengyu_daily::models::idiom::Idiom;
use chengyu_daily::models::report::IndexReport;

/// 一批失败后等待多久重试
const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[clap(name = "backfill")]
#[clap(about = "按目录顺序批量爬取成语并写入 JSON 文件")]
struct Args {
    /// 服务地址
    #[clap(long, env = "BACKFILL_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// 每批条数
    #[clap(long, default_value = "5")]
    batch: usize,

    /// 两批之间的间隔（毫秒）
    #[clap(long, default_value = "3000")]
    delay_ms: u64,

    /// 从目录的第几条开始
    #[clap(long, default_value = "0")]
    start: usize,

    /// 输出文件
    #[clap(long, value_name = "FILE", default_value = "data/crawled_idioms.json")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let batch = args.batch.max(1);
    let endpoint = format!("{}/api/cron/crawl", args.server.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()?;

    let mut collected = load_existing(&args.output).await?;
    tracing::info!(">>> 已有 {} 条，从第 {} 条开始", collected.len(), args.start);

    let mut offset = args.start;
    let mut total = usize::MAX;
    while offset < total {
        let report = match fetch_batch(&client, &endpoint, offset, batch).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("--- offset={} 失败: {}，{} 秒后重试", offset, e, RETRY_DELAY.as_secs());
                tokio::time::sleep(RETRY_DELAY).await;
                match fetch_batch(&client, &endpoint, offset, batch).await {
                    Ok(report) => report,
                    Err(e) => {
                        tracing::error!("!!! offset={} 重试仍失败，跳过: {}", offset, e);
                        offset += batch;
                        continue;
                    }
                }
            }
        };

        total = report.total;
        let added = absorb(&mut collected, report.data);
        save(&args.output, &collected).await?;
        tracing::info!(
            "<<< [{}/{}] 成功 {}, 失败 {}, 新增 {}, 累计 {}",
            (offset + batch).min(total),
            total,
            report.success,
            report.errors,
            added,
            collected.len()
        );

        offset += batch;
        if offset < total {
            tokio::time::sleep(Duration::from_millis(args.delay_ms)).await;
        }
    }

    tracing::info!("<<< 回填完成，共 {} 条，已写入 {}", collected.len(), args.output.display());
    Ok(())
}

async fn fetch_batch(
    client: &reqwest::Client,
    endpoint: &str,
    offset: usize,
    batch: usize,
) -> anyhow::Result<IndexReport> {
    let report = client
        .get(endpoint)
        .query(&[("mode", "index".to_string()), ("offset", offset.to_string()), ("batch", batch.to_string())])
        .send()
        .await?
        .error_for_status()?
        .json::<IndexReport>()
        .await?;
    Ok(report)
}

async fn load_existing(path: &Path) -> anyhow::Result<BTreeMap<String, Idiom>> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => serde_json::from_str(&raw).with_context(|| format!("{} 不是有效的 JSON", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

async fn save(path: &Path, collected: &BTreeMap<String, Idiom>) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, serde_json::to_string_pretty(collected)?).await?;
    Ok(())
}

/// 合并一批结果，返回新增条数。占位记录不覆盖已有条目。
fn absorb(collected: &mut BTreeMap<String, Idiom>, batch: BTreeMap<String, Idiom>) -> usize {
    let mut added = 0;
    for (key, idiom) in batch {
        if idiom.is_placeholder() && collected.contains_key(&key) {
            continue;
        }
        if collected.insert(key, idiom).is_none() {
            added += 1;
        }
    }
    added
}
