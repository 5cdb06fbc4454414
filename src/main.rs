use anyhow::Context;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chengyu_daily::config::Config;
use chengyu_daily::services::cache::{LayeredCache, PgIdiomStore};
use chengyu_daily::services::catalog::Catalog;
use chengyu_daily::services::crawler::{CrawlScheduler, HttpChainTrigger};
use chengyu_daily::services::resolver::{Resolver, SOURCE_TIMEOUT_MARGIN};
use chengyu_daily::services::seed::SeedBundle;
use chengyu_daily::services::sources::{http::SourceClient, web_sources};
use chengyu_daily::{build_router, AppState};

/// 退出前等待后台写入的最长时间
const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 初始化日志系统
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. 加载 .env 环境变量
    dotenv().ok();
    let config = Config::from_env();

    // 3. 持久层：没有配置或连不上都降级运行
    let store = match &config.database_url {
        Some(url) => match PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(url)
            .await
        {
            Ok(pool) => PgIdiomStore::new(pool),
            Err(e) => {
                tracing::error!("!!! 数据库连接失败，持久层降级运行: {}", e);
                PgIdiomStore::disabled()
            }
        },
        None => {
            tracing::warn!("--- 未设置 DATABASE_URL，持久层降级运行");
            PgIdiomStore::disabled()
        }
    };

    // 4. 内置数据 + 缓存 + 解析器 + 爬取调度
    let catalog = Arc::new(Catalog::bundled().context("加载成语目录失败")?);
    let seeds = Arc::new(SeedBundle::bundled().context("加载种子数据失败")?);
    tracing::info!("<<< 成语目录 {} 条, 种子数据 {} 条", catalog.len(), seeds.len());

    let cache = Arc::new(
        LayeredCache::new(Arc::new(store), seeds, catalog).with_seed_batch(config.seed_batch_size),
    );

    let client = Arc::new(SourceClient::new(config.source_timeout).context("创建 HTTP 客户端失败")?);
    let resolver = Arc::new(
        Resolver::new(Arc::clone(&cache), web_sources(client))
            .with_source_timeout(config.source_timeout + SOURCE_TIMEOUT_MARGIN),
    );

    let trigger = HttpChainTrigger::new(&config.public_base_url, config.crawl.chain_timeout)
        .context("PUBLIC_BASE_URL 无效")?;
    let crawler = Arc::new(CrawlScheduler::new(
        Arc::clone(&resolver),
        Arc::new(trigger),
        config.crawl.clone(),
    ));

    let shared_state = Arc::new(AppState::new(resolver, crawler));

    // 5. 构建路由
    let app = build_router(shared_state);

    // 6. 启动服务
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("无法监听 {}", config.bind_addr))?;
    tracing::info!("🚀 Server started at http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 7. 等待未完成的持久层写入
    if !cache.flush(SHUTDOWN_FLUSH_TIMEOUT).await {
        tracing::warn!("--- 部分后台写入未在退出前完成");
    }
    tracing::info!("<<< 服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("!!! 监听退出信号失败: {}", e);
        std::future::pending::<()>().await;
    }
}
