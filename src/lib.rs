use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

use services::cache::LayeredCache;
use services::catalog::Catalog;
use services::crawler::CrawlScheduler;
use services::resolver::Resolver;
use services::seed::SeedBundle;

// 全局状态，handler 通过 State<Arc<AppState>> 取用
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub seeds: Arc<SeedBundle>,
    pub cache: Arc<LayeredCache>,
    pub resolver: Arc<Resolver>,
    pub crawler: Arc<CrawlScheduler>,
}

impl AppState {
    pub fn new(resolver: Arc<Resolver>, crawler: Arc<CrawlScheduler>) -> Self {
        let cache = Arc::clone(resolver.cache());
        Self {
            catalog: Arc::clone(cache.catalog()),
            seeds: Arc::clone(cache.seeds()),
            cache,
            resolver,
            crawler,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    // 前端部署在别的域名下，跨域全部放开
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/idiom", get(handlers::idiom_handler::get_idiom))
        .route("/api/cron/crawl", get(handlers::crawl_handler::crawl))
        .route("/api/search", get(handlers::search_handler::search_idioms))
        .route("/api/stats", get(handlers::stats_handler::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
