use axum::{extract::State, Json};
use std::sync::Arc;

use crate::models::report::CacheStats;
use crate::AppState;

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.crawler.stats().await)
}
