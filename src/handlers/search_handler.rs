use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::report::SearchResponse;
use crate::services::search::search;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// 搜索成语，最多 20 条
pub async fn search_idioms(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let q = query.q.unwrap_or_default();
    Json(SearchResponse {
        results: search(&state.catalog, &state.seeds, &q),
    })
}
