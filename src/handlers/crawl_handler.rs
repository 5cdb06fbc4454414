use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

/// mode=index 时单次最多处理的条数
const MAX_INDEX_BATCH: usize = 50;
const DEFAULT_INDEX_BATCH: usize = 10;

#[derive(Debug, Deserialize)]
pub struct CrawlQuery {
    pub mode: Option<String>,
    pub round: Option<u32>,
    pub offset: Option<usize>,
    pub batch: Option<usize>,
}

/// 爬取入口。
///
/// - `mode=index&offset=&batch=`：按目录偏移量爬一段，供批量脚本使用
/// - 其他：自链式爬取的一轮，做不完时在本轮结束后触发 `round + 1`
pub async fn crawl(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CrawlQuery>,
) -> Response {
    if query.mode.as_deref() == Some("index") {
        let offset = query.offset.unwrap_or(0);
        let batch = query.batch.unwrap_or(DEFAULT_INDEX_BATCH).clamp(1, MAX_INDEX_BATCH);
        tracing::info!(">>> 按偏移量爬取: offset={}, batch={}", offset, batch);
        let report = state.crawler.crawl_index(offset, batch).await;
        return Json(report).into_response();
    }

    // 本轮放在独立任务里跑，调用方断开也不会中断本轮和下一轮的触发
    let round = query.round.unwrap_or(0);
    match state.crawler.spawn_round(round).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            tracing::error!("!!! 第 {} 轮爬取任务异常结束: {}", round, e);
            ApiError::Internal(format!("第 {round} 轮爬取任务异常结束")).into_response()
        }
    }
}
