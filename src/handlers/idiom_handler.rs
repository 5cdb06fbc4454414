use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::idiom::Idiom;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct IdiomQuery {
    /// YYYY-MM-DD，不传则取今天
    pub date: Option<String>,
    /// 为 "1" 时随机取一条
    pub random: Option<String>,
}

/// 获取成语：按日期（默认今天）或随机。
/// 响应准备好之后才在后台做标记已展示、补种子、重爬检查和链式触发。
pub async fn get_idiom(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdiomQuery>,
) -> Result<Json<Idiom>, ApiError> {
    let idiom = if query.random.as_deref() == Some("1") {
        random_idiom(&state).await
    } else {
        let date = parse_date(query.date.as_deref())?;
        let key = state.catalog.key_for_date(date).to_string();
        tracing::debug!(">>> {} 的成语: {}", date, key);
        state.resolver.resolve(&key).await
    };

    let crawler = Arc::clone(&state.crawler);
    let key = idiom.key.clone();
    tokio::spawn(async move {
        crawler.after_serve(&key).await;
    });

    Ok(Json(idiom))
}

/// 持久层有数据就直接随机取一条，否则随机挑一个目录成语现场解析
async fn random_idiom(state: &AppState) -> Idiom {
    state.cache.ensure_seeded().await;
    match state.cache.random_stored().await {
        Some(idiom) => idiom,
        None => {
            let key = state.catalog.random_key().to_string();
            state.resolver.resolve(&key).await
        }
    }
}

fn parse_date(raw: Option<&str>) -> Result<NaiveDate, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Local::now().date_naive()),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest(format!("无效的日期: {raw}，格式应为 YYYY-MM-DD"))),
    }
}
