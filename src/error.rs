use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 单个来源抓取失败的原因。只用于日志，不会传给调用方。
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("请求失败: {0}")]
    Http(String),

    #[error("请求超时")]
    Timeout,

    #[error("HTTP 状态码 {0}")]
    Status(u16),

    #[error("页面中没有拼音和释义")]
    NoContent,

    #[error("搜索结果中没有匹配的链接")]
    NoMatch,

    #[error("URL 构造失败: {0}")]
    Url(String),
}

impl From<reqwest::Error> for ExtractError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ExtractError::Timeout
        } else if let Some(status) = e.status() {
            ExtractError::Status(status.as_u16())
        } else {
            ExtractError::Http(e.to_string())
        }
    }
}

/// 持久层错误。缓存层会把它降级成空结果。
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("持久层未配置或不可用")]
    Unavailable,

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
}

/// 接口层错误
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// 内置目录/种子数据加载失败
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("内置数据解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("成语目录为空")]
    Empty,
}
