use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Url;
use std::time::Duration;

use crate::error::ExtractError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 所有来源共用的 HTTP 客户端：浏览器请求头 + 固定超时
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: reqwest::Client,
}

impl SourceClient {
    pub fn new(timeout: Duration) -> Result<Self, ExtractError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9"));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http })
    }

    /// 非 2xx 直接返回 `ExtractError::Status`
    pub async fn fetch_html(&self, url: Url) -> Result<String, ExtractError> {
        tracing::debug!(url = %url, "抓取页面");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

/// `base` 后面追加一个路径段（自动做百分号编码）
pub fn url_with_segment(base: &str, segment: &str) -> Result<Url, ExtractError> {
    let mut url = Url::parse(base).map_err(|e| ExtractError::Url(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ExtractError::Url(format!("{base} 不能追加路径")))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

pub fn url_with_query(base: &str, params: &[(&str, &str)]) -> Result<Url, ExtractError> {
    Url::parse_with_params(base, params).map_err(|e| ExtractError::Url(e.to_string()))
}
