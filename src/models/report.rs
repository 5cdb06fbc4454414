use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::idiom::Idiom;

/// 缓存统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub total_idioms: usize,
    pub cached: usize,
    pub uncached: usize,
    pub served: usize,
    pub unserved: usize,
    pub memory_cached: usize,
    pub crawl_in_progress: bool,
    /// 持久层是否可用；不可用时 cached/uncached 按内存层估算
    pub persistent: bool,
}

/// mode=index 的返回
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexReport {
    pub mode: String,
    pub offset: usize,
    pub batch: usize,
    pub total: usize,
    pub success: usize,
    pub errors: usize,
    pub cache: CacheStats,
    pub data: BTreeMap<String, Idiom>,
}

/// 自链式爬取一轮的返回
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    pub mode: String,
    pub round: u32,
    pub success: usize,
    pub errors: usize,
    pub remaining: usize,
    /// 本轮因时间预算用完而提前结束
    pub timed_out: bool,
    pub time_used: String,
    pub cache: CacheStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}
