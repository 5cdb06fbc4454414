use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};

/// 全部来源都拿不到数据时返回的占位释义
pub const PLACEHOLDER_MEANING: &str = "暂未获取到释义，请稍后再试。";

/// 例句最多保留条数
pub const MAX_EXAMPLES: usize = 3;

/// 完整记录至少需要的例句条数
pub const MIN_COMPLETE_EXAMPLES: usize = 2;

/// 成语记录。`key` 即成语本身，是唯一标识。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idiom {
    pub key: String,
    #[serde(default)]
    pub pronunciation: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_note: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
}

impl Idiom {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// 占位记录：不会写入任何缓存层，下次请求会重新走网络抓取
    pub fn placeholder(key: impl Into<String>) -> Self {
        Self {
            meaning: PLACEHOLDER_MEANING.to_string(),
            ..Self::new(key)
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.meaning == PLACEHOLDER_MEANING
    }

    /// 拼音、释义、出处都不为空，且例句不少于两条
    pub fn is_complete(&self) -> bool {
        !self.pronunciation.trim().is_empty()
            && !self.meaning.trim().is_empty()
            && !self.origin.trim().is_empty()
            && self.examples.len() >= MIN_COMPLETE_EXAMPLES
    }

    /// 拼音和释义至少有一项，否则该来源的结果视为不可用
    pub fn has_content(&self) -> bool {
        !self.pronunciation.trim().is_empty() || !self.meaning.trim().is_empty()
    }

    /// 可以作为成功结果返回给调用方（非占位、释义非空）
    pub fn is_usable(&self) -> bool {
        !self.meaning.trim().is_empty() && !self.is_placeholder()
    }
}

/// 对应 idioms 表的一行
#[derive(Debug, FromRow)]
pub struct IdiomRow {
    pub key: String,
    pub pronunciation: String,
    pub meaning: String,
    pub origin: String,
    pub examples: Vec<String>,
    pub usage_note: Option<String>,
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
    pub served: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<IdiomRow> for Idiom {
    fn from(row: IdiomRow) -> Self {
        Self {
            key: row.key,
            pronunciation: row.pronunciation,
            meaning: row.meaning,
            origin: row.origin,
            examples: row.examples,
            usage_note: row.usage_note.filter(|note| !note.trim().is_empty()),
            synonyms: row.synonyms,
            antonyms: row.antonyms,
        }
    }
}
