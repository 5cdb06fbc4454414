//! 外部词典来源。
//!
//! 每个来源都是一个无状态的抓取函数：按成语拼出 URL，请求一次（`cha911` 需要先搜索
//! 再进详情页，请求两次），用各自的页面规则解析出尽量多的字段。任何失败都以
//! `ExtractError` 返回，由调用方记日志后丢弃，不会影响其他来源。
//!
//! 页面解析都是同步的 `parse` 函数，方便直接用 HTML 片段测试。

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ExtractError;
use crate::models::idiom::Idiom;

pub mod baidu_hanyu;
pub mod baike;
pub mod cha911;
pub mod chazidian;
pub mod guoxue;
pub mod hanyuguoxue;
pub mod http;
pub mod text;
pub mod zdic;

pub use http::SourceClient;

/// 统一的来源接口。测试里用替身实现它。
#[async_trait]
pub trait IdiomSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract(&self, key: &str) -> Result<Idiom, ExtractError>;
}

/// 已接入的来源。声明顺序就是合并时的候选顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    BaiduHanyu,
    Zdic,
    Guoxue,
    Cha911,
    Chazidian,
    Baike,
    Hanyuguoxue,
}

impl SourceKind {
    pub const ALL: [SourceKind; 7] = [
        SourceKind::BaiduHanyu,
        SourceKind::Zdic,
        SourceKind::Guoxue,
        SourceKind::Cha911,
        SourceKind::Chazidian,
        SourceKind::Baike,
        SourceKind::Hanyuguoxue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SourceKind::BaiduHanyu => "baidu_hanyu",
            SourceKind::Zdic => "zdic",
            SourceKind::Guoxue => "guoxue",
            SourceKind::Cha911 => "cha911",
            SourceKind::Chazidian => "chazidian",
            SourceKind::Baike => "baike",
            SourceKind::Hanyuguoxue => "hanyuguoxue",
        }
    }
}

/// 真实网站来源
pub struct WebSource {
    kind: SourceKind,
    client: Arc<SourceClient>,
}

impl WebSource {
    pub fn new(kind: SourceKind, client: Arc<SourceClient>) -> Self {
        Self { kind, client }
    }
}

#[async_trait]
impl IdiomSource for WebSource {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    async fn extract(&self, key: &str) -> Result<Idiom, ExtractError> {
        let client = self.client.as_ref();
        match self.kind {
            SourceKind::BaiduHanyu => baidu_hanyu::extract(client, key).await,
            SourceKind::Zdic => zdic::extract(client, key).await,
            SourceKind::Guoxue => guoxue::extract(client, key).await,
            SourceKind::Cha911 => cha911::extract(client, key).await,
            SourceKind::Chazidian => chazidian::extract(client, key).await,
            SourceKind::Baike => baike::extract(client, key).await,
            SourceKind::Hanyuguoxue => hanyuguoxue::extract(client, key).await,
        }
    }
}

/// 全部来源，按声明顺序
pub fn web_sources(client: Arc<SourceClient>) -> Vec<Arc<dyn IdiomSource>> {
    SourceKind::ALL
        .iter()
        .map(|&kind| Arc::new(WebSource::new(kind, Arc::clone(&client))) as Arc<dyn IdiomSource>)
        .collect()
}

/// 页面上常见的字段标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Pronunciation,
    Meaning,
    Origin,
    Example,
    Usage,
    Synonyms,
    Antonyms,
}

impl Field {
    pub(crate) fn classify(label: &str) -> Option<Field> {
        let label = label.trim();
        if label.contains("拼音") || label.contains("注音") {
            Some(Field::Pronunciation)
        } else if label.contains("解释") || label.contains("释义") || label.contains("意思") {
            Some(Field::Meaning)
        } else if label.contains("出处") || label.contains("典故") {
            Some(Field::Origin)
        } else if label.contains("例句") || label.contains("例子") || label.contains("举例") || label.contains("示例") {
            Some(Field::Example)
        } else if label.contains("用法") {
            Some(Field::Usage)
        } else if label.contains("近义") {
            Some(Field::Synonyms)
        } else if label.contains("反义") {
            Some(Field::Antonyms)
        } else {
            None
        }
    }
}

/// 把一个带标签的值填进记录。标量字段只取第一次出现的值。
pub(crate) fn apply_field(idiom: &mut Idiom, field: Field, value: &str) {
    let value = text::normalize(value);
    if value.is_empty() {
        return;
    }
    match field {
        Field::Pronunciation => fill(&mut idiom.pronunciation, value),
        Field::Meaning => fill(&mut idiom.meaning, value),
        Field::Origin => fill(&mut idiom.origin, value),
        Field::Example => {
            if !idiom.examples.contains(&value) {
                idiom.examples.push(value);
            }
        }
        Field::Usage => {
            if idiom.usage_note.is_none() {
                idiom.usage_note = Some(value);
            }
        }
        Field::Synonyms => extend_unique(&mut idiom.synonyms, text::split_related(&value)),
        Field::Antonyms => extend_unique(&mut idiom.antonyms, text::split_related(&value)),
    }
}

fn fill(slot: &mut String, value: String) {
    if slot.is_empty() {
        *slot = value;
    }
}

fn extend_unique(target: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

/// 拼音和释义都没有时整页视为无效
pub(crate) fn finish(idiom: Idiom) -> Option<Idiom> {
    idiom.has_content().then_some(idiom)
}
