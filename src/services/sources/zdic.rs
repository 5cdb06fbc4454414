//! 汉典：`.jnr` 内容块里是“标签：内容”形式的段落

use scraper::{Html, Selector};

use super::http::{url_with_segment, SourceClient};
use super::text::{element_text, first_text, select_in, strip_label};
use super::{apply_field, finish, Field};
use crate::error::ExtractError;
use crate::models::idiom::Idiom;

const BASE_URL: &str = "https://www.zdic.net/hans/";

pub async fn extract(client: &SourceClient, key: &str) -> Result<Idiom, ExtractError> {
    let url = url_with_segment(BASE_URL, key)?;
    let html = client.fetch_html(url).await?;
    parse(key, &html).ok_or(ExtractError::NoContent)
}

pub fn parse(key: &str, html: &str) -> Option<Idiom> {
    let doc = Html::parse_document(html);
    let mut idiom = Idiom::new(key);

    idiom.pronunciation = first_text(&doc, &[".dicpy .z_ts2", ".dicpy .z_pyth", ".dicpy"]);

    let Ok(blocks) = Selector::parse(".content .jnr") else {
        return finish(idiom);
    };

    for block in doc.select(&blocks) {
        let paragraphs = select_in(block, "p");
        let mut labelled = false;

        for p in &paragraphs {
            let text = element_text(*p);
            let Some(label) = label_of(&text) else { continue };
            if let Some(field) = Field::classify(label) {
                apply_field(&mut idiom, field, &strip_label(&text));
                labelled = true;
            }
        }

        // 块标题在段落外面时，用整块文字判断块的含义，取第一段
        if !labelled {
            let block_text = element_text(block);
            let first = paragraphs
                .first()
                .map(|p| strip_label(&element_text(*p)))
                .unwrap_or_else(|| strip_label(&block_text));
            if let Some(field) = block_field(&block_text) {
                apply_field(&mut idiom, field, &first);
            }
        }
    }

    finish(idiom)
}

/// 冒号前面不超过 6 个字的部分当作标签
fn label_of(text: &str) -> Option<&str> {
    let pos = text.find(['：', ':'])?;
    let label = &text[..pos];
    (label.chars().count() <= 6).then_some(label)
}

fn block_field(text: &str) -> Option<Field> {
    if text.contains("解释") || text.contains("释义") {
        Some(Field::Meaning)
    } else if text.contains("出处") {
        Some(Field::Origin)
    } else if text.contains("例句") || text.contains("示例") {
        Some(Field::Example)
    } else {
        None
    }
}
