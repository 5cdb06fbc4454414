//! 查字典：`dl` 定义列表，`dt` 是标签，紧随其后的 `dd` 是内容

use scraper::{ElementRef, Html, Selector};

use super::http::{url_with_segment, SourceClient};
use super::text::{element_text, first_text};
use super::{apply_field, finish, Field};
use crate::error::ExtractError;
use crate::models::idiom::Idiom;

const BASE_URL: &str = "https://www.chazidian.com/chengyu/";

pub async fn extract(client: &SourceClient, key: &str) -> Result<Idiom, ExtractError> {
    let url = url_with_segment(BASE_URL, key)?;
    let html = client.fetch_html(url).await?;
    parse(key, &html).ok_or(ExtractError::NoContent)
}

pub fn parse(key: &str, html: &str) -> Option<Idiom> {
    let doc = Html::parse_document(html);
    let mut idiom = Idiom::new(key);

    let terms = Selector::parse("dl dt").ok()?;
    for dt in doc.select(&terms) {
        let Some(field) = Field::classify(&element_text(dt)) else { continue };
        for dd in following_definitions(dt) {
            apply_field(&mut idiom, field, &element_text(dd));
        }
    }

    if idiom.pronunciation.is_empty() {
        idiom.pronunciation = first_text(&doc, &[".pinyin", ".py"]);
    }

    finish(idiom)
}

/// `dt` 之后、下一个 `dt` 之前的所有 `dd`
fn following_definitions(dt: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    dt.next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| el.value().name() != "dt")
        .filter(|el| el.value().name() == "dd")
        .collect()
}
