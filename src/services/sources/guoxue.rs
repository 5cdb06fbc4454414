//! 国学大师：表格行，第一格是标签，最后一格是内容

use scraper::{Html, Selector};

use super::http::{url_with_segment, SourceClient};
use super::text::{element_text, select_in};
use super::{apply_field, finish, Field};
use crate::error::ExtractError;
use crate::models::idiom::Idiom;

const BASE_URL: &str = "https://www.guoxuedashi.net/chengyu/";

pub async fn extract(client: &SourceClient, key: &str) -> Result<Idiom, ExtractError> {
    let url = url_with_segment(BASE_URL, &format!("{key}.html"))?;
    let html = client.fetch_html(url).await?;
    parse(key, &html).ok_or(ExtractError::NoContent)
}

pub fn parse(key: &str, html: &str) -> Option<Idiom> {
    let doc = Html::parse_document(html);
    let mut idiom = Idiom::new(key);

    let Ok(rows) = Selector::parse("table tr") else {
        return None;
    };

    for row in doc.select(&rows) {
        let cells = select_in(row, "td, th");
        if cells.len() < 2 {
            continue;
        }
        let label = element_text(cells[0]);
        let value = element_text(cells[cells.len() - 1]);
        if let Some(field) = Field::classify(&label) {
            apply_field(&mut idiom, field, &value);
        }
    }

    finish(idiom)
}
