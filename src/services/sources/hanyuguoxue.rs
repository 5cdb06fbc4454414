//! 汉语国学：字段各有固定 class，例句是列表，近/反义词是链接列表

use scraper::Html;

use super::http::{url_with_segment, SourceClient};
use super::text::{all_texts, first_text, strip_label};
use super::{apply_field, finish, Field};
use crate::error::ExtractError;
use crate::models::idiom::Idiom;

const BASE_URL: &str = "https://www.hanyuguoxue.com/chengyu/";

pub async fn extract(client: &SourceClient, key: &str) -> Result<Idiom, ExtractError> {
    let url = url_with_segment(BASE_URL, key)?;
    let html = client.fetch_html(url).await?;
    parse(key, &html).ok_or(ExtractError::NoContent)
}

pub fn parse(key: &str, html: &str) -> Option<Idiom> {
    let doc = Html::parse_document(html);
    let mut idiom = Idiom::new(key);

    let scalars = [
        (Field::Pronunciation, &[".cy-pinyin", ".pinyin"][..]),
        (Field::Meaning, &[".cy-jieshi p", ".jieshi"][..]),
        (Field::Origin, &[".cy-chuchu p", ".chuchu"][..]),
        (Field::Usage, &[".cy-yongfa p", ".yongfa"][..]),
    ];
    for (field, selectors) in scalars {
        apply_field(&mut idiom, field, &strip_label(&first_text(&doc, selectors)));
    }

    for example in all_texts(&doc, ".cy-liju li") {
        apply_field(&mut idiom, Field::Example, &strip_label(&example));
    }
    for word in all_texts(&doc, ".cy-jinyi a") {
        apply_field(&mut idiom, Field::Synonyms, &word);
    }
    for word in all_texts(&doc, ".cy-fanyi a") {
        apply_field(&mut idiom, Field::Antonyms, &word);
    }

    finish(idiom)
}
