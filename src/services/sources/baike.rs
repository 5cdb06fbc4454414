//! 百度百科：只读词条摘要（meta description 和摘要区），
//! 从引号和固定措辞中截取片段。

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::http::{url_with_segment, SourceClient};
use super::text::{first_text, normalize};
use super::{apply_field, finish, Field};
use crate::error::ExtractError;
use crate::models::idiom::Idiom;

const BASE_URL: &str = "https://baike.baidu.com/item/";

static PINYIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[（(](?:拼音[：:]?\s*)?([a-zA-Zāáǎàēéěèīíǐìōóǒòūúǔùǖǘǚǜüńňǹ]+(?:\s+[a-zA-Zāáǎàēéěèīíǐìōóǒòūúǔùǖǘǚǜüńňǹ]+)+)\s*[）)]")
        .expect("valid regex")
});
static QUOTED_MEANING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:意思是|意为|释义为|解释为)[：:，,]?\s*“([^”]+)”").expect("valid regex"));
static PLAIN_MEANING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"((?:比喻|形容|意思是|指)[^。]*。)").expect("valid regex"));
static ORIGIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"出自([^。，,；;]+)").expect("valid regex"));
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"“([^”]+)”").expect("valid regex"));

pub async fn extract(client: &SourceClient, key: &str) -> Result<Idiom, ExtractError> {
    let url = url_with_segment(BASE_URL, key)?;
    let html = client.fetch_html(url).await?;
    parse(key, &html).ok_or(ExtractError::NoContent)
}

pub fn parse(key: &str, html: &str) -> Option<Idiom> {
    let summary = summary_text(html);
    if summary.is_empty() {
        return None;
    }
    parse_summary(key, &summary)
}

fn summary_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let body = first_text(&doc, &[".lemma-summary", ".J-summary", "[class*=lemmaSummary]"]);
    if !body.is_empty() {
        return body;
    }

    Selector::parse(r#"meta[name="description"]"#)
        .ok()
        .and_then(|sel| {
            doc.select(&sel)
                .filter_map(|m| m.value().attr("content"))
                .map(normalize)
                .find(|c| !c.is_empty())
        })
        .unwrap_or_default()
}

pub fn parse_summary(key: &str, summary: &str) -> Option<Idiom> {
    let mut idiom = Idiom::new(key);

    if let Some(caps) = PINYIN.captures(summary) {
        apply_field(&mut idiom, Field::Pronunciation, &caps[1]);
    }

    let meaning = QUOTED_MEANING
        .captures(summary)
        .or_else(|| PLAIN_MEANING.captures(summary))
        .map(|caps| caps[1].to_string());
    if let Some(meaning) = &meaning {
        apply_field(&mut idiom, Field::Meaning, meaning);
    }

    if let Some(caps) = ORIGIN.captures(summary) {
        apply_field(&mut idiom, Field::Origin, &caps[1]);
    }

    // 带成语本身、又不是释义的引文当作例句
    for caps in QUOTED.captures_iter(summary) {
        let quote = &caps[1];
        if quote.contains(key) && quote != key && meaning.as_deref() != Some(quote) {
            apply_field(&mut idiom, Field::Example, quote);
        }
    }

    finish(idiom)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = "井底之蛙（拼音：jǐng dǐ zhī wā）是一则来源于庄子的成语，\
        出自《庄子·秋水》。意思是“井底的青蛙只能看到井口那么大的天”，\
        比喻见识狭窄的人。如“他就像井底之蛙一样，不知道外面的世界有多大”。";

    #[test]
    fn extracts_snippets_from_summary() {
        let idiom = parse_summary("井底之蛙", SUMMARY).unwrap();
        assert_eq!(idiom.pronunciation, "jǐng dǐ zhī wā");
        assert_eq!(idiom.meaning, "井底的青蛙只能看到井口那么大的天");
        assert_eq!(idiom.origin, "《庄子·秋水》");
        assert_eq!(idiom.examples, vec!["他就像井底之蛙一样，不知道外面的世界有多大"]);
    }

    #[test]
    fn reads_meta_description_when_summary_missing() {
        let page = r#"<html><head>
            <meta name="description" content="对牛弹琴（duì niú tán qín），比喻对不懂道理的人讲道理。">
            </head><body></body></html>"#;

        let idiom = parse("对牛弹琴", page).unwrap();
        assert_eq!(idiom.pronunciation, "duì niú tán qín");
        assert_eq!(idiom.meaning, "比喻对不懂道理的人讲道理。");
    }

    #[test]
    fn page_without_summary_is_rejected() {
        assert!(parse("对牛弹琴", "<html><body><p>百度百科错误页</p></body></html>").is_none());
    }
}
