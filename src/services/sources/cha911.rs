//! 911 查询成语：页面按内部编号组织，先搜索再进详情页。
//! 详情页字段是【标签】内容 的形式。

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};

use super::http::{url_with_query, SourceClient};
use super::text::element_text;
use super::{apply_field, finish, Field};
use crate::error::ExtractError;
use crate::models::idiom::Idiom;

const SEARCH_URL: &str = "https://chengyu.911cha.com/";

static SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"【([^】]{1,8})】([^【]*)").expect("valid regex"));

pub async fn extract(client: &SourceClient, key: &str) -> Result<Idiom, ExtractError> {
    let search_url = url_with_query(SEARCH_URL, &[("q", key)])?;
    let search_page = client.fetch_html(search_url.clone()).await?;

    let detail_url = find_detail_link(key, &search_page, &search_url).ok_or(ExtractError::NoMatch)?;
    let html = client.fetch_html(detail_url).await?;
    parse(key, &html).ok_or(ExtractError::NoContent)
}

/// 搜索结果里链接文字正好等于成语的那一条
pub fn find_detail_link(key: &str, html: &str, base: &Url) -> Option<Url> {
    let doc = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").ok()?;

    doc.select(&anchors)
        .filter(|a| element_text(*a) == key)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| base.join(href).ok())
}

pub fn parse(key: &str, html: &str) -> Option<Idiom> {
    let doc = Html::parse_document(html);
    let mut idiom = Idiom::new(key);

    let blocks = Selector::parse("p, li, dd").ok()?;
    for block in doc.select(&blocks) {
        let text = element_text(block);
        for caps in SECTION.captures_iter(&text) {
            if let Some(field) = Field::classify(&caps[1]) {
                apply_field(&mut idiom, field, &caps[2]);
            }
        }
    }

    finish(idiom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_exact_link_only() {
        let base = Url::parse("https://chengyu.911cha.com/?q=%E5%AE%88").unwrap();
        let page = r#"
            <ul>
              <li><a href="/MTIzNA.html">守株待兔子</a></li>
              <li><a href="/NTY3OA.html">守株待兔</a></li>
            </ul>"#;

        let url = find_detail_link("守株待兔", page, &base).unwrap();
        assert_eq!(url.as_str(), "https://chengyu.911cha.com/NTY3OA.html");
    }

    #[test]
    fn no_link_means_no_match() {
        let base = Url::parse(SEARCH_URL).unwrap();
        assert!(find_detail_link("守株待兔", "<p>没有找到</p>", &base).is_none());
    }

    #[test]
    fn parses_bracketed_sections() {
        let page = r#"
            <div class="mcon">
              <p>【拼音】shǒu zhū dài tù</p>
              <p>【解释】原比喻希图不经过努力而得到成功的侥幸心理。【出处】《韩非子·五蠹》</p>
              <p>【例子】我们不能守株待兔，要主动出击。</p>
              <p>【近义词】<a href="/a.html">刻舟求剑</a>、<a href="/b.html">坐享其成</a></p>
              <p>【英文】wait for gains without pains</p>
            </div>"#;

        let idiom = parse("守株待兔", page).unwrap();
        assert_eq!(idiom.pronunciation, "shǒu zhū dài tù");
        assert_eq!(idiom.meaning, "原比喻希图不经过努力而得到成功的侥幸心理。");
        assert_eq!(idiom.origin, "《韩非子·五蠹》");
        assert_eq!(idiom.examples, vec!["我们不能守株待兔，要主动出击。"]);
        assert_eq!(idiom.synonyms, vec!["刻舟求剑", "坐享其成"]);
    }
}
