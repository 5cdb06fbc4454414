//! 百度汉语：按 id/class 取字段，取不到时按带标题的 tab 区块兜底

use scraper::Html;

use super::http::{url_with_query, SourceClient};
use super::text::{all_texts, first_text, split_related, titled_block_text};
use super::{apply_field, finish, Field};
use crate::error::ExtractError;
use crate::models::idiom::Idiom;

const SEARCH_URL: &str = "https://hanyu.baidu.com/s";

pub async fn extract(client: &SourceClient, key: &str) -> Result<Idiom, ExtractError> {
    let url = url_with_query(SEARCH_URL, &[("wd", key), ("ptype", "zici")])?;
    let html = client.fetch_html(url).await?;
    parse(key, &html).ok_or(ExtractError::NoContent)
}

pub fn parse(key: &str, html: &str) -> Option<Idiom> {
    let doc = Html::parse_document(html);
    let mut idiom = Idiom::new(key);

    idiom.pronunciation = first_text(&doc, &["#pinyin .keyword", ".pronounce .keyword", "#pinyin b"]);
    idiom.meaning = first_text(
        &doc,
        &["#basicmean-wrapper .tab-content p", ".tab-content .content .text", "#explanation .text"],
    );

    let origin = first_text(&doc, &["#source-wrapper .tab-content p", "#source .text"]);
    let origin = if origin.is_empty() {
        tab_text(&doc, "出处").into_iter().next().unwrap_or_default()
    } else {
        origin
    };
    apply_field(&mut idiom, Field::Origin, &origin);

    let mut examples = all_texts(&doc, "#liju-wrapper .tab-content p");
    if examples.is_empty() {
        examples = all_texts(&doc, "#example .text");
    }
    if examples.is_empty() {
        examples = tab_text(&doc, "例句");
    }
    for example in examples {
        apply_field(&mut idiom, Field::Example, &example);
    }

    idiom.synonyms = related(&doc, "#synonym .text", "近义词");
    idiom.antonyms = related(&doc, "#antonym .text", "反义词");

    let usage = first_text(&doc, &["#usage-wrapper .tab-content p"]);
    apply_field(&mut idiom, Field::Usage, &usage);

    finish(idiom)
}

fn tab_text(doc: &Html, label: &str) -> Vec<String> {
    titled_block_text(doc, ".tab-content", ".title", label, ".text")
}

fn related(doc: &Html, css: &str, label: &str) -> Vec<String> {
    let mut texts = all_texts(doc, css);
    if texts.is_empty() {
        texts = tab_text(doc, label);
    }
    split_related(&texts.join("、"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div id="pinyin"><span class="keyword">wēn gù zhī xīn</span></div>
          <div id="basicmean-wrapper"><div class="tab-content"><p>温习旧的知识，从而得到新的理解和体会。</p></div></div>
          <div id="source-wrapper"><div class="tab-content"><p>《论语·为政》：“温故而知新，可以为师矣。”</p></div></div>
          <div id="liju-wrapper"><div class="tab-content">
            <p>我们在学习中要温故知新。</p>
            <p>温故知新是学习的好方法。</p>
          </div></div>
          <div id="synonym"><span class="text">继往开来、举一反三</span></div>
          <div id="antonym"><span class="text">好高骛远</span></div>
        </body></html>"#;

    #[test]
    fn parses_primary_layout() {
        let idiom = parse("温故知新", PAGE).unwrap();
        assert_eq!(idiom.key, "温故知新");
        assert_eq!(idiom.pronunciation, "wēn gù zhī xīn");
        assert_eq!(idiom.meaning, "温习旧的知识，从而得到新的理解和体会。");
        assert!(idiom.origin.starts_with("《论语·为政》"));
        assert_eq!(idiom.examples.len(), 2);
        assert_eq!(idiom.synonyms, vec!["继往开来", "举一反三"]);
        assert_eq!(idiom.antonyms, vec!["好高骛远"]);
        assert!(idiom.is_complete());
    }

    #[test]
    fn falls_back_to_titled_tabs() {
        let page = r#"
            <div class="pronounce"><span class="keyword">jǔ yī fǎn sān</span></div>
            <div class="tab-content"><span class="title">出处</span><span class="text">《论语·述而》</span></div>
            <div class="tab-content"><span class="title">例句</span><span class="text">学习要举一反三。</span></div>
            <div class="tab-content"><span class="title">近义词</span><span class="text">触类旁通 闻一知十</span></div>"#;

        let idiom = parse("举一反三", page).unwrap();
        assert_eq!(idiom.pronunciation, "jǔ yī fǎn sān");
        assert_eq!(idiom.origin, "《论语·述而》");
        assert_eq!(idiom.examples, vec!["学习要举一反三。"]);
        assert_eq!(idiom.synonyms, vec!["触类旁通", "闻一知十"]);
        assert!(idiom.meaning.is_empty());
    }

    #[test]
    fn page_without_pinyin_or_meaning_is_rejected() {
        let page = r#"<div id="source"><span class="text">《论语》</span></div>"#;
        assert!(parse("温故知新", page).is_none());
    }
}
