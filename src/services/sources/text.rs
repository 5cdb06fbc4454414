use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static RELATED_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[、，,；;\s]+").expect("valid regex"));

/// 合并连续空白并去掉首尾空白
pub fn normalize(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// 去掉第一个全角或半角冒号及其之前的标签文字
pub fn strip_label(s: &str) -> String {
    match s.find(['：', ':']) {
        Some(pos) => {
            let colon_len = s[pos..].chars().next().map_or(1, char::len_utf8);
            normalize(&s[pos + colon_len..])
        }
        None => normalize(s),
    }
}

/// 近义词/反义词列表
pub fn split_related(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for word in RELATED_SEPARATORS.split(s) {
        let word = word.trim();
        if !word.is_empty() && !out.iter().any(|w| w == word) {
            out.push(word.to_string());
        }
    }
    out
}

pub fn element_text(el: ElementRef<'_>) -> String {
    normalize(&el.text().collect::<String>())
}

/// 依次尝试多个选择器，返回第一个非空文本
pub fn first_text(doc: &Html, selectors: &[&str]) -> String {
    for css in selectors {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        if let Some(text) = doc
            .select(&selector)
            .map(element_text)
            .find(|t| !t.is_empty())
        {
            return text;
        }
    }
    String::new()
}

/// 选择器匹配到的全部非空文本
pub fn all_texts(doc: &Html, css: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };
    doc.select(&selector)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn select_in<'a>(el: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => el.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// 标题里带 `label` 的区块（如 `.tab-content` 下 `.title` 为“出处”的那一块）
/// 中 `value_css` 的文本
pub fn titled_block_text(
    doc: &Html,
    block_css: &str,
    title_css: &str,
    label: &str,
    value_css: &str,
) -> Vec<String> {
    let Ok(block) = Selector::parse(block_css) else {
        return Vec::new();
    };
    doc.select(&block)
        .filter(|b| {
            select_in(*b, title_css)
                .into_iter()
                .any(|t| element_text(t).contains(label))
        })
        .flat_map(|b| select_in(b, value_css).into_iter().map(element_text))
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  温故\n\t 知新 "), "温故 知新");
    }

    #[test]
    fn strip_label_handles_both_colons() {
        assert_eq!(strip_label("解释：温习旧的知识。"), "温习旧的知识。");
        assert_eq!(strip_label("出处: 《论语》"), "《论语》");
        assert_eq!(strip_label("没有标签"), "没有标签");
    }

    #[test]
    fn split_related_dedups() {
        assert_eq!(
            split_related("触类旁通、闻一知十，融会贯通 触类旁通"),
            vec!["触类旁通", "闻一知十", "融会贯通"]
        );
        assert!(split_related(" 、 ").is_empty());
    }

    #[test]
    fn first_text_falls_through_selectors() {
        let doc = Html::parse_document(r#"<div class="b"> 乙 </div><div class="a"></div>"#);
        assert_eq!(first_text(&doc, &[".a", ".b"]), "乙");
        assert_eq!(first_text(&doc, &[".missing", "[[bad"]), "");
    }

    #[test]
    fn titled_blocks_are_filtered_by_label() {
        let doc = Html::parse_document(
            r#"<div class="tab"><span class="title">出处</span><p class="text">《论语》</p></div>
               <div class="tab"><span class="title">例句</span><p class="text">例一</p><p class="text">例二</p></div>"#,
        );
        assert_eq!(titled_block_text(&doc, ".tab", ".title", "例句", ".text"), vec!["例一", "例二"]);
        assert_eq!(titled_block_text(&doc, ".tab", ".title", "出处", ".text"), vec!["《论语》"]);
    }
}
