//! 多来源结果的逐字段合并。
//!
//! 候选顺序固定为：种子数据在前，之后按来源声明顺序排列。合并结果只取决于
//! 候选在列表中的位置，和哪个来源先返回无关。

use crate::models::idiom::{Idiom, MAX_EXAMPLES};

/// 合并候选记录。全部为 `None` 时返回 `None`。
///
/// - 拼音：第一个非空值
/// - 释义、出处、用法：最长的非空值（长度相同时保留先出现的）
/// - 例句：按顺序拼接，互为子串的只保留较长的一条，最多 3 条
/// - 近义词、反义词：取并集
pub fn merge<I>(candidates: I) -> Option<Idiom>
where
    I: IntoIterator<Item = Option<Idiom>>,
{
    let present: Vec<Idiom> = candidates.into_iter().flatten().collect();
    let first = present.first()?;
    let mut merged = Idiom::new(first.key.clone());

    for candidate in &present {
        if merged.pronunciation.is_empty() && !candidate.pronunciation.trim().is_empty() {
            merged.pronunciation = candidate.pronunciation.trim().to_string();
        }
        keep_longest(&mut merged.meaning, &candidate.meaning);
        keep_longest(&mut merged.origin, &candidate.origin);

        if let Some(note) = candidate.usage_note.as_deref() {
            let current = merged.usage_note.get_or_insert_with(String::new);
            keep_longest(current, note);
        }

        for example in &candidate.examples {
            push_example(&mut merged.examples, example);
        }
        union_into(&mut merged.synonyms, &candidate.synonyms);
        union_into(&mut merged.antonyms, &candidate.antonyms);
    }

    merged.examples.truncate(MAX_EXAMPLES);
    merged.usage_note = merged.usage_note.filter(|note| !note.is_empty());
    Some(merged)
}

fn keep_longest(current: &mut String, candidate: &str) {
    let candidate = candidate.trim();
    if candidate.chars().count() > current.chars().count() {
        *current = candidate.to_string();
    }
}

/// 新例句是已有例句的子串则跳过；包含已有例句则替换第一条被包含的，
/// 其余被包含的删掉。
pub(crate) fn push_example(kept: &mut Vec<String>, example: &str) {
    let example = example.trim();
    if example.is_empty() || kept.iter().any(|k| k.contains(example)) {
        return;
    }

    match kept.iter().position(|k| example.contains(k.as_str())) {
        Some(pos) => {
            kept[pos] = example.to_string();
            let mut idx = 0;
            kept.retain(|k| {
                let keep = idx == pos || !example.contains(k.as_str());
                idx += 1;
                keep
            });
        }
        None => kept.push(example.to_string()),
    }
}

fn union_into(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !target.iter().any(|t| t == item) {
            target.push(item.to_string());
        }
    }
}
