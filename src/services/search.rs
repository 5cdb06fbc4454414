use std::collections::HashSet;

use crate::models::report::SearchHit;
use crate::services::catalog::Catalog;
use crate::services::seed::SeedBundle;

pub const MAX_RESULTS: usize = 20;

/// 先按成语本身做子串匹配，不够 20 条再匹配种子数据的释义和出处
pub fn search(catalog: &Catalog, seeds: &SeedBundle, query: &str) -> Vec<SearchHit> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<SearchHit> = catalog
        .keys()
        .iter()
        .filter(|key| key.contains(query))
        .take(MAX_RESULTS)
        .map(|key| SearchHit {
            key: key.clone(),
            meaning: seeds.get(key).map(|s| s.meaning.clone()),
        })
        .collect();

    if results.len() < MAX_RESULTS {
        let matched: HashSet<String> = results.iter().map(|r| r.key.clone()).collect();
        let by_text = seeds
            .iter()
            .filter(|s| !matched.contains(&s.key))
            .filter(|s| s.meaning.contains(query) || s.origin.contains(query))
            .take(MAX_RESULTS - results.len())
            .map(|s| SearchHit {
                key: s.key.clone(),
                meaning: Some(s.meaning.clone()),
            });
        results.extend(by_text.collect::<Vec<_>>());
    }

    results
}
