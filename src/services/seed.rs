use std::collections::HashMap;

use crate::error::CatalogError;
use crate::models::idiom::Idiom;

static BUNDLED_SEEDS: &str = include_str!("../../data/seed_idioms.json");

/// 随程序发布的只读种子数据，零网络兜底，也是持久层的初始数据
#[derive(Debug, Clone, Default)]
pub struct SeedBundle {
    entries: Vec<Idiom>,
    index: HashMap<String, usize>,
}

impl SeedBundle {
    pub fn new(entries: Vec<Idiom>) -> Self {
        let mut bundle = Self::default();
        for idiom in entries {
            if idiom.key.trim().is_empty() || bundle.index.contains_key(&idiom.key) {
                continue;
            }
            bundle.index.insert(idiom.key.clone(), bundle.entries.len());
            bundle.entries.push(idiom);
        }
        bundle
    }

    pub fn bundled() -> Result<Self, CatalogError> {
        let entries: Vec<Idiom> = serde_json::from_str(BUNDLED_SEEDS)?;
        Ok(Self::new(entries))
    }

    pub fn get(&self, key: &str) -> Option<&Idiom> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Idiom> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
