use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::error::CatalogError;

static BUNDLED_CATALOG: &str = include_str!("../../data/catalog.json");

/// 成语目录：固定顺序的全部成语，决定爬取范围和随机抽取范围
#[derive(Debug, Clone)]
pub struct Catalog {
    keys: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Catalog {
    /// 去掉空白项和重复项（保留首次出现的位置）
    pub fn new(keys: Vec<String>) -> Result<Self, CatalogError> {
        let mut ordered = Vec::with_capacity(keys.len());
        let mut positions = HashMap::with_capacity(keys.len());

        for key in keys {
            let key = key.trim().to_string();
            if key.is_empty() || positions.contains_key(&key) {
                continue;
            }
            positions.insert(key.clone(), ordered.len());
            ordered.push(key);
        }

        if ordered.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { keys: ordered, positions })
    }

    pub fn bundled() -> Result<Self, CatalogError> {
        let keys: Vec<String> = serde_json::from_str(BUNDLED_CATALOG)?;
        Self::new(keys)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// 越界时返回空切片
    pub fn slice(&self, offset: usize, batch: usize) -> &[String] {
        let start = offset.min(self.keys.len());
        let end = offset.saturating_add(batch).min(self.keys.len());
        &self.keys[start..end]
    }

    /// 年内第几天（1 月 1 日为 1）加上年份偏移，对目录长度取模。
    /// 每年偏移 7 位，避免每年同一天出现同一个成语。
    pub fn day_index(&self, date: NaiveDate) -> usize {
        let ordinal = i64::from(date.ordinal());
        let year_offset = i64::from(date.year()) * 7;
        (ordinal + year_offset).rem_euclid(self.keys.len() as i64) as usize
    }

    pub fn key_for_date(&self, date: NaiveDate) -> &str {
        &self.keys[self.day_index(date)]
    }

    /// 从 `from` 开始连续 `days` 天要展示的成语
    pub fn upcoming_keys(&self, from: NaiveDate, days: u32) -> HashSet<String> {
        (0..i64::from(days))
            .map(|offset| self.key_for_date(from + Duration::days(offset)).to_string())
            .collect()
    }

    pub fn random_key(&self) -> &str {
        let idx = rand::thread_rng().gen_range(0..self.keys.len());
        &self.keys[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(n: usize) -> Catalog {
        Catalog::new((0..n).map(|i| format!("成语{i}")).collect()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bundled_catalog_loads() {
        let catalog = Catalog::bundled().unwrap();
        assert!(catalog.len() > 100);
        assert!(catalog.contains("温故知新"));
    }

    #[test]
    fn rejects_empty_and_dedups() {
        assert!(matches!(Catalog::new(vec![" ".into()]), Err(CatalogError::Empty)));

        let c = Catalog::new(vec!["甲".into(), "乙".into(), "甲".into()]).unwrap();
        assert_eq!(c.keys(), &["甲".to_string(), "乙".to_string()]);
        assert_eq!(c.position("乙"), Some(1));
    }

    #[test]
    fn dates_one_cycle_apart_share_a_key() {
        let c = catalog(5);
        assert_eq!(c.key_for_date(date(2025, 3, 10)), c.key_for_date(date(2025, 3, 15)));
        assert_eq!(c.key_for_date(date(2025, 1, 1)), c.key_for_date(date(2025, 1, 6)));
    }

    #[test]
    fn consecutive_days_advance_by_one() {
        let c = catalog(7);
        let mut day = date(2025, 2, 20);
        for _ in 0..20 {
            let next = day + Duration::days(1);
            assert_eq!((c.day_index(day) + 1) % c.len(), c.day_index(next));
            day = next;
        }
    }

    #[test]
    fn first_day_of_year_includes_year_offset() {
        let c = catalog(1000);
        assert_eq!(c.day_index(date(2025, 1, 1)), (1 + 2025 * 7) % 1000);
    }

    #[test]
    fn upcoming_window_covers_distinct_days() {
        let c = catalog(100);
        let keys = c.upcoming_keys(date(2025, 6, 1), 30);
        assert_eq!(keys.len(), 30);

        let small = catalog(10);
        assert_eq!(small.upcoming_keys(date(2025, 6, 1), 30).len(), 10);
    }

    #[test]
    fn slice_clamps_to_bounds() {
        let c = catalog(4);
        assert_eq!(c.slice(2, 10).len(), 2);
        assert!(c.slice(9, 3).is_empty());
        assert!(c.slice(0, 0).is_empty());
    }
}
