mod common;

use common::{complete, failing_sources, Harness, StubSource};

use chengyu_daily::models::idiom::{Idiom, PLACEHOLDER_MEANING};
use chengyu_daily::services::cache::IdiomStore;

const CATALOG: [&str; 2] = ["温故知新", "举一反三"];

#[tokio::test]
async fn complete_seed_is_served_without_network() {
    let seed = complete("温故知新");
    let h = Harness::new(&CATALOG, vec![seed.clone()], failing_sources());

    let first = h.resolver.resolve("温故知新").await;
    assert_eq!(first, seed);
    assert_eq!(h.total_calls(), 0);

    // 种子命中后写入两级缓存
    h.flush().await;
    assert_eq!(h.store.get("温故知新").await.unwrap(), Some(seed.clone()));
    assert_eq!(h.cache.memory_get("温故知新").await, Some(seed.clone()));

    let again = h.resolver.resolve("温故知新").await;
    assert_eq!(again, seed);
    assert_eq!(h.total_calls(), 0);
}

#[tokio::test]
async fn total_failure_returns_uncached_placeholder() {
    let h = Harness::new(&CATALOG, vec![complete("温故知新")], failing_sources());

    let result = h.resolver.resolve("举一反三").await;
    assert_eq!(result.key, "举一反三");
    assert_eq!(result.meaning, PLACEHOLDER_MEANING);
    assert!(result.pronunciation.is_empty());
    assert!(result.origin.is_empty());
    assert!(result.examples.is_empty());
    assert_eq!(h.total_calls(), 7);

    h.flush().await;
    assert_eq!(h.store.get("举一反三").await.unwrap(), None);
    assert_eq!(h.cache.memory_get("举一反三").await, None);
    assert_eq!(h.store.upsert_count(), 0);

    // 下一次仍然走网络
    h.resolver.resolve("举一反三").await;
    assert_eq!(h.total_calls(), 14);
}

#[tokio::test]
async fn complete_persistent_record_skips_extractors() {
    let sources = vec![StubSource::returning("only", complete("举一反三"))];
    let h = Harness::new(&CATALOG, Vec::new(), sources);
    let stored = Idiom {
        meaning: "比喻从一件事情类推而知道其他许多事情。".into(),
        ..complete("举一反三")
    };
    h.store.upsert(&stored).await.unwrap();

    assert_eq!(h.resolver.resolve("举一反三").await, stored);
    assert_eq!(h.total_calls(), 0);
    assert_eq!(h.cache.memory_get("举一反三").await, Some(stored));
}

#[tokio::test]
async fn incomplete_seed_is_merged_with_sources() {
    let seed = Idiom {
        meaning: "比喻从一件事情类推而知道其他许多事情。".into(),
        ..Idiom::new("举一反三")
    };
    let scraped = Idiom {
        pronunciation: "jǔ yī fǎn sān".into(),
        meaning: "举出一个".into(),
        origin: "《论语·述而》：举一隅不以三隅反，则不复也。".into(),
        examples: vec!["学习要举一反三。".into(), "他很会举一反三。".into()],
        synonyms: vec!["闻一知十".into()],
        ..Idiom::default()
    };
    let sources = vec![
        StubSource::failing("down"),
        StubSource::returning("up", scraped),
    ];
    let h = Harness::new(&CATALOG, vec![seed.clone()], sources);

    let merged = h.resolver.resolve("举一反三").await;
    assert!(merged.is_complete());
    assert_eq!(merged.meaning, seed.meaning);
    assert_eq!(merged.pronunciation, "jǔ yī fǎn sān");
    assert_eq!(merged.synonyms, vec!["闻一知十".to_string()]);

    h.flush().await;
    assert_eq!(h.store.get("举一反三").await.unwrap(), Some(merged.clone()));

    // 完整记录已经在缓存里
    let calls = h.total_calls();
    assert_eq!(h.resolver.resolve("举一反三").await, merged);
    assert_eq!(h.total_calls(), calls);
}

#[tokio::test]
async fn incomplete_seed_survives_source_outage() {
    let seed = Idiom {
        pronunciation: "jǔ yī fǎn sān".into(),
        meaning: "比喻从一件事情类推而知道其他许多事情。".into(),
        ..Idiom::new("举一反三")
    };
    let h = Harness::new(&CATALOG, vec![seed.clone()], failing_sources());

    let result = h.resolver.resolve("举一反三").await;
    assert_eq!(result.meaning, seed.meaning);
    assert_eq!(result.pronunciation, seed.pronunciation);
    assert!(!result.is_placeholder());
}

#[tokio::test]
async fn earlier_incomplete_record_is_not_lost() {
    let sources = vec![StubSource::returning(
        "partial",
        Idiom {
            meaning: "短释义".into(),
            ..Idiom::default()
        },
    )];
    let h = Harness::new(&CATALOG, Vec::new(), sources);
    let stored = Idiom {
        pronunciation: "jǔ yī fǎn sān".into(),
        meaning: "比喻从一件事情类推而知道其他许多事情。".into(),
        origin: "《论语·述而》".into(),
        ..Idiom::new("举一反三")
    };
    h.store.upsert(&stored).await.unwrap();

    let result = h.resolver.resolve("举一反三").await;
    assert_eq!(h.total_calls(), 1);
    assert_eq!(result.meaning, stored.meaning);
    assert_eq!(result.origin, stored.origin);
}

#[tokio::test]
async fn unavailable_store_still_resolves() {
    let sources = vec![StubSource::returning("up", complete("举一反三"))];
    let h = Harness::new(&CATALOG, vec![complete("温故知新")], sources);
    h.store.set_available(false);

    assert_eq!(h.resolver.resolve("温故知新").await, complete("温故知新"));
    assert_eq!(h.total_calls(), 0);

    let scraped = h.resolver.resolve("举一反三").await;
    assert!(scraped.is_complete());
    h.flush().await;
    assert_eq!(h.cache.memory_get("举一反三").await, Some(scraped));
}
