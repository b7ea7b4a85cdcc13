//! End-to-end cache-aside behavior against the in-memory store.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::debugging::DebuggingRecorder;
use serde::{Deserialize, Serialize};
use sidecache::entities::{CurrencyFilter, QueryFilter, derive_all_key, derive_list_key};
use sidecache::error::StoreError;
use sidecache::{
    CacheEngine, EngineConfig, InMemoryStore, KeyValueStore, PageRequest, PagedResponse,
    SortDirection,
};

const TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CurrencyRow {
    id: i64,
    name: String,
    alphabetic_code: String,
}

fn sample_rows() -> Vec<CurrencyRow> {
    vec![
        CurrencyRow {
            id: 1,
            name: "US Dollar".to_string(),
            alphabetic_code: "USD".to_string(),
        },
        CurrencyRow {
            id: 2,
            name: "Euro".to_string(),
            alphabetic_code: "EUR".to_string(),
        },
    ]
}

fn currency_engine(store: Arc<InMemoryStore>) -> CacheEngine<CurrencyRow> {
    CacheEngine::new(store, EngineConfig::for_keys(CurrencyFilter::entity_keys()))
}

fn list_key() -> String {
    let page = PageRequest::new(0, 10, "name", SortDirection::Ascending);
    let filter = CurrencyFilter {
        status: Some("1".to_string()),
        ..Default::default()
    };
    derive_list_key(&page, &filter)
}

#[tokio::test]
async fn get_on_empty_store_is_a_miss() {
    let store = Arc::new(InMemoryStore::new());
    let engine = currency_engine(store);

    assert!(engine.get_page(&list_key()).await.is_none());
}

#[tokio::test]
async fn put_then_get_round_trips_unchanged() {
    let store = Arc::new(InMemoryStore::new());
    let engine = currency_engine(store);
    let key = list_key();

    let page = PagedResponse::of(sample_rows(), 1, 10, 2);
    engine.put_page(&key, &page, TTL).await;

    let cached = engine.get_page(&key).await.expect("cache hit");
    assert_eq!(cached, page);
}

#[tokio::test]
async fn all_scope_round_trips_unchanged() {
    let store = Arc::new(InMemoryStore::new());
    let engine = currency_engine(store);
    let key = derive_all_key(&CurrencyFilter::default());

    engine.put_all(&key, &sample_rows(), TTL).await;

    let cached = engine.get_all(&key).await.expect("cache hit");
    assert_eq!(cached, sample_rows());
}

#[tokio::test]
async fn corrupt_entry_self_heals_to_a_miss() {
    let store = Arc::new(InMemoryStore::new());
    let engine = currency_engine(store.clone());
    let key = list_key();

    store.seed_raw(&key, "{not valid json");

    assert!(engine.get_page(&key).await.is_none());
    // The corrupt entry must be gone, not just skipped.
    assert_eq!(store.get(&key).await.expect("store get"), None);
}

#[tokio::test]
async fn entries_expire_via_store_ttl() {
    let store = Arc::new(InMemoryStore::new());
    let engine = currency_engine(store);
    let key = list_key();

    let page = PagedResponse::of(sample_rows(), 1, 10, 2);
    engine.put_page(&key, &page, Duration::from_millis(10)).await;

    tokio::time::sleep(Duration::from_millis(30)).await;

    assert!(engine.get_page(&key).await.is_none());
}

#[tokio::test]
async fn invalidate_all_clears_both_scopes_and_spares_neighbors() {
    let store = Arc::new(InMemoryStore::new());
    let engine = currency_engine(store.clone());

    let page = PagedResponse::of(sample_rows(), 1, 10, 2);
    let first_page = PageRequest::new(0, 10, "name", SortDirection::Ascending);
    let second_page = PageRequest::new(1, 10, "name", SortDirection::Ascending);
    let filter = CurrencyFilter::default();

    engine.put_page(&derive_list_key(&first_page, &filter), &page, TTL).await;
    engine.put_page(&derive_list_key(&second_page, &filter), &page, TTL).await;
    engine.put_all(&derive_all_key(&filter), &sample_rows(), TTL).await;
    store.seed_raw("country:list:unrelated", "[]");

    engine.invalidate_all().await;

    assert!(store.keys("currency:*").await.expect("keys").is_empty());
    assert_eq!(
        store.get("country:list:unrelated").await.expect("get").as_deref(),
        Some("[]")
    );
}

#[tokio::test]
async fn invalidate_all_on_empty_namespace_is_a_noop() {
    let store = Arc::new(InMemoryStore::new());
    let engine = currency_engine(store);

    // Nothing seeded; must complete without error.
    engine.invalidate_all().await;
}

#[tokio::test]
async fn invalidate_drops_a_single_entry() {
    let store = Arc::new(InMemoryStore::new());
    let engine = currency_engine(store.clone());
    let key = list_key();

    let page = PagedResponse::of(sample_rows(), 1, 10, 2);
    engine.put_page(&key, &page, TTL).await;
    engine.invalidate(&key).await;

    assert!(engine.get_page(&key).await.is_none());
}

#[tokio::test]
async fn disabled_engine_is_a_permanent_miss() {
    let store = Arc::new(InMemoryStore::new());
    let config = EngineConfig::for_keys(CurrencyFilter::entity_keys()).enabled(false);
    let engine: CacheEngine<CurrencyRow> = CacheEngine::new(store.clone(), config);
    let key = list_key();

    let page = PagedResponse::of(sample_rows(), 1, 10, 2);
    engine.put_page(&key, &page, TTL).await;

    assert!(engine.get_page(&key).await.is_none());
    assert!(store.is_empty());
}

/// Store double simulating a total outage.
struct UnreachableStore;

#[async_trait]
impl KeyValueStore for UnreachableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn del(&self, _key: &str) -> Result<u64, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn keys(&self, _pattern: &str) -> Result<Vec<String>, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn del_many(&self, _keys: &[String]) -> Result<u64, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }
}

#[tokio::test]
async fn unreachable_store_degrades_every_operation() {
    let engine: CacheEngine<CurrencyRow> = CacheEngine::new(
        Arc::new(UnreachableStore),
        EngineConfig::for_keys(CurrencyFilter::entity_keys()),
    );
    let key = list_key();

    // None of these may raise; the read reports a miss.
    assert!(engine.get_page(&key).await.is_none());
    engine
        .put_page(&key, &PagedResponse::of(sample_rows(), 1, 10, 2), TTL)
        .await;
    engine.invalidate(&key).await;
    engine.invalidate_all().await;
}

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let store = Arc::new(InMemoryStore::new());
    let engine = currency_engine(store.clone());
    let key = list_key();

    // miss, hit, self-heal, bulk invalidation
    assert!(engine.get_page(&key).await.is_none());
    engine
        .put_page(&key, &PagedResponse::of(sample_rows(), 1, 10, 2), TTL)
        .await;
    assert!(engine.get_page(&key).await.is_some());
    store.seed_raw(&key, "garbage");
    assert!(engine.get_page(&key).await.is_none());
    engine
        .put_page(&key, &PagedResponse::of(sample_rows(), 1, 10, 2), TTL)
        .await;
    engine.invalidate_all().await;

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for expected in [
        "sidecache_hit_total",
        "sidecache_miss_total",
        "sidecache_self_heal_total",
        "sidecache_invalidated_total",
    ] {
        assert!(names.contains(expected), "missing metric key {expected}");
    }
}
