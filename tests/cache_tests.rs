//! Cache store contract tests: key independence, expiry semantics, and
//! upsert atomicity.

use vendry::db::Store;
use vendry::models::query::{CacheKey, SearchQuery};
use vendry::models::vendor::{VendorRecord, VendorSource};

async fn temp_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("vendry-cache-test-{}.db", uuid::Uuid::new_v4()));
    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open test store")
}

fn key(subcategory: Option<&str>) -> CacheKey {
    SearchQuery {
        category: "photographers".into(),
        city: "Dallas".into(),
        state: "Texas".into(),
        subcategory: subcategory.map(String::from),
    }
    .cache_key()
}

fn record(name: &str) -> VendorRecord {
    VendorRecord {
        name: name.to_string(),
        category: "photographers".into(),
        subcategory: None,
        description: None,
        address: Some(format!("{name} street")),
        city: "Dallas".into(),
        state: "Texas".into(),
        phone: None,
        email: None,
        website: None,
        instagram_handle: None,
        rating: None,
        place_id: Some(format!("place-{name}")),
        rank: 1,
        source: VendorSource::Provider,
    }
}

#[tokio::test]
async fn put_then_get_round_trips() {
    let store = temp_store().await;
    let key = key(None);
    let records = vec![record("alpha"), record("beta")];

    store
        .cache_search_results(&key, &records, 2840, Some(0.002), 3600)
        .await
        .unwrap();

    let cached = store.get_cached_search(&key).await.unwrap().unwrap();
    assert_eq!(cached.location_code, 2840);
    assert_eq!(cached.cost, Some(0.002));

    let names: Vec<_> = cached.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["alpha", "beta"]);
    assert!(cached
        .records
        .iter()
        .all(|r| r.source == VendorSource::Provider));
}

#[tokio::test]
async fn expired_entry_reads_as_absent_but_not_deleted() {
    let store = temp_store().await;
    let key = key(None);

    store
        .cache_search_results(&key, &[record("old")], 2840, None, -60)
        .await
        .unwrap();

    assert!(store.get_cached_search(&key).await.unwrap().is_none());

    // The row is still there for auditing and stale fallback.
    assert_eq!(store.cached_search_count().await.unwrap(), 1);
    let stale = store.get_stale_search(&key).await.unwrap().unwrap();
    assert_eq!(stale.records[0].name, "old");
}

#[tokio::test]
async fn subcategory_variants_are_independent_entries() {
    let store = temp_store().await;

    let none = key(None);
    let empty = key(Some(""));
    let wedding = key(Some("wedding"));
    let bridal = key(Some("bridal"));

    store
        .cache_search_results(&none, &[record("for-none")], 2840, None, 3600)
        .await
        .unwrap();
    store
        .cache_search_results(&empty, &[record("for-empty")], 2840, None, 3600)
        .await
        .unwrap();
    store
        .cache_search_results(&wedding, &[record("for-wedding")], 2840, None, 3600)
        .await
        .unwrap();
    store
        .cache_search_results(&bridal, &[record("for-bridal")], 2840, None, 3600)
        .await
        .unwrap();

    assert_eq!(store.cached_search_count().await.unwrap(), 4);

    // Overwriting one key touches nothing else.
    store
        .cache_search_results(&wedding, &[record("for-wedding-v2")], 2840, None, 3600)
        .await
        .unwrap();
    assert_eq!(store.cached_search_count().await.unwrap(), 4);

    let get_first_name = |cached: vendry::db::CachedSearch| cached.records[0].name.clone();

    assert_eq!(
        get_first_name(store.get_cached_search(&none).await.unwrap().unwrap()),
        "for-none"
    );
    assert_eq!(
        get_first_name(store.get_cached_search(&empty).await.unwrap().unwrap()),
        "for-empty"
    );
    assert_eq!(
        get_first_name(store.get_cached_search(&wedding).await.unwrap().unwrap()),
        "for-wedding-v2"
    );
    assert_eq!(
        get_first_name(store.get_cached_search(&bridal).await.unwrap().unwrap()),
        "for-bridal"
    );
}

#[tokio::test]
async fn subcategory_entries_expire_independently() {
    let store = temp_store().await;

    let plain = key(None);
    let wedding = key(Some("wedding"));

    store
        .cache_search_results(&plain, &[record("plain")], 2840, None, 3600)
        .await
        .unwrap();
    store
        .cache_search_results(&wedding, &[record("wedding")], 2840, None, 3600)
        .await
        .unwrap();
    assert_eq!(store.cached_search_count().await.unwrap(), 2);

    // Expire only the plain entry.
    store
        .cache_search_results(&plain, &[record("plain")], 2840, None, -60)
        .await
        .unwrap();

    assert!(store.get_cached_search(&plain).await.unwrap().is_none());
    assert!(store.get_cached_search(&wedding).await.unwrap().is_some());
    assert_eq!(store.cached_search_count().await.unwrap(), 2);
}

#[tokio::test]
async fn concurrent_puts_leave_exactly_one_row() {
    let store = temp_store().await;
    let key = key(None);

    let records_a = [record("writer-a")];
    let records_b = [record("writer-b")];
    let first = store.cache_search_results(&key, &records_a, 2840, None, 3600);
    let second = store.cache_search_results(&key, &records_b, 2840, None, 3600);

    let (a, b) = tokio::join!(first, second);
    a.unwrap();
    b.unwrap();

    assert_eq!(store.cached_search_count().await.unwrap(), 1);

    let cached = store.get_cached_search(&key).await.unwrap().unwrap();
    assert_eq!(cached.records.len(), 1);
    let name = cached.records[0].name.as_str();
    assert!(name == "writer-a" || name == "writer-b");
}

#[tokio::test]
async fn sweep_reports_only_expired_keys() {
    let store = temp_store().await;

    let expired = key(Some("expired"));
    let fresh = key(Some("fresh"));

    store
        .cache_search_results(&expired, &[record("a")], 1111, None, -60)
        .await
        .unwrap();
    store
        .cache_search_results(&fresh, &[record("b")], 2222, None, 3600)
        .await
        .unwrap();

    let swept = store.sweep_expired_searches().await.unwrap();
    assert_eq!(swept.len(), 1);
    assert_eq!(swept[0].key, expired);
    assert_eq!(swept[0].location_code, 1111);
    assert_eq!(swept[0].key.subcategory.as_deref(), Some("expired"));
}

#[tokio::test]
async fn equivalent_inputs_normalize_to_one_key() {
    let store = temp_store().await;

    let loud = SearchQuery {
        category: " Photographers ".into(),
        city: "DALLAS".into(),
        state: "Texas".into(),
        subcategory: Some(" Wedding ".into()),
    }
    .cache_key();

    let quiet = SearchQuery {
        category: "photographers".into(),
        city: "dallas".into(),
        state: "texas".into(),
        subcategory: Some("wedding".into()),
    }
    .cache_key();

    store
        .cache_search_results(&loud, &[record("one")], 2840, None, 3600)
        .await
        .unwrap();
    store
        .cache_search_results(&quiet, &[record("two")], 2840, None, 3600)
        .await
        .unwrap();

    assert_eq!(store.cached_search_count().await.unwrap(), 1);
}
