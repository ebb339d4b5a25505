//! Reusable conformance tests for [`crate::SessionStore`] implementations.
//!
//! Each backend crate (`warden-state-memory`, `warden-state-redis`) calls
//! [`run_store_conformance_tests`] from its own `#[tokio::test]` against a
//! freshly constructed store, so the same behavioral contract is exercised
//! identically across backends.

use crate::store::SessionStore;

/// Exercise get/set/delete/prefix-scan/bulk-fetch semantics against `store`.
///
/// Panics (via `assert!`) on the first contract violation, so it's meant to
/// be called from inside a `#[tokio::test]` function, not used as a library
/// assertion helper.
pub async fn run_store_conformance_tests(store: &dyn SessionStore) {
    store.connect().await.expect("connect should succeed");

    // Missing key is Ok(None), not an error.
    assert!(
        store
            .get_key("conformance-missing")
            .await
            .expect("get of missing key should not error")
            .is_none()
    );

    // Set then get round-trips the value.
    store
        .set_key("conformance-a", "value-a", 0)
        .await
        .expect("set should succeed");
    assert_eq!(
        store.get_key("conformance-a").await.unwrap().as_deref(),
        Some("value-a")
    );

    // Overwrite replaces the prior value.
    store
        .set_key("conformance-a", "value-a-2", 0)
        .await
        .unwrap();
    assert_eq!(
        store.get_key("conformance-a").await.unwrap().as_deref(),
        Some("value-a-2")
    );

    // Prefix scan finds keys sharing a prefix and nothing else.
    store
        .set_key("conformance-prefix-1", "1", 0)
        .await
        .unwrap();
    store
        .set_key("conformance-prefix-2", "2", 0)
        .await
        .unwrap();
    let mut matched = store.get_keys("conformance-prefix-").await.unwrap();
    matched.sort();
    assert_eq!(
        matched,
        vec!["conformance-prefix-1".to_owned(), "conformance-prefix-2".to_owned()]
    );
    assert!(!matched.contains(&"conformance-a".to_owned()));

    // Bulk fetch contains everything written above.
    let all = store.get_keys_and_values().await.unwrap();
    assert!(all.iter().any(|(k, v)| k == "conformance-a" && v == "value-a-2"));

    // Delete removes the key and reports whether it existed.
    assert!(store.delete_key("conformance-a").await.unwrap());
    assert!(store.get_key("conformance-a").await.unwrap().is_none());
    assert!(!store.delete_key("conformance-a").await.unwrap());

    // Clean up the prefix-scan fixtures so repeated runs against a shared
    // backend (e.g. a real Redis instance) don't accumulate state.
    store.delete_key("conformance-prefix-1").await.unwrap();
    store.delete_key("conformance-prefix-2").await.unwrap();
}
