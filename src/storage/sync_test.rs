// Tests for StorageSync
// Test cases:
// - Merge precedence by timestamp through load_all, both directions
// - Remote failure degrades to local; local is caught up after merges
// - save writes value/label/timestamp to both tiers; remote failure tolerated
// - Validation rejects bad tokens before anything is written
// - remove deletes all three keys from both tiers
// - Export → import into an empty store reproduces tokens and labels
// - Imported labels only land next to a shortcut that exists
// - save trims the token
// - Every write publishes a change notification

use super::*;
use crate::storage::memory::MemoryTier;
use serde_json::json;

fn raw(value: serde_json::Value) -> RawSnapshot {
    serde_json::from_value(value).unwrap()
}

fn tiers() -> (Arc<MemoryTier>, Arc<MemoryTier>) {
    (
        Arc::new(MemoryTier::new("local")),
        Arc::new(MemoryTier::new("remote")),
    )
}

fn dual(local: &Arc<MemoryTier>, remote: &Arc<MemoryTier>) -> StorageSync {
    StorageSync::new(local.clone()).with_remote(remote.clone())
}

#[tokio::test]
async fn test_load_all_remote_newer_wins() {
    let local = Arc::new(MemoryTier::with_data(
        "local",
        raw(json!({ "K": "local value", "__meta__K": 100 })),
    ));
    let remote = Arc::new(MemoryTier::with_data(
        "remote",
        raw(json!({ "K": "remote value", "__label__K": "from remote", "__meta__K": 200 })),
    ));
    let sync = dual(&local, &remote);

    let merged = sync.load_all().await;
    let record = merged.get("K").unwrap();
    assert_eq!(record.value, "remote value");
    assert_eq!(record.updated_at, 200);

    // Local tier caught up, remote left alone
    let local_now = local.snapshot();
    assert_eq!(local_now.get("K"), Some(&json!("remote value")));
    assert_eq!(local_now.get("__label__K"), Some(&json!("from remote")));
    assert_eq!(local_now.get("__meta__K"), Some(&json!(200)));
    assert_eq!(remote.write_count(), 0);
}

#[tokio::test]
async fn test_load_all_local_newer_wins() {
    let local = Arc::new(MemoryTier::with_data(
        "local",
        raw(json!({ "K": "local value", "__meta__K": 200 })),
    ));
    let remote = Arc::new(MemoryTier::with_data(
        "remote",
        raw(json!({ "K": "remote value", "__meta__K": 100 })),
    ));
    let sync = dual(&local, &remote);

    let merged = sync.load_all().await;
    assert_eq!(merged.get("K").unwrap().value, "local value");
    assert_eq!(merged.get("K").unwrap().updated_at, 200);
    // Nothing to catch up locally
    assert_eq!(local.write_count(), 0);
    // Remote is not pushed to by default
    assert_eq!(remote.snapshot().get("K"), Some(&json!("remote value")));
}

#[tokio::test]
async fn test_push_merged_to_remote_option() {
    let local = Arc::new(MemoryTier::with_data(
        "local",
        raw(json!({ "K": "local value", "__meta__K": 200 })),
    ));
    let remote = Arc::new(MemoryTier::with_data(
        "remote",
        raw(json!({ "K": "remote value", "__meta__K": 100 })),
    ));
    let sync = dual(&local, &remote).with_options(SyncOptions {
        sync_enabled: true,
        push_merged_to_remote: true,
    });

    sync.load_all().await;
    assert_eq!(remote.snapshot().get("K"), Some(&json!("local value")));
    assert_eq!(remote.snapshot().get("__meta__K"), Some(&json!(200)));
}

#[tokio::test]
async fn test_merge_removes_stale_local_label() {
    let local = Arc::new(MemoryTier::with_data(
        "local",
        raw(json!({ "K": "old", "__label__K": "old label", "__meta__K": 1 })),
    ));
    let remote = Arc::new(MemoryTier::with_data(
        "remote",
        raw(json!({ "K": "new", "__meta__K": 2 })),
    ));
    let sync = dual(&local, &remote);

    sync.load_all().await;
    assert!(local.snapshot().get("__label__K").is_none());
}

#[tokio::test]
async fn test_remote_unavailable_uses_local() {
    let local = Arc::new(MemoryTier::with_data(
        "local",
        raw(json!({ "brb": "be right back", "__meta__brb": 5 })),
    ));
    let remote = Arc::new(MemoryTier::with_data(
        "remote",
        raw(json!({ "other": "value", "__meta__other": 9 })),
    ));
    remote.set_available(false);
    let sync = dual(&local, &remote);

    let merged = sync.load_all().await;
    assert_eq!(merged.len(), 1);
    assert!(merged.get("brb").is_some());
    assert_eq!(local.write_count(), 0);
}

#[tokio::test]
async fn test_local_unavailable_still_reads_remote() {
    let (local, remote) = tiers();
    remote
        .set(raw(json!({ "r": "remote only", "__meta__r": 3 })))
        .await
        .unwrap();
    local.set_available(false);
    let sync = dual(&local, &remote);

    let merged = sync.load_all().await;
    assert_eq!(merged.get("r").unwrap().value, "remote only");
}

#[tokio::test]
async fn test_sync_disabled_ignores_remote() {
    let (local, remote) = tiers();
    remote
        .set(raw(json!({ "r": "remote only", "__meta__r": 3 })))
        .await
        .unwrap();
    let sync = dual(&local, &remote).with_options(SyncOptions {
        sync_enabled: false,
        push_merged_to_remote: false,
    });

    assert!(sync.load_all().await.is_empty());
    sync.save("l", "local", None).await.unwrap();
    assert!(remote.snapshot().get("l").is_none());
}

#[tokio::test]
async fn test_save_writes_three_keys_to_both_tiers() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);

    let entry = sync
        .save("brb", "be right back", Some("away"))
        .await
        .unwrap();
    assert!(entry.updated_at > 0);

    for tier in [&local, &remote] {
        let snapshot = tier.snapshot();
        assert_eq!(snapshot.get("brb"), Some(&json!("be right back")));
        assert_eq!(snapshot.get("__label__brb"), Some(&json!("away")));
        assert_eq!(snapshot.get("__meta__brb"), Some(&json!(entry.updated_at)));
    }
}

#[tokio::test]
async fn test_save_trims_token() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);

    let entry = sync.save(" brb\t", "be right back", Some("away")).await.unwrap();
    assert_eq!(entry.token, "brb");

    let snapshot = local.snapshot();
    assert_eq!(snapshot.get("brb"), Some(&json!("be right back")));
    assert_eq!(snapshot.get("__label__brb"), Some(&json!("away")));
    assert!(snapshot.keys().all(|k| !k.contains(' ')));
}

#[tokio::test]
async fn test_save_without_label_keeps_existing_label() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);

    sync.save("brb", "v1", Some("away")).await.unwrap();
    sync.save("brb", "v2", None).await.unwrap();

    let merged = sync.load_all().await;
    let record = merged.get("brb").unwrap();
    assert_eq!(record.value, "v2");
    assert_eq!(record.label.as_deref(), Some("away"));
}

#[tokio::test]
async fn test_save_timestamps_strictly_increase() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);

    let first = sync.save("a", "1", None).await.unwrap();
    let second = sync.save("a", "2", None).await.unwrap();
    assert!(second.updated_at > first.updated_at);
}

#[tokio::test]
async fn test_save_tolerates_remote_failure() {
    let (local, remote) = tiers();
    remote.set_available(false);
    let sync = dual(&local, &remote);

    sync.save("brb", "be right back", None).await.unwrap();
    assert_eq!(local.snapshot().get("brb"), Some(&json!("be right back")));
}

#[tokio::test]
async fn test_save_fails_when_local_fails() {
    let (local, remote) = tiers();
    local.set_available(false);
    let sync = dual(&local, &remote);

    let result = sync.save("brb", "be right back", None).await;
    assert!(matches!(result, Err(StorageError::Local(_))));
    // Remote is not written when the durable write failed
    assert!(remote.snapshot().is_empty());
}

#[tokio::test]
async fn test_save_rejects_invalid_tokens() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);

    let too_long = "x".repeat(51);
    for token in ["", "__secret", too_long.as_str()] {
        let result = sync.save(token, "value", None).await;
        assert!(matches!(result, Err(StorageError::Validation(_))), "token={:?}", token);
    }
    assert_eq!(local.write_count(), 0);
    assert_eq!(remote.write_count(), 0);
}

#[tokio::test]
async fn test_remove_deletes_all_keys_everywhere() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);
    sync.save("brb", "be right back", Some("away")).await.unwrap();
    sync.save("sig", "Regards", None).await.unwrap();

    sync.remove("brb").await.unwrap();

    for tier in [&local, &remote] {
        let snapshot = tier.snapshot();
        assert!(snapshot.get("brb").is_none());
        assert!(snapshot.get("__label__brb").is_none());
        assert!(snapshot.get("__meta__brb").is_none());
        assert!(snapshot.get("sig").is_some());
    }
}

#[tokio::test]
async fn test_remove_tolerates_remote_failure() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);
    sync.save("brb", "be right back", None).await.unwrap();
    remote.set_available(false);

    sync.remove("brb").await.unwrap();
    assert!(local.snapshot().is_empty());
}

#[tokio::test]
async fn test_import_stamps_and_passes_labels_through() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);

    let bulk = json!({
        "brb": "be right back",
        "__label__brb": "away",
        "__meta__brb": 1,
        "__bad": "reserved",
        "num": 5
    });
    let report = sync
        .import_data(bulk.as_object().unwrap())
        .await
        .unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped.len(), 2);

    let snapshot = local.snapshot();
    assert_eq!(snapshot.get("__label__brb"), Some(&json!("away")));
    let stamp = snapshot.get("__meta__brb").and_then(|v| v.as_i64()).unwrap();
    assert!(stamp > 1, "imported keys get a fresh timestamp");
    assert!(snapshot.get("__bad").is_none());
    assert_eq!(remote.snapshot().get("brb"), Some(&json!("be right back")));
}

#[tokio::test]
async fn test_export_then_import_round_trip() {
    let (local, remote) = tiers();
    let source = dual(&local, &remote);
    source.save("brb", "be right back", Some("away")).await.unwrap();
    source.save("sig", "Regards,\n{date}", None).await.unwrap();

    let exported = source.export_data().await;
    assert!(exported.keys().all(|k| !k.starts_with("__meta__")));
    assert_eq!(exported.get("__label__brb"), Some(&json!("away")));

    let target = StorageSync::new(Arc::new(MemoryTier::new("fresh")));
    let report = target.import_data(&exported).await.unwrap();
    assert_eq!(report.imported, 2);

    let before: Vec<(String, String, Option<String>)> = source
        .entries()
        .await
        .into_iter()
        .map(|e| (e.token, e.replacement, e.label))
        .collect();
    let after: Vec<(String, String, Option<String>)> = target
        .entries()
        .await
        .into_iter()
        .map(|e| (e.token, e.replacement, e.label))
        .collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_import_drops_labels_without_a_shortcut() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);
    let mut changes = sync.subscribe();
    let too_long = "x".repeat(51);

    let mut bulk = serde_json::Map::new();
    bulk.insert(too_long.clone(), json!("long"));
    bulk.insert(format!("__label__{}", too_long), json!("long label"));
    bulk.insert("__label__ghost".to_string(), json!("nobody"));

    let report = sync.import_data(&bulk).await.unwrap();

    assert_eq!(report.imported, 0);
    assert_eq!(report.skipped.len(), 3);
    assert!(local.snapshot().is_empty());
    assert!(remote.snapshot().is_empty());
    assert!(changes.try_recv().is_err());
}

#[tokio::test]
async fn test_import_label_for_existing_shortcut() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);
    sync.save("brb", "be right back", None).await.unwrap();

    let bulk = json!({ "__label__brb": "away", "__label__sig": 7 });
    let report = sync.import_data(bulk.as_object().unwrap()).await.unwrap();

    assert_eq!(report.imported, 0);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].key, "__label__sig");
    let merged = sync.load_all().await;
    assert_eq!(merged.get("brb").unwrap().label.as_deref(), Some("away"));
}

#[tokio::test]
async fn test_import_of_nothing_writes_nothing() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);

    let bulk = json!({ "__meta__x": 3 });
    let report = sync.import_data(bulk.as_object().unwrap()).await.unwrap();
    assert_eq!(report, ImportReport::default());
    assert_eq!(local.write_count(), 0);
}

#[tokio::test]
async fn test_clear_empties_both_tiers() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);
    sync.save("a", "A", None).await.unwrap();

    sync.clear().await.unwrap();
    assert!(local.snapshot().is_empty());
    assert!(remote.snapshot().is_empty());
}

#[tokio::test]
async fn test_writes_publish_change_notifications() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);
    let mut changes = sync.subscribe();

    sync.save("a", "A", None).await.unwrap();
    sync.remove("a").await.unwrap();
    sync.notify_external_change();

    for _ in 0..3 {
        assert_eq!(changes.try_recv().unwrap(), DictionaryChanged);
    }
    assert!(changes.try_recv().is_err());
}

#[tokio::test]
async fn test_load_all_does_not_publish() {
    let local = Arc::new(MemoryTier::with_data(
        "local",
        raw(json!({ "K": "v", "__meta__K": 1 })),
    ));
    let remote = Arc::new(MemoryTier::with_data(
        "remote",
        raw(json!({ "K": "w", "__meta__K": 2 })),
    ));
    let sync = dual(&local, &remote);
    let mut changes = sync.subscribe();

    sync.load_all().await;
    assert!(changes.try_recv().is_err());
}

#[tokio::test]
async fn test_build_index_from_merged_dictionary() {
    let (local, remote) = tiers();
    let sync = dual(&local, &remote);
    sync.save("brb", "be right back", None).await.unwrap();
    remote
        .set(raw(json!({ "omw": "on my way", "__meta__omw": 1 })))
        .await
        .unwrap();

    let index = sync.build_index().await;
    assert_eq!(index.get("brb"), Some("be right back"));
    assert_eq!(index.get("omw"), Some("on my way"));
}
