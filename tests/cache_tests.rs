#![allow(clippy::unwrap_used)]

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::MockSheets;
use laundry_slot_bot::booking::TableCache;

fn cache(sheets: &Arc<MockSheets>, ttl: Duration) -> TableCache {
    TableCache::new(sheets.clone(), "Sheet1", ttl)
}

#[tokio::test]
async fn serves_snapshot_from_cache_within_ttl() {
    let sheets = Arc::new(MockSheets::with_cells(&[("B2", "Anna 20.05")]));
    let cache = cache(&sheets, Duration::from_secs(60));

    let first = cache.get(false).await;
    let second = cache.get(false).await;

    assert_eq!(sheets.reads(), 1);
    assert_eq!(first.cell(1, 1), Some("Anna 20.05"));
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn force_refresh_bypasses_ttl() {
    let sheets = Arc::new(MockSheets::new());
    let cache = cache(&sheets, Duration::from_secs(60));

    cache.get(false).await;
    sheets.set_cell("B2", "Anna 20.05");
    let refreshed = cache.get(true).await;

    assert_eq!(sheets.reads(), 2);
    assert_eq!(refreshed.cell(1, 1), Some("Anna 20.05"));
}

#[tokio::test]
async fn expired_ttl_triggers_refetch() {
    let sheets = Arc::new(MockSheets::new());
    let cache = cache(&sheets, Duration::from_millis(20));

    cache.get(false).await;
    tokio::time::sleep(Duration::from_millis(40)).await;
    cache.get(false).await;

    assert_eq!(sheets.reads(), 2);
}

#[tokio::test]
async fn invalidate_clears_cached_snapshot() {
    let sheets = Arc::new(MockSheets::new());
    let cache = cache(&sheets, Duration::from_secs(60));

    cache.get(false).await;
    cache.invalidate().await;
    assert_eq!(cache.age().await, None);

    cache.get(false).await;
    assert_eq!(sheets.reads(), 2);
}

#[tokio::test]
async fn failed_refresh_degrades_to_stale_snapshot() {
    let sheets = Arc::new(MockSheets::with_cells(&[("B2", "Anna 20.05")]));
    let cache = cache(&sheets, Duration::from_millis(20));

    let fresh = cache.get(false).await;
    assert_eq!(fresh.cell(1, 1), Some("Anna 20.05"));

    sheets.fail_reads.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(40)).await;

    let stale = cache.get(false).await;
    assert_eq!(stale.cell(1, 1), Some("Anna 20.05"));
}

#[tokio::test]
async fn failed_refresh_with_no_prior_snapshot_yields_empty() {
    let sheets = Arc::new(MockSheets::new());
    sheets.fail_reads.store(true, Ordering::SeqCst);
    let cache = cache(&sheets, Duration::from_secs(60));

    let snapshot = cache.get(false).await;
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn concurrent_cold_reads_collapse_into_one_fetch() {
    let sheets = Arc::new(MockSheets::new());
    sheets.set_read_delay(Duration::from_millis(50));
    let cache = Arc::new(cache(&sheets, Duration::from_secs(60)));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        tasks.push(tokio::spawn(async move { cache.get(false).await }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(sheets.reads(), 1);
}

#[tokio::test]
async fn age_grows_after_fetch() {
    let sheets = Arc::new(MockSheets::new());
    let cache = cache(&sheets, Duration::from_secs(60));

    assert_eq!(cache.age().await, None);
    cache.get(false).await;
    assert!(cache.age().await.is_some());
}

#[tokio::test]
async fn fetch_time_follows_snapshot_lifecycle() {
    let sheets = Arc::new(MockSheets::new());
    let cache = cache(&sheets, Duration::from_secs(60));

    assert_eq!(cache.fetched_at().await, None);

    let snapshot = cache.get(false).await;
    let fetched_at = cache.fetched_at().await;
    assert_eq!(fetched_at, snapshot.fetched_at);
    assert!(fetched_at.is_some());

    cache.invalidate().await;
    assert_eq!(cache.fetched_at().await, None);
}
