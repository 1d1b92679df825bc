// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service credential caching across builds.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tb_adapters::{CredentialCache, ServiceCredential, REFRESH_SKEW};
use tb_core::{Clock, FakeClock};

const TTL: Duration = Duration::from_secs(3600);

async fn issue(cache: &CredentialCache<FakeClock>, calls: &AtomicUsize) -> ServiceCredential {
    cache
        .get_or_refresh(move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(ServiceCredential::issued(
                format!("s.token-{}", n),
                "tb".to_string(),
                cache.clock().now(),
                TTL,
            ))
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn credential_is_reused_until_it_nears_expiry() {
    let clock = FakeClock::new();
    let cache = CredentialCache::new(clock.clone());
    let calls = AtomicUsize::new(0);

    let first = issue(&cache, &calls).await;
    clock.advance(TTL - REFRESH_SKEW - Duration::from_secs(1));
    let second = issue(&cache, &calls).await;
    assert_eq!(first.token, second.token);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    clock.advance(Duration::from_secs(2));
    let third = issue(&cache, &calls).await;
    assert_eq!(third.token, "s.token-2");
    assert!(third.is_fresh(clock.now()));
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let clock = FakeClock::new();
    let cache = Arc::new(CredentialCache::new(clock.clone()));
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        let calls = Arc::clone(&calls);
        let clock = clock.clone();
        handles.push(tokio::spawn(async move {
            cache
                .get_or_refresh(move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok(ServiceCredential::issued(
                        "s.shared".to_string(),
                        "tb".to_string(),
                        clock.now(),
                        TTL,
                    ))
                })
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().token, "s.shared");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
