//! Asynchronous Transaction Tests
//!
//! The async entry point settles only after commit and notification, and a
//! failing or dropped runner never touches the committed value.

use crate::*;
use anyhow::anyhow;
use std::time::Duration;
use trackstate::{TxProxy, Version};

#[tokio::test]
async fn test_async_failure_rejects_with_cause() {
    let state = counter_container();
    let (seen, _untrack) = record_values(&state);

    let result = state
        .transact_async(|p| async move {
            p.write(|c| c.count += 1)?;
            tokio::task::yield_now().await;
            Err::<(), _>(anyhow!("boom"))
        })
        .await;

    let err = result.unwrap_err();
    assert!(err.is_aborted());
    assert_eq!(err.into_cause().map(|e| e.to_string()), Some("boom".to_string()));
    assert!(seen.lock().is_empty());
    assert_eq!(state.get(), Counter::default());
    assert_eq!(state.version(), Version::INITIAL);
}

#[tokio::test]
async fn test_async_commit_notifies_before_settling() {
    let state = counter_container();
    let (seen, _untrack) = record_values(&state);

    let result = state
        .transact_async(|p| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            p.write(|c| c.count += 1)?;
            p.read(|c| c.count).map_err(anyhow::Error::from)
        })
        .await
        .unwrap();

    assert_eq!(result, 1);
    // Settled: the observer has already run.
    assert_eq!(*seen.lock(), vec![Counter::new(1)]);
    assert_eq!(state.get().count, 1);
}

#[tokio::test]
async fn test_dropped_future_aborts() {
    let state = counter_container();
    let (seen, _untrack) = record_values(&state);
    let leaked: Arc<Mutex<Option<TxProxy<Counter>>>> = Arc::new(Mutex::new(None));

    let pending = {
        let leaked = Arc::clone(&leaked);
        state.transact_async(move |p| async move {
            p.write(|c| c.count = 42)?;
            *leaked.lock() = Some(p.clone());
            std::future::pending::<()>().await;
            Ok::<_, anyhow::Error>(())
        })
    };
    let timed_out = tokio::time::timeout(Duration::from_millis(20), pending).await;
    assert!(timed_out.is_err());

    let proxy = leaked.lock().take().unwrap();
    assert!(!proxy.is_live());
    assert!(proxy.read(|c| c.count).is_err());
    assert!(seen.lock().is_empty());
    assert_eq!(state.get(), Counter::default());
    assert!(!state.is_busy());
    assert_eq!(state.metrics().transactions_aborted, 1);

    state
        .transact_async(|p| async move { p.set(Counter::new(7)) })
        .await
        .unwrap();
    assert_eq!(state.get().count, 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_spawned_async_transactions_all_commit() {
    let state = counter_container();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = state.clone();
            tokio::spawn(async move {
                state
                    .transact_async(|p| async move {
                        tokio::task::yield_now().await;
                        p.write(|c| c.count += 1)
                    })
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(state.get().count, 8);
    assert_eq!(state.version(), Version::from(8));
}

#[tokio::test]
async fn test_sync_call_inside_runtime_uncontended_succeeds() {
    let state = counter_container();
    state.transact(|p| p.write(|c| c.count = 3)).unwrap();
    assert_eq!(state.get().count, 3);
}

#[tokio::test]
async fn test_sync_call_inside_runtime_contended_would_block() {
    let state = counter_container();
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();

    let holder = {
        let state = state.clone();
        tokio::spawn(async move {
            state
                .transact_async(|p| async move {
                    let _ = started_tx.send(());
                    let _ = release_rx.await;
                    p.write(|c| c.count = 1)
                })
                .await
        })
    };
    started_rx.await.unwrap();

    let err = state.transact(|p| p.write(|c| c.count = 2)).unwrap_err();
    assert!(err.is_would_block());
    assert!(trackstate::Error::from(err).is_retryable());

    release_tx.send(()).unwrap();
    holder.await.unwrap().unwrap();
    assert_eq!(state.get().count, 1);
}
