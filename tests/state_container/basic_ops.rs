//! Synchronous Transaction Tests
//!
//! Commit, abort and read accessors through the sync entry point.

use crate::*;
use trackstate::{Error, StaleProxyError, TransactionError, Version};

// =============================================================================
// COMMIT
// =============================================================================

#[test]
fn test_sync_commit_notifies_once_with_new_value() {
    let state = counter_container();
    let (seen, _untrack) = record_values(&state);

    let result = state.transact(|p| {
        p.write(|c| c.count += 1)?;
        p.read(|c| c.count)
    });

    assert_eq!(result.unwrap(), 1);
    assert_eq!(*seen.lock(), vec![Counter::new(1)]);
    assert_eq!(state.get(), Counter::new(1));
    assert_eq!(state.version(), Version::from(1));
}

#[test]
fn test_commit_without_writes_still_commits() {
    let state = counter_container();
    let (seen, _untrack) = record_values(&state);

    state.transact(|p| p.read(|c| c.count)).unwrap();

    assert_eq!(seen.lock().len(), 1);
    assert_eq!(state.version(), Version::from(1));
}

#[test]
fn test_read_your_writes_inside_runner() {
    let state = counter_container();

    let observed = state
        .transact(|p| {
            p.set(Counter::new(10))?;
            let first = p.read(|c| c.count)?;
            p.write(|c| c.count *= 3)?;
            let second = p.get()?;
            Ok::<_, StaleProxyError>((first, second.count))
        })
        .unwrap();

    assert_eq!(observed, (10, 30));
    assert_eq!(state.get().count, 30);
}

#[test]
fn test_outside_reads_do_not_see_uncommitted_writes() {
    let state = counter_container();
    let outside = state.clone();

    state
        .transact(|p| {
            p.write(|c| c.count = 99)?;
            assert_eq!(outside.get().count, 0);
            assert_eq!(outside.version(), Version::INITIAL);
            Ok::<_, StaleProxyError>(())
        })
        .unwrap();

    assert_eq!(outside.get().count, 99);
}

// =============================================================================
// ABORT
// =============================================================================

#[test]
fn test_sync_failure_leaves_value_and_skips_observers() {
    let state = counter_container();
    let (seen, _untrack) = record_values(&state);

    let result = state.transact(|p| {
        p.write(|c| c.count += 1).map_err(|e| e.to_string())?;
        Err::<(), _>("rejected".to_string())
    });

    let err = result.unwrap_err();
    assert!(err.is_aborted());
    assert_eq!(err.cause().map(String::as_str), Some("rejected"));
    assert!(seen.lock().is_empty());
    assert_eq!(state.get(), Counter::default());
    assert_eq!(state.version(), Version::INITIAL);
}

#[test]
fn test_runner_panic_aborts_and_container_stays_usable() {
    let state = counter_container();
    let (seen, _untrack) = record_values(&state);

    let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = state.transact(|p| -> Result<(), StaleProxyError> {
            p.write(|c| c.count = 5)?;
            panic!("runner exploded")
        });
    }));
    assert!(panicked.is_err());

    assert_eq!(state.get(), Counter::default());
    assert!(seen.lock().is_empty());
    assert!(!state.is_busy());

    state.transact(|p| p.write(|c| c.count = 1)).unwrap();
    assert_eq!(state.get().count, 1);
    assert_eq!(state.metrics().transactions_aborted, 1);
}

#[test]
fn test_errors_flatten_into_facade_error() -> trackstate::Result<()> {
    let state = counter_container();
    state.transact(|p| p.write(|c| c.count = 2))?;

    let err = state
        .transact(|_| Err::<(), _>("nope"))
        .map_err(Error::from)
        .unwrap_err();
    assert!(err.is_aborted());
    assert!(err.to_string().contains("nope"));
    Ok(())
}

// =============================================================================
// READ ACCESSORS
// =============================================================================

#[test]
fn test_snapshot_is_stable_across_commits() {
    let state = counter_container();
    let before = state.snapshot();

    state.transact(|p| p.set(Counter::new(4))).unwrap();

    assert_eq!(before.count, 0);
    assert_eq!(state.snapshot().count, 4);
    assert_eq!(state.with(|c| c.count * 2), 8);
}

#[test]
fn test_metrics_track_outcomes() {
    let state = counter_container();
    let _untrack = state.track(|_| {});

    state.transact(|p| p.write(|c| c.count += 1)).unwrap();
    let _ = state.transact(|_| Err::<(), _>(()));

    let metrics = state.metrics();
    assert_eq!(metrics.version, Version::from(1));
    assert_eq!(metrics.transactions_committed, 1);
    assert_eq!(metrics.transactions_aborted, 1);
    assert_eq!(metrics.observers, 1);
    assert!((metrics.commit_rate - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_reentrant_transaction_is_rejected() {
    let state = counter_container();
    let inner = state.clone();

    let nested = state
        .transact(|p| {
            p.write(|c| c.count = 1)?;
            Ok::<_, StaleProxyError>(inner.transact(|q| q.write(|c| c.count = 2)))
        })
        .unwrap();

    assert!(matches!(nested, Err(TransactionError::Reentrant { .. })));
    assert_eq!(state.get().count, 1);
}

#[test]
fn test_config_from_json() -> anyhow::Result<()> {
    let config: trackstate::ContainerConfig =
        serde_json::from_str(r#"{ "name": "prefs", "trace_transactions": false }"#)?;
    let state = StateContainer::builder()
        .config(config)
        .build(Counter::new(3));

    assert_eq!(state.name(), "prefs");
    assert_eq!(state.get().count, 3);
    Ok(())
}
