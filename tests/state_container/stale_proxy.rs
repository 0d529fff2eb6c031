//! Stale Proxy Tests
//!
//! A proxy that escapes its transaction fails on every access and never
//! reaches the committed value.

use crate::*;
use trackstate::{ProxyFactory, StaleProxyError, TxProxy, TxnId};

fn leak_proxy(state: &StateContainer<Counter>, fail: bool) -> TxProxy<Counter> {
    let leaked = Mutex::new(None);
    let _ = state.transact(|p| {
        *leaked.lock() = Some(p.clone());
        if fail {
            Err(())
        } else {
            Ok(())
        }
    });
    leaked.into_inner().unwrap()
}

#[test]
fn test_proxy_is_stale_after_commit() {
    let state = counter_container();
    let proxy = leak_proxy(&state, false);

    assert!(!proxy.is_live());
    assert_eq!(proxy.read(|c| c.count), Err(StaleProxyError::new(proxy.txn_id())));
    assert!(proxy.write(|c| c.count = 50).is_err());
    assert!(proxy.set(Counter::new(50)).is_err());
    assert_eq!(state.get().count, 0);
}

#[test]
fn test_proxy_is_stale_after_abort() {
    let state = counter_container();
    let proxy = leak_proxy(&state, true);

    let err = proxy.get().unwrap_err();
    assert_eq!(err.txn_id, proxy.txn_id());
    assert!(trackstate::Error::from(err).is_stale_proxy());
}

#[test]
fn test_stale_write_does_not_leak_into_later_transaction() {
    let state = counter_container();
    let (seen, _untrack) = record_values(&state);
    let stale = leak_proxy(&state, false);

    state
        .transact(|p| {
            assert!(stale.write(|c| c.count = 1000).is_err());
            p.write(|c| c.count += 1)
        })
        .unwrap();

    assert_eq!(state.get().count, 1);
    assert_eq!(seen.lock().last(), Some(&Counter::new(1)));
}

#[test]
fn test_each_transaction_gets_a_fresh_id() {
    let state = counter_container();
    let first = leak_proxy(&state, false);
    let second = leak_proxy(&state, true);
    let third = leak_proxy(&state, false);

    assert!(first.txn_id() < second.txn_id());
    assert!(second.txn_id() < third.txn_id());
}

#[test]
fn test_factory_resolves_only_live_proxies() {
    let factory = ProxyFactory::new();
    let proxy = factory.create_proxy(TxnId::from(1), &Counter::new(2));
    proxy.write(|c| c.count += 1).unwrap();

    assert_eq!(factory.resolve(&proxy), Ok(Counter::new(3)));
    // Already resolved: nothing left to discard.
    assert!(!factory.invalidate(&proxy));
    assert!(factory.resolve(&proxy).is_err());
    assert!(proxy.read(|c| c.count).is_err());
}

#[test]
fn test_factory_invalidate_reports_discarded_working_copy() {
    let factory = ProxyFactory::new();
    let proxy = factory.create_proxy(TxnId::from(2), &Counter::new(5));

    assert!(factory.invalidate(&proxy));
    assert!(!factory.invalidate(&proxy));
    assert!(factory.resolve(&proxy).is_err());
}
