use std::cell::Cell;

use super::*;

#[test]
fn default_policy() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.backoff_ms, 500);
    assert!(policy.validate().is_ok());
}

#[test]
fn backoff_grows_linearly() {
    let policy = RetryPolicy {
        max_attempts: 3,
        backoff_ms: 500,
    };
    assert_eq!(policy.backoff_for(1), Duration::from_millis(500));
    assert_eq!(policy.backoff_for(2), Duration::from_millis(1000));
    assert_eq!(policy.backoff_for(3), Duration::from_millis(1500));
}

#[test]
fn zero_attempts_is_invalid() {
    let err = RetryPolicy::immediate(0).validate().unwrap_err();
    assert!(matches!(err, IcebergError::Validation(_)));
}

#[test]
fn transient_errors_retry_until_budget_is_spent() {
    let calls = Cell::new(0u32);
    let err = RetryPolicy::immediate(3)
        .run("tracks", || -> IcebergResult<()> {
            calls.set(calls.get() + 1);
            Err(IcebergError::transient("503"))
        })
        .unwrap_err();
    assert!(matches!(err, IcebergError::TransientFetch(_)));
    assert_eq!(calls.get(), 3);
}

#[test]
fn transient_then_success() {
    let calls = Cell::new(0u32);
    let out = RetryPolicy::immediate(3)
        .run("tracks", || {
            calls.set(calls.get() + 1);
            if calls.get() < 2 {
                Err(IcebergError::transient("timeout"))
            } else {
                Ok(7)
            }
        })
        .unwrap();
    assert_eq!(out, 7);
    assert_eq!(calls.get(), 2);
}

#[test]
fn terminal_errors_are_not_retried() {
    for terminal in [
        IcebergError::not_found("gone"),
        IcebergError::forbidden("private"),
        IcebergError::auth("bad token"),
    ] {
        let calls = Cell::new(0u32);
        let mut pending = Some(terminal);
        let err = RetryPolicy::immediate(3)
            .run("tracks", || -> IcebergResult<()> {
                calls.set(calls.get() + 1);
                Err(pending
                    .take()
                    .unwrap_or_else(|| IcebergError::transient("unexpected second call")))
            })
            .unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(calls.get(), 1);
    }
}
