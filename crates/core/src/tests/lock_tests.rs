// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CoreError, EditLockTracker, LockOutcome};
use benchstock_domain::{GlobalId, RecordKind, Username};
use std::sync::Arc;
use time::Duration;

fn sample_id(id: i64) -> GlobalId {
    GlobalId::new(RecordKind::Sample, id)
}

fn user(name: &str) -> Username {
    Username::new(name)
}

#[test]
fn test_first_acquisition_locks() {
    let tracker: EditLockTracker = EditLockTracker::new();
    let outcome: LockOutcome = tracker.attempt_lock(sample_id(1), &user("alice"));

    assert_eq!(outcome, LockOutcome::Locked);
    assert_eq!(tracker.holder(sample_id(1)), Some(user("alice")));
}

#[test]
fn test_reacquisition_by_holder_extends_entry() {
    let tracker: EditLockTracker = EditLockTracker::new();
    assert_eq!(
        tracker.attempt_lock(sample_id(1), &user("alice")),
        LockOutcome::Locked
    );

    let outcome: LockOutcome = tracker.attempt_lock(sample_id(1), &user("alice"));

    assert_eq!(outcome, LockOutcome::AlreadyLockedBySelf);
    let entry = tracker.entry(sample_id(1)).unwrap();
    assert!(entry.was_extended());
    assert_eq!(entry.owner(), &user("alice"));
}

#[test]
fn test_acquisition_by_other_user_names_holder() {
    let tracker: EditLockTracker = EditLockTracker::new();
    assert_eq!(
        tracker.attempt_lock(sample_id(1), &user("alice")),
        LockOutcome::Locked
    );

    let outcome: LockOutcome = tracker.attempt_lock(sample_id(1), &user("bob"));

    assert_eq!(
        outcome,
        LockOutcome::CannotLock {
            holder: user("alice")
        }
    );
    // The existing entry is left untouched.
    assert_eq!(tracker.holder(sample_id(1)), Some(user("alice")));
}

#[test]
fn test_locks_are_per_record() {
    let tracker: EditLockTracker = EditLockTracker::new();
    assert_eq!(
        tracker.attempt_lock(sample_id(1), &user("alice")),
        LockOutcome::Locked
    );

    let outcome: LockOutcome = tracker.attempt_lock(sample_id(2), &user("bob"));
    assert_eq!(outcome, LockOutcome::Locked);
}

#[test]
fn test_release_by_holder_succeeds() {
    let tracker: EditLockTracker = EditLockTracker::new();
    assert_eq!(
        tracker.attempt_lock(sample_id(1), &user("alice")),
        LockOutcome::Locked
    );

    let released: bool = tracker.attempt_unlock(sample_id(1), &user("alice")).unwrap();

    assert!(released);
    assert_eq!(tracker.holder(sample_id(1)), None);
}

#[test]
fn test_release_by_other_user_is_a_conflict() {
    let tracker: EditLockTracker = EditLockTracker::new();
    assert_eq!(
        tracker.attempt_lock(sample_id(1), &user("alice")),
        LockOutcome::Locked
    );

    let result: Result<bool, CoreError> = tracker.attempt_unlock(sample_id(1), &user("bob"));

    assert!(matches!(
        result,
        Err(CoreError::LockConflict { holder, .. }) if holder == user("alice")
    ));
    // The lock stays with its holder.
    assert_eq!(tracker.holder(sample_id(1)), Some(user("alice")));
}

#[test]
fn test_release_without_lock_reports_not_locked() {
    let tracker: EditLockTracker = EditLockTracker::new();

    let released: bool = tracker.attempt_unlock(sample_id(1), &user("alice")).unwrap();
    assert!(!released);
}

#[test]
fn test_expired_lock_is_reclaimable_by_any_user() {
    let tracker: EditLockTracker = EditLockTracker::with_ttl(Duration::ZERO);
    assert_eq!(
        tracker.attempt_lock(sample_id(1), &user("alice")),
        LockOutcome::Locked
    );
    std::thread::sleep(std::time::Duration::from_millis(5));

    let outcome: LockOutcome = tracker.attempt_lock(sample_id(1), &user("bob"));

    assert_eq!(outcome, LockOutcome::Locked);
    assert_eq!(tracker.holder(sample_id(1)), Some(user("bob")));
}

#[test]
fn test_expired_lock_release_reports_not_locked() {
    let tracker: EditLockTracker = EditLockTracker::with_ttl(Duration::ZERO);
    assert_eq!(
        tracker.attempt_lock(sample_id(1), &user("alice")),
        LockOutcome::Locked
    );
    std::thread::sleep(std::time::Duration::from_millis(5));

    // Even the original holder only reclaims the stale entry.
    let released: bool = tracker.attempt_unlock(sample_id(1), &user("alice")).unwrap();
    assert!(!released);
    assert!(tracker.entry(sample_id(1)).is_none());
}

#[test]
fn test_with_lock_releases_on_success() {
    let tracker: EditLockTracker = EditLockTracker::new();

    let result: Result<u32, CoreError> =
        tracker.with_lock(sample_id(1), &user("alice"), || Ok(7));

    assert_eq!(result.unwrap(), 7);
    assert_eq!(tracker.holder(sample_id(1)), None);
}

#[test]
fn test_with_lock_releases_on_error() {
    let tracker: EditLockTracker = EditLockTracker::new();

    let result: Result<u32, CoreError> = tracker.with_lock(sample_id(1), &user("alice"), || {
        Err(CoreError::Internal {
            message: String::from("save failed"),
        })
    });

    assert!(result.is_err());
    assert_eq!(tracker.holder(sample_id(1)), None);
}

#[test]
fn test_with_lock_fails_fast_on_foreign_lock() {
    let tracker: EditLockTracker = EditLockTracker::new();
    assert_eq!(
        tracker.attempt_lock(sample_id(1), &user("bob")),
        LockOutcome::Locked
    );

    let result: Result<u32, CoreError> =
        tracker.with_lock(sample_id(1), &user("alice"), || Ok(7));

    assert!(matches!(
        result,
        Err(CoreError::LockConflict { holder, .. }) if holder == user("bob")
    ));
}

#[test]
fn test_concurrent_acquisition_grants_exactly_one_lock() {
    let tracker: Arc<EditLockTracker> = Arc::new(EditLockTracker::new());
    let id: GlobalId = sample_id(1);

    let outcomes: Vec<LockOutcome> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let tracker: Arc<EditLockTracker> = Arc::clone(&tracker);
                scope.spawn(move || tracker.attempt_lock(id, &user(&format!("user-{n}"))))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let granted: usize = outcomes
        .iter()
        .filter(|outcome| **outcome == LockOutcome::Locked)
        .count();
    assert_eq!(granted, 1);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, LockOutcome::Locked | LockOutcome::CannotLock { .. })));
}
