// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Advisory edit-lock registry with time-boxed ownership.
//!
//! Every multi-step mutation (fetch, patch, save) acquires the lock for the
//! target record before the first fetch and releases it after the save.
//! Locks are advisory: they do not block reads, and they expire after
//! [`LOCK_TTL`] so a crashed client cannot hold a record forever.

use crate::error::CoreError;
use benchstock_domain::{GlobalId, Username};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use time::{Duration, OffsetDateTime};

/// How long a lock entry stays live without being refreshed.
pub const LOCK_TTL: Duration = Duration::seconds(300);

/// One live or expired lock registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEntry {
    owner: Username,
    locked_at: OffsetDateTime,
    extended: bool,
}

impl LockEntry {
    /// Returns the user holding this entry.
    #[must_use]
    pub const fn owner(&self) -> &Username {
        &self.owner
    }

    /// Returns when this entry was created or last refreshed.
    #[must_use]
    pub const fn locked_at(&self) -> OffsetDateTime {
        self.locked_at
    }

    /// Returns whether the holder has re-acquired this entry at least once.
    #[must_use]
    pub const fn was_extended(&self) -> bool {
        self.extended
    }
}

/// The result of a lock acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    /// A fresh entry was created for the caller.
    Locked,
    /// The caller already held a live entry; its timestamp was reset.
    AlreadyLockedBySelf,
    /// Another user holds a live entry; nothing was changed.
    CannotLock {
        /// The user currently holding the lock.
        holder: Username,
    },
}

/// Process-wide advisory lock registry keyed by global identifier.
///
/// The registry mutex makes every acquisition a single atomic check-and-set
/// per key: two concurrent callers for the same identifier can never both
/// observe "no live entry" and both insert one.
#[derive(Debug)]
pub struct EditLockTracker {
    entries: Mutex<HashMap<GlobalId, LockEntry>>,
    ttl: Duration,
}

impl EditLockTracker {
    /// Creates a tracker with the default 300 second TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(LOCK_TTL)
    }

    /// Creates a tracker with a custom TTL.
    ///
    /// # Arguments
    ///
    /// * `ttl` - How long entries stay live without being refreshed
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Attempts to acquire the edit lock for a record.
    ///
    /// If no live entry exists (none at all, or only an expired one), a
    /// fresh entry is created for `user`. If the caller already holds a
    /// live entry, its timestamp is reset and the entry is marked extended.
    /// A live entry held by another user is left untouched.
    ///
    /// # Arguments
    ///
    /// * `global_id` - The record to lock
    /// * `user` - The user requesting the lock
    #[must_use]
    pub fn attempt_lock(&self, global_id: GlobalId, user: &Username) -> LockOutcome {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get_mut(&global_id)
            && now - entry.locked_at <= self.ttl
        {
            if &entry.owner == user {
                entry.locked_at = now;
                entry.extended = true;
                return LockOutcome::AlreadyLockedBySelf;
            }
            return LockOutcome::CannotLock {
                holder: entry.owner.clone(),
            };
        }

        entries.insert(
            global_id,
            LockEntry {
                owner: user.clone(),
                locked_at: now,
                extended: false,
            },
        );
        LockOutcome::Locked
    }

    /// Attempts to release the edit lock for a record.
    ///
    /// # Arguments
    ///
    /// * `global_id` - The record to unlock
    /// * `user` - The user releasing the lock
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if the caller's own entry was removed
    /// * `Ok(false)` if there was nothing live to release (a stale entry
    ///   is reclaimed in passing)
    /// * `Err(CoreError::LockConflict)` if another user holds a live entry
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is held by another live owner; the
    /// release never silently succeeds in that case.
    pub fn attempt_unlock(
        &self,
        global_id: GlobalId,
        user: &Username,
    ) -> Result<bool, CoreError> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(entry) = entries.get(&global_id) else {
            return Ok(false);
        };

        if now - entry.locked_at > self.ttl {
            entries.remove(&global_id);
            return Ok(false);
        }

        if &entry.owner != user {
            return Err(CoreError::LockConflict {
                global_id,
                holder: entry.owner.clone(),
            });
        }

        entries.remove(&global_id);
        Ok(true)
    }

    /// Returns the live holder of a record's lock, if any.
    ///
    /// # Arguments
    ///
    /// * `global_id` - The record to inspect
    #[must_use]
    pub fn holder(&self, global_id: GlobalId) -> Option<Username> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        entries
            .get(&global_id)
            .filter(|entry| now - entry.locked_at <= self.ttl)
            .map(|entry| entry.owner.clone())
    }

    /// Returns a copy of the registry entry for a record, live or not.
    ///
    /// # Arguments
    ///
    /// * `global_id` - The record to inspect
    #[must_use]
    pub fn entry(&self, global_id: GlobalId) -> Option<LockEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&global_id)
            .cloned()
    }

    /// Runs a multi-step mutation under the record's edit lock.
    ///
    /// The lock is acquired before `body` runs and released on every exit
    /// path, including the error path. A live lock held by another user
    /// fails the call up front with `CoreError::LockConflict`.
    ///
    /// # Arguments
    ///
    /// * `global_id` - The record the mutation targets
    /// * `user` - The acting user
    /// * `body` - The fetch-patch-save sequence to run under the lock
    ///
    /// # Errors
    ///
    /// Returns `CoreError::LockConflict` if the lock is held by another
    /// user, or whatever error `body` itself returns.
    pub fn with_lock<T, F>(
        &self,
        global_id: GlobalId,
        user: &Username,
        body: F,
    ) -> Result<T, CoreError>
    where
        F: FnOnce() -> Result<T, CoreError>,
    {
        match self.attempt_lock(global_id, user) {
            LockOutcome::Locked | LockOutcome::AlreadyLockedBySelf => {}
            LockOutcome::CannotLock { holder } => {
                return Err(CoreError::LockConflict { global_id, holder });
            }
        }

        let result: Result<T, CoreError> = body();

        // The entry can only be missing or foreign here if it expired while
        // the body ran and someone else claimed it; there is nothing left
        // for this caller to release.
        if let Err(release_error) = self.attempt_unlock(global_id, user) {
            tracing::warn!(
                record = %global_id,
                user = %user,
                error = %release_error,
                "Lock was taken over before release"
            );
        }

        result
    }
}

impl Default for EditLockTracker {
    fn default() -> Self {
        Self::new()
    }
}
