// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Resilient mutex helpers for the screen lock.
//!
//! A panic inside a render or a handler dispatch poisons the screen lock.
//! The dashboard would then be dead for the rest of the session, so both
//! activities recover the guard instead and let the next refresh tick redraw
//! whatever state is left.

use std::sync::{Mutex, MutexGuard, TryLockError};

/// Acquire a mutex, recovering from poisoning if necessary.
///
/// A poisoned lock is logged and its guard returned anyway. The screen state
/// behind it is at worst half-rendered, which the next tick repaints.
#[inline]
pub fn resilient_lock<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::error!(
                target: "locks",
                event = "LOCK_POISONED",
                "Lock was poisoned. Recovering data. \
                 A thread previously panicked while holding this lock."
            );
            poisoned.into_inner()
        }
    }
}

/// Try to acquire a mutex without blocking.
///
/// Returns `Some(guard)` if the lock can be acquired immediately,
/// `None` if it would block. Recovers from poisoning.
#[inline]
pub fn try_resilient_lock<T>(lock: &Mutex<T>) -> Option<MutexGuard<'_, T>> {
    match lock.try_lock() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => {
            tracing::error!(
                target: "locks",
                event = "LOCK_POISONED_TRY",
                "Lock was poisoned during try_lock. Recovering data."
            );
            Some(poisoned.into_inner())
        }
        Err(TryLockError::WouldBlock) => None,
    }
}
