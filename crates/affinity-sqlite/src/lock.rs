// crates/affinity-sqlite/src/lock.rs
// ============================================================================
// Module: Connection Access Serializer
// Description: FIFO async lock owning the single physical connection.
// Purpose: Guarantee one holder at a time with release on every exit path.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! [`ConnectionLock`] owns the value it protects, so the connection is only
//! reachable through a [`ConnectionLease`]. Waiters are served in the order
//! they started waiting (tokio's mutex is fair). A lease releases the lock
//! when dropped, so early returns and panics unwinding through the holder
//! release it too.
//!
//! ## Invariants
//! - At most one lease exists at any instant.
//! - A waiter's `acquire` resolves strictly after the previous holder's
//!   lease is released.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ops::Deref;
use std::ops::DerefMut;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::OwnedMutexGuard;

// ============================================================================
// SECTION: Lock
// ============================================================================

/// Explicit FIFO lock around one shared resource.
///
/// Cloning shares the same lock.
pub struct ConnectionLock<T> {
    /// Fair async mutex holding the resource.
    inner: Arc<Mutex<T>>,
}

impl<T> ConnectionLock<T> {
    /// Wraps `resource` in a new, free lock.
    pub fn new(resource: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(resource)),
        }
    }

    /// Suspends until the lock is free, then holds it.
    pub async fn acquire(&self) -> ConnectionLease<T> {
        ConnectionLease {
            guard: Arc::clone(&self.inner).lock_owned().await,
        }
    }

    /// Holds the lock if it is free and nobody is waiting.
    #[must_use]
    pub fn try_acquire(&self) -> Option<ConnectionLease<T>> {
        Arc::clone(&self.inner).try_lock_owned().ok().map(|guard| ConnectionLease {
            guard,
        })
    }

    /// Returns true while a lease is outstanding.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}

impl<T> Clone for ConnectionLock<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

// ============================================================================
// SECTION: Lease
// ============================================================================

/// Exclusive access to the locked resource; releases on drop.
pub struct ConnectionLease<T> {
    /// Owned guard keeping the lock held.
    guard: OwnedMutexGuard<T>,
}

impl<T> ConnectionLease<T> {
    /// Releases the lock, handing it to the next waiter if any.
    pub fn release(self) {
        drop(self);
    }
}

impl<T> Deref for ConnectionLease<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for ConnectionLease<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
