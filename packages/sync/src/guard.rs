//! Scope-bound acquisition for the manually released primitives.

use crate::rlock::ReentrantLock;
use crate::semaphore::{Lock, Semaphore};

/// Manual acquire/release surface shared by the lock-shaped primitives.
///
/// Every [`Acquire::acquire`] must be paired with exactly one
/// [`Acquire::release`] on every exit path; [`ScopedLock`] automates the
/// pairing for a lexical scope.
pub trait Acquire {
    /// Takes the lock or permit, parking the calling thread until it is
    /// available.
    fn acquire(&self);

    /// Returns the lock or permit.
    fn release(&self);

    /// Acquires and hands back a guard that releases on drop.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lockstep_sync::{Acquire, Lock};
    ///
    /// let lock = Lock::new();
    ///
    /// {
    ///     let _guard = lock.scoped();
    ///     assert!(lock.is_locked());
    /// }
    ///
    /// assert!(!lock.is_locked());
    /// ```
    fn scoped(&self) -> ScopedLock<'_, Self>
    where
        Self: Sized,
    {
        ScopedLock::new(self)
    }
}

impl Acquire for Semaphore {
    fn acquire(&self) {
        Self::acquire(self);
    }

    fn release(&self) {
        Self::release(self);
    }
}

impl Acquire for Lock {
    fn acquire(&self) {
        Self::acquire(self);
    }

    fn release(&self) {
        Self::release(self);
    }
}

impl Acquire for ReentrantLock {
    fn acquire(&self) {
        Self::acquire(self);
    }

    fn release(&self) {
        Self::release(self);
    }
}

/// Holds an [`Acquire`] implementor for the guard's lifetime.
///
/// Construction blocks until the acquisition succeeds; dropping releases
/// exactly once, on normal exit and during panic unwinding alike. The guard
/// borrows the lock, so it cannot outlive it, and it is deliberately not
/// `Clone`: one guard, one release.
#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopedLock<'a, L: Acquire + ?Sized> {
    lock: &'a L,
}

impl<'a, L: Acquire + ?Sized> ScopedLock<'a, L> {
    /// Acquires `lock`, parking the calling thread until that succeeds.
    pub fn new(lock: &'a L) -> Self {
        lock.acquire();
        Self { lock }
    }
}

impl<L: Acquire + ?Sized> Drop for ScopedLock<'_, L> {
    fn drop(&mut self) {
        self.lock.release();
    }
}
