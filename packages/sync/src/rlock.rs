//! Reentrant mutual-exclusion lock with owner tracking.

use std::sync::{Condvar, Mutex};
use std::thread::ThreadId;

/// A mutual-exclusion lock that the owning thread may acquire again.
///
/// The lock records which thread holds it and how many times. Re-acquisition
/// by the owner bumps the depth instead of deadlocking, and the lock only
/// becomes free again once the owner has called [`ReentrantLock::release`]
/// as many times as it acquired.
///
/// Releasing a lock that is not held, or from a thread that does not own it,
/// is a usage bug and panics rather than corrupting the owner bookkeeping.
///
/// # Examples
///
/// ```rust
/// use lockstep_sync::ReentrantLock;
///
/// let lock = ReentrantLock::new();
///
/// lock.acquire();
/// lock.acquire();
/// assert!(lock.is_owned());
///
/// lock.release();
/// assert!(lock.is_locked());
///
/// lock.release();
/// assert!(!lock.is_locked());
/// ```
#[derive(Debug)]
pub struct ReentrantLock {
    state: Mutex<ReentrantLockState>,
    released: Condvar,
}

#[derive(Debug)]
struct ReentrantLockState {
    owner: Option<ThreadId>,
    depth: usize,
}

impl ReentrantLock {
    /// Creates an unlocked reentrant lock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(ReentrantLockState {
                owner: None,
                depth: 0,
            }),
            released: Condvar::new(),
        }
    }

    /// Takes the lock, parking the calling thread until it is free.
    ///
    /// If the calling thread already owns the lock this returns immediately
    /// after bumping the acquisition depth.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn acquire(&self) {
        let current = std::thread::current().id();
        let mut state = self.state.lock().unwrap();

        if state.owner == Some(current) {
            state.depth += 1;
            return;
        }

        while state.owner.is_some() {
            log::trace!("acquire: lock owned by {:?}; parking", state.owner);
            state = self.released.wait(state).unwrap();
        }

        state.owner = Some(current);
        state.depth = 1;
    }

    /// Makes exactly one non-blocking attempt to take the lock.
    ///
    /// Succeeds when the lock is free or already owned by the calling thread
    /// (bumping the depth). Returns `false` without any side effects when
    /// another thread owns it.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        let current = std::thread::current().id();
        let mut state = self.state.lock().unwrap();

        if state.owner == Some(current) {
            state.depth += 1;
            return true;
        }

        if state.owner.is_some() {
            return false;
        }

        state.owner = Some(current);
        state.depth = 1;
        true
    }

    /// Drops one level of ownership.
    ///
    /// The lock becomes free, waking at most one parked thread, once the
    /// depth reaches zero.
    ///
    /// # Panics
    ///
    /// * If the lock is not currently acquired
    /// * If the calling thread does not own the lock
    /// * If the internal mutex is poisoned
    pub fn release(&self) {
        let current = std::thread::current().id();
        let mut state = self.state.lock().unwrap();

        let Some(owner) = state.owner else {
            panic!("ReentrantLock released while not acquired");
        };
        assert!(
            owner == current,
            "ReentrantLock released from a thread that does not own it"
        );

        state.depth -= 1;
        if state.depth == 0 {
            state.owner = None;
            self.released.notify_one();
        }
    }

    /// Returns whether any thread currently owns the lock (snapshot).
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.state.lock().unwrap().owner.is_some()
    }

    /// Returns whether the lock is currently held (snapshot), matching
    /// [`crate::Lock::is_locked`].
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state.lock().unwrap().owner.is_some()
    }
}

impl Default for ReentrantLock {
    fn default() -> Self {
        Self::new()
    }
}
