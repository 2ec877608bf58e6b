//! Counting semaphore and its single-permit [`Lock`] specialization.
//!
//! A [`Semaphore`] tracks a number of permits. [`Semaphore::acquire`] takes a
//! permit, parking the calling thread until one is available;
//! [`Semaphore::release`] returns a permit and wakes at most one parked
//! thread. Woken threads re-check availability before taking a permit, so
//! waking is safe under any number of concurrent acquirers.
//!
//! [`Lock`] fixes the permit count at one, which turns the semaphore into a
//! non-reentrant mutual-exclusion lock with manual `acquire`/`release` calls
//! (see [`crate::guard::ScopedLock`] for the scope-bound variant).

use std::sync::{Condvar, Mutex};

/// A counting permit store.
///
/// Acquiring consumes a permit, releasing produces one. Unlike a mutex there
/// is no ownership: any thread may release, and releasing more often than
/// acquiring grows the permit count past its starting value.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use lockstep_sync::Semaphore;
///
/// // Allow up to two concurrent workers.
/// let slots = Arc::new(Semaphore::new(2));
///
/// slots.acquire();
/// assert!(slots.try_acquire());
/// assert!(!slots.try_acquire());
///
/// slots.release();
/// slots.release();
/// assert_eq!(slots.available_permits(), 2);
/// ```
#[derive(Debug)]
pub struct Semaphore {
    state: Mutex<SemaphoreState>,
    permit_released: Condvar,
}

#[derive(Debug)]
struct SemaphoreState {
    permits: usize,
}

impl Semaphore {
    /// Creates a semaphore with the given starting permit count.
    #[must_use]
    pub const fn new(permits: usize) -> Self {
        Self {
            state: Mutex::new(SemaphoreState { permits }),
            permit_released: Condvar::new(),
        }
    }

    /// Takes a permit, parking the calling thread until one is available.
    ///
    /// A woken thread re-checks availability rather than assuming the wake-up
    /// reserved a permit for it, so any number of threads may contend here.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn acquire(&self) {
        let mut state = self.state.lock().unwrap();
        while state.permits == 0 {
            log::trace!("acquire: no permits available; parking");
            state = self.permit_released.wait(state).unwrap();
        }
        state.permits -= 1;
    }

    /// Makes exactly one non-blocking attempt to take a permit.
    ///
    /// Returns `true` if a permit was taken. Returns `false` without any side
    /// effects when none is available.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.permits == 0 {
            return false;
        }
        state.permits -= 1;
        true
    }

    /// Returns a permit and wakes at most one parked thread.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn release(&self) {
        let mut state = self.state.lock().unwrap();
        state.permits += 1;
        self.permit_released.notify_one();
    }

    /// Returns whether the permit count is currently zero.
    ///
    /// This is a snapshot, not a guarantee: another thread may acquire or
    /// release between the check and any action taken on it.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state.lock().unwrap().permits == 0
    }

    /// Returns the number of currently available permits (snapshot).
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.state.lock().unwrap().permits
    }
}

impl Default for Semaphore {
    /// A single-permit semaphore.
    fn default() -> Self {
        Self::new(1)
    }
}

/// A non-reentrant mutual-exclusion lock: a [`Semaphore`] fixed at one permit.
///
/// A thread that already holds the lock and calls [`Lock::acquire`] again
/// will deadlock against itself; there is no ownership tracking here. Use
/// [`crate::ReentrantLock`] when the same thread must be able to re-enter.
#[derive(Debug)]
pub struct Lock {
    inner: Semaphore,
}

impl Lock {
    /// Creates an unlocked lock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Semaphore::new(1),
        }
    }

    /// Takes the lock, parking the calling thread until it is free.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn acquire(&self) {
        self.inner.acquire();
    }

    /// Makes exactly one non-blocking attempt to take the lock.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        self.inner.try_acquire()
    }

    /// Frees the lock and wakes at most one parked thread.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn release(&self) {
        self.inner.release();
    }

    /// Returns whether the lock is currently held (snapshot).
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

impl Default for Lock {
    fn default() -> Self {
        Self::new()
    }
}
