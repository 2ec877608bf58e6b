//! Standalone condition variable with counted notifications.

use std::sync::{Condvar, Mutex};

/// A wait/notify point that is not tied to any caller-supplied lock.
///
/// Threads park in [`Condition::wait`]; [`Condition::notify`] delivers a wake
/// to up to the requested number of threads that are parked at that moment.
/// Notifications are never banked: a `notify` issued while nobody waits does
/// nothing, and a thread that starts waiting afterwards stays parked until
/// the next one.
///
/// The waiter and undelivered-wake counts live behind the condition's own
/// private mutex, so delivery has no lost-wakeup window.
#[derive(Debug)]
pub struct Condition {
    state: Mutex<ConditionState>,
    notified: Condvar,
}

#[derive(Debug)]
struct ConditionState {
    waiters: usize,
    wakes: usize,
}

impl Condition {
    /// Creates a condition with no waiters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(ConditionState {
                waiters: 0,
                wakes: 0,
            }),
            notified: Condvar::new(),
        }
    }

    /// Parks the calling thread until a notification is delivered to it.
    ///
    /// Spurious wake-ups are absorbed internally. Returns whether a
    /// notification woke this thread, which is always `true`: a delivered
    /// notification is the only way out.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        state.waiters += 1;
        log::trace!("wait: parking ({} now waiting)", state.waiters);

        loop {
            state = self.notified.wait(state).unwrap();
            if state.wakes > 0 {
                state.wakes -= 1;
                break;
            }
        }

        state.waiters -= 1;
        true
    }

    /// Delivers a wake to up to `value` currently parked threads.
    ///
    /// Wakes `min(value, parked threads without a pending wake)`; the rest of
    /// `value` is discarded rather than saved for future waiters.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn notify(&self, value: usize) {
        let mut state = self.state.lock().unwrap();
        let undelivered = state.waiters - state.wakes;
        let granted = value.min(undelivered);

        if granted == 0 {
            return;
        }

        log::trace!("notify: waking {granted} of {} waiter(s)", state.waiters);
        state.wakes += granted;
        for _ in 0..granted {
            self.notified.notify_one();
        }
    }

    /// Delivers a wake to every currently parked thread.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn notify_all(&self) {
        let mut state = self.state.lock().unwrap();

        if state.waiters > 0 {
            log::trace!("notify_all: waking {} waiter(s)", state.waiters);
        }

        state.wakes = state.waiters;
        self.notified.notify_all();
    }

    /// Returns the number of threads currently parked in [`Condition::wait`]
    /// (snapshot).
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn waiters(&self) -> usize {
        self.state.lock().unwrap().waiters
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::new()
    }
}
