//! Level-triggered event flag and its value-carrying extension.
//!
//! An [`Event`] is a boolean gate for threads: while unset, [`Event::wait`]
//! parks the caller; once [`Event::set`] runs, every current waiter wakes and
//! every future wait returns immediately until [`Event::clear`]. The flag is
//! level-triggered, so setting with no waiters is not lost the way an
//! unobserved notification would be.
//!
//! [`ValueEvent`] couples the flag with a value slot so that the thread that
//! sets the event can hand a payload to the threads it wakes.

use std::sync::{Condvar, Mutex};

/// A settable, clearable flag that threads can wait on.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use lockstep_sync::Event;
///
/// let event = Arc::new(Event::new());
///
/// let background = {
///     let event = event.clone();
///     std::thread::spawn(move || {
///         event.wait();
///         "woken"
///     })
/// };
///
/// event.set();
/// assert_eq!(background.join().unwrap(), "woken");
/// ```
#[derive(Debug)]
pub struct Event {
    state: Mutex<EventState>,
    signaled: Condvar,
}

#[derive(Debug)]
struct EventState {
    set: bool,
    waiters: usize,
}

impl Event {
    /// Creates an unset event.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(EventState {
                set: false,
                waiters: 0,
            }),
            signaled: Condvar::new(),
        }
    }

    /// Returns immediately if the event is set, otherwise parks the calling
    /// thread until it is.
    ///
    /// The flag may be cleared again by the time a woken thread runs; callers
    /// holding that expectation must re-check their own condition.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn wait(&self) {
        let mut state = self.state.lock().unwrap();

        if state.set {
            return;
        }

        state.waiters += 1;
        log::trace!("wait: event unset; parking ({} waiting)", state.waiters);

        while !state.set {
            state = self.signaled.wait(state).unwrap();
        }

        state.waiters -= 1;
    }

    /// Makes exactly one non-blocking check of the flag.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn try_wait(&self) -> bool {
        self.is_set()
    }

    /// Sets the flag and wakes every currently parked thread.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn set(&self) {
        let mut state = self.state.lock().unwrap();
        state.set = true;

        if state.waiters > 0 {
            log::trace!("set: waking {} waiter(s)", state.waiters);
        }

        self.signaled.notify_all();
    }

    /// Resets the flag. Wakes no one; threads already parked stay parked.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn clear(&self) {
        self.state.lock().unwrap().set = false;
    }

    /// Returns whether the flag is currently set (snapshot).
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.state.lock().unwrap().set
    }

    /// Returns the number of threads currently parked in [`Event::wait`]
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

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

/// An [`Event`] that carries a value from the setter to the woken threads.
///
/// [`ValueEvent::send`] stores the value before setting the flag, so a thread
/// returning from [`ValueEvent::wait`] always observes the payload that woke
/// it (or a later one; the slot is last-write-wins and every reader receives
/// a clone).
///
/// The plain event surface (`set`/`clear`/`is_set`) is also exposed for
/// callers that drive the flag directly; the slot keeps its previous value
/// across `clear`.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use lockstep_sync::ValueEvent;
///
/// let ready = Arc::new(ValueEvent::new());
///
/// let consumer = {
///     let ready = ready.clone();
///     std::thread::spawn(move || ready.wait())
/// };
///
/// ready.send("config loaded".to_string());
/// assert_eq!(consumer.join().unwrap(), "config loaded");
/// ```
#[derive(Debug)]
pub struct ValueEvent<T> {
    event: Event,
    value: Mutex<Option<T>>,
}

impl<T> ValueEvent<T> {
    /// Creates an unset event with an empty value slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            event: Event::new(),
            value: Mutex::new(None),
        }
    }

    /// Stores `value`, then sets the event, waking every parked thread.
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    pub fn send(&self, value: T) {
        *self.value.lock().unwrap() = Some(value);
        self.event.set();
    }

    /// Sets the event without touching the value slot.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn set(&self) {
        self.event.set();
    }

    /// Resets the event. The value slot keeps its contents.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn clear(&self) {
        self.event.clear();
    }

    /// Returns whether the event is currently set (snapshot).
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.event.is_set()
    }
}

impl<T: Clone> ValueEvent<T> {
    /// Parks the calling thread until the event is set, then returns a clone
    /// of the stored value.
    ///
    /// # Panics
    ///
    /// * If the event was set directly without [`ValueEvent::send`] having
    ///   stored a value
    /// * If an internal mutex is poisoned
    pub fn wait(&self) -> T {
        self.event.wait();
        self.value
            .lock()
            .unwrap()
            .clone()
            .expect("ValueEvent set without a value; use send to publish one")
    }

    /// Makes exactly one non-blocking attempt to read the value.
    ///
    /// Returns `None` while the event is unset or no value has been sent yet,
    /// so "nothing published" is never confused with a published value.
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    #[must_use]
    pub fn try_wait(&self) -> Option<T> {
        if !self.event.try_wait() {
            return None;
        }
        self.value.lock().unwrap().clone()
    }
}

impl<T> Default for ValueEvent<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::wait_for_condition;

    #[test_log::test]
    fn test_wait_returns_immediately_when_set() {
        let event = Event::new();

        event.set();

        // Level-triggered: no thread needs to be waiting at set() time.
        event.wait();
        event.wait();
        assert!(event.try_wait());
        assert!(event.is_set());
    }

    #[test_log::test]
    fn test_try_wait_on_unset_event_has_no_side_effects() {
        let event = Event::new();

        assert!(!event.try_wait());
        assert!(!event.try_wait());
        assert!(!event.is_set());
        assert_eq!(event.waiters(), 0);
    }

    #[test_log::test]
    fn test_set_wakes_all_current_waiters() {
        let event = Arc::new(Event::new());
        let woken = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let event = event.clone();
                let woken = woken.clone();
                std::thread::spawn(move || {
                    event.wait();
                    woken.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        let event_check = event.clone();
        wait_for_condition(
            || event_check.waiters() == 3,
            Duration::from_secs(5),
            "all three waiters to park",
        )
        .expect("waiters should park");

        event.set();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(woken.load(Ordering::SeqCst), 3);
        assert_eq!(event.waiters(), 0);
    }

    #[test_log::test]
    fn test_clear_makes_future_waits_block_again() {
        let event = Arc::new(Event::new());

        event.set();
        event.clear();
        assert!(!event.is_set());

        let woken = Arc::new(AtomicUsize::new(0));
        let handle = {
            let event = event.clone();
            let woken = woken.clone();
            std::thread::spawn(move || {
                event.wait();
                woken.fetch_add(1, Ordering::SeqCst);
            })
        };

        let event_check = event.clone();
        wait_for_condition(
            || event_check.waiters() == 1,
            Duration::from_secs(5),
            "waiter to park",
        )
        .expect("waiter should park");

        // The earlier set() was cleared and must not leak through.
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(woken.load(Ordering::SeqCst), 0);

        event.set();
        handle.join().unwrap();
        assert_eq!(woken.load(Ordering::SeqCst), 1);
    }

    #[test_log::test]
    fn test_value_event_try_wait_is_none_before_send() {
        let event = ValueEvent::<String>::new();

        assert_eq!(event.try_wait(), None);
        assert!(!event.is_set());
    }

    #[test_log::test]
    fn test_value_event_delivers_sent_value_across_threads() {
        let event = Arc::new(ValueEvent::new());

        let consumer = {
            let event = event.clone();
            std::thread::spawn(move || event.wait())
        };

        event.send(42);
        assert_eq!(consumer.join().unwrap(), 42);
        assert_eq!(event.try_wait(), Some(42));
    }

    #[test_log::test]
    fn test_value_event_last_send_wins() {
        let event = ValueEvent::new();

        event.send(1);
        event.send(2);

        assert_eq!(event.wait(), 2);
    }

    #[test_log::test]
    fn test_value_event_clear_keeps_the_stored_value() {
        let event = ValueEvent::new();

        event.send(7);
        event.clear();

        assert!(!event.is_set());
        assert_eq!(event.try_wait(), None);

        event.set();
        assert_eq!(event.try_wait(), Some(7));
    }

    #[test_log::test]
    #[should_panic(expected = "without a value")]
    fn test_value_event_wait_panics_when_set_without_send() {
        let event = ValueEvent::<String>::new();

        event.set();
        let _ = event.wait();
    }

    #[test_log::test]
    fn test_event_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Event>();
        assert_sync::<Event>();
        assert_send::<ValueEvent<String>>();
        assert_sync::<ValueEvent<String>>();
    }
}
