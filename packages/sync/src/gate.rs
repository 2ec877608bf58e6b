//! Open/closed passage built on [`Event`].

use crate::event::Event;

/// A passage that threads walk through while open and park at while closed.
///
/// This is an [`Event`] wearing door-shaped names: [`Gate::open`] sets the
/// flag, [`Gate::close`] clears it, and [`Gate::go_through`] waits on it. A
/// new gate starts open, so an unconfigured gate never stalls anyone; callers
/// that want a barrier [`Gate::close`] it explicitly.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use lockstep_sync::Gate;
///
/// let gate = Arc::new(Gate::new());
/// gate.close();
///
/// let worker = {
///     let gate = gate.clone();
///     std::thread::spawn(move || {
///         gate.go_through();
///         "through"
///     })
/// };
///
/// gate.open();
/// assert_eq!(worker.join().unwrap(), "through");
/// ```
#[derive(Debug)]
pub struct Gate {
    event: Event,
}

impl Gate {
    /// Creates an open gate.
    #[must_use]
    pub fn new() -> Self {
        let event = Event::new();
        event.set();
        Self { event }
    }

    /// Passes through the gate, parking the calling thread while it is
    /// closed.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn go_through(&self) {
        self.event.wait();
    }

    /// Makes exactly one non-blocking attempt to pass through.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn try_go_through(&self) -> bool {
        self.event.try_wait()
    }

    /// Alias for [`Gate::go_through`].
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn wait(&self) {
        self.go_through();
    }

    /// Alias for [`Gate::try_go_through`].
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn try_wait(&self) -> bool {
        self.try_go_through()
    }

    /// Opens the gate, waking every thread parked at it.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn open(&self) {
        self.event.set();
    }

    /// Closes the gate. Threads already through are unaffected.
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    pub fn close(&self) {
        self.event.clear();
    }

    /// Returns whether the gate is currently open (snapshot).
    ///
    /// # Panics
    ///
    /// * If the internal mutex is poisoned
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.event.is_set()
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}
