//! Blocking FIFO queue with an optional capacity bound.
//!
//! [`BoundedQueue`] is built from the crate's own pieces rather than an OS
//! channel: a buffer behind a `Mutex` plus two [`Event`]s, `not_empty` for
//! consumers and `not_full` for producers. Producers park on `not_full` when
//! the buffer is at capacity, consumers park on `not_empty` when it is empty,
//! and each side re-arms the event it consumed once the buffer says the
//! condition no longer holds.
//!
//! Every event transition happens while the buffer lock is held, so event
//! state can never disagree with the buffer in a way that strands a sleeper.
//! Waits happen with the buffer lock released, so a parked thread never
//! blocks the peer that would wake it.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::event::Event;

/// Error returned when a blocking put fails.
#[derive(Debug, thiserror::Error)]
pub enum SendError<T> {
    /// The queue has been closed. Carries the rejected item.
    #[error("Closed")]
    Closed(T),
}

/// Error returned when a non-blocking put fails.
#[derive(Debug, thiserror::Error)]
pub enum TrySendError<T> {
    /// The queue is at capacity. Carries the rejected item.
    #[error("Full")]
    Full(T),
    /// The queue has been closed. Carries the rejected item.
    #[error("Closed")]
    Closed(T),
}

/// Error returned when a blocking get fails.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RecvError {
    /// The queue has been closed and fully drained.
    #[error("Closed")]
    Closed,
}

/// Error returned when a non-blocking get fails.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TryRecvError {
    /// The queue is currently empty.
    #[error("Empty")]
    Empty,
    /// The queue has been closed and fully drained.
    #[error("Closed")]
    Closed,
}

impl<T> From<SendError<T>> for TrySendError<T> {
    fn from(e: SendError<T>) -> Self {
        match e {
            SendError::Closed(t) => Self::Closed(t),
        }
    }
}

impl From<RecvError> for TryRecvError {
    fn from(_: RecvError) -> Self {
        Self::Closed
    }
}

/// A first-in-first-out queue that blocks producers at capacity and
/// consumers at empty.
///
/// Capacity `0` means unbounded: producers never block on fullness. The
/// queue is closed explicitly with [`BoundedQueue::close`]; after that,
/// producers are refused, consumers drain whatever is still buffered, and
/// everyone parked is woken to observe the close.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use lockstep_sync::BoundedQueue;
///
/// let queue = Arc::new(BoundedQueue::bounded(2));
///
/// let consumer = {
///     let queue = queue.clone();
///     std::thread::spawn(move || {
///         let mut received = Vec::new();
///         while let Ok(item) = queue.get() {
///             received.push(item);
///         }
///         received
///     })
/// };
///
/// queue.put(1).unwrap();
/// queue.put(2).unwrap();
/// queue.close();
///
/// assert_eq!(consumer.join().unwrap(), vec![1, 2]);
/// ```
#[derive(Debug)]
pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,
    not_empty: Event,
    not_full: Event,
}

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    capacity: usize,
    closed: bool,
}

impl<T> QueueState<T> {
    fn has_room(&self) -> bool {
        self.capacity == 0 || self.items.len() < self.capacity
    }
}

impl<T> BoundedQueue<T> {
    /// Creates an open queue holding at most `capacity` items, where `0`
    /// means unbounded.
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        let queue = Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                capacity,
                closed: false,
            }),
            not_empty: Event::new(),
            not_full: Event::new(),
        };

        // A fresh queue always has room.
        queue.not_full.set();
        queue
    }

    /// Creates an open queue with no capacity bound.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::bounded(0)
    }

    /// Appends `item`, parking the calling thread while the queue is at
    /// capacity.
    ///
    /// # Errors
    ///
    /// * Returns `SendError::Closed` carrying the item back if the queue has
    ///   been closed
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    pub fn put(&self, item: T) -> Result<(), SendError<T>> {
        loop {
            self.not_full.wait();
            let mut state = self.state.lock().unwrap();

            if state.closed {
                return Err(SendError::Closed(item));
            }

            if state.has_room() {
                state.items.push_back(item);
                if !state.has_room() {
                    self.not_full.clear();
                }
                self.not_empty.set();
                return Ok(());
            }

            // Another producer filled the last slot first; re-arm and park.
            self.not_full.clear();
        }
    }

    /// Makes exactly one non-blocking attempt to append `item`.
    ///
    /// # Errors
    ///
    /// * Returns `TrySendError::Full` carrying the item back if the queue is
    ///   at capacity
    /// * Returns `TrySendError::Closed` carrying the item back if the queue
    ///   has been closed
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    pub fn try_put(&self, item: T) -> Result<(), TrySendError<T>> {
        let mut state = self.state.lock().unwrap();

        if state.closed {
            return Err(TrySendError::Closed(item));
        }

        if !state.has_room() {
            return Err(TrySendError::Full(item));
        }

        state.items.push_back(item);
        if !state.has_room() {
            self.not_full.clear();
        }
        self.not_empty.set();
        Ok(())
    }

    /// Removes and returns the oldest item, parking the calling thread while
    /// the queue is empty.
    ///
    /// A closed queue keeps delivering until the buffer is drained.
    ///
    /// # Errors
    ///
    /// * Returns `RecvError::Closed` once the queue is closed and empty
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    pub fn get(&self) -> Result<T, RecvError> {
        loop {
            self.not_empty.wait();
            let mut state = self.state.lock().unwrap();

            if let Some(item) = state.items.pop_front() {
                if state.items.is_empty() && !state.closed {
                    self.not_empty.clear();
                }
                if state.has_room() {
                    self.not_full.set();
                }
                return Ok(item);
            }

            if state.closed {
                return Err(RecvError::Closed);
            }

            // Another consumer drained the buffer first; re-arm and park.
            self.not_empty.clear();
        }
    }

    /// Makes exactly one non-blocking attempt to remove the oldest item.
    ///
    /// # Errors
    ///
    /// * Returns `TryRecvError::Empty` if the queue is open and empty
    /// * Returns `TryRecvError::Closed` once the queue is closed and empty
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    pub fn try_get(&self) -> Result<T, TryRecvError> {
        let mut state = self.state.lock().unwrap();

        if let Some(item) = state.items.pop_front() {
            if state.items.is_empty() && !state.closed {
                self.not_empty.clear();
            }
            if state.has_room() {
                self.not_full.set();
            }
            return Ok(item);
        }

        if state.closed {
            Err(TryRecvError::Closed)
        } else {
            Err(TryRecvError::Empty)
        }
    }

    /// Changes the capacity bound, where `0` means unbounded.
    ///
    /// Growing (or unbounding) a full queue releases parked producers.
    /// Shrinking below the current length refuses new items until consumers
    /// drain the overage; already buffered items are kept.
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    pub fn set_capacity(&self, capacity: usize) {
        let mut state = self.state.lock().unwrap();
        state.capacity = capacity;
        log::debug!(
            "set_capacity: capacity now {capacity} with {} item(s) buffered",
            state.items.len()
        );

        if state.closed {
            return;
        }

        if state.has_room() {
            self.not_full.set();
        } else {
            self.not_full.clear();
        }
    }

    /// Closes the queue. Idempotent.
    ///
    /// Producers are refused from here on; consumers drain the remaining
    /// items and then observe `Closed`. Everyone currently parked in
    /// [`BoundedQueue::put`] or [`BoundedQueue::get`] is woken.
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();

        if state.closed {
            return;
        }

        state.closed = true;
        log::debug!("close: queue closed with {} item(s) buffered", state.items.len());

        // Force both events so every parked thread re-checks and sees the
        // close.
        self.not_empty.set();
        self.not_full.set();
    }

    /// Returns whether the queue has been closed (snapshot).
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    /// Returns the capacity bound, where `0` means unbounded (snapshot).
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.state.lock().unwrap().capacity
    }

    /// Returns the number of buffered items (snapshot).
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    /// Returns whether no items are buffered (snapshot).
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().items.is_empty()
    }

    /// Returns whether the queue is at (or, after a shrink, over) capacity
    /// (snapshot). An unbounded queue is never full.
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    #[must_use]
    pub fn is_full(&self) -> bool {
        !self.state.lock().unwrap().has_room()
    }

    /// Returns the number of consumers currently parked in
    /// [`BoundedQueue::get`] (snapshot).
    ///
    /// # Panics
    ///
    /// * If an internal mutex is poisoned
    #[must_use]
    pub fn waiters(&self) -> usize {
        self.not_empty.waiters()
    }
}

impl<T> Default for BoundedQueue<T> {
    /// An unbounded queue.
    fn default() -> Self {
        Self::unbounded()
    }
}
