//! Blocking synchronization primitives for threads.
//!
//! This crate provides classic signal-and-wait coordination for preemptive
//! OS threads: counting semaphores and locks, a standalone condition,
//! level-triggered events (plain, value-carrying, and gate-shaped), a
//! scope-bound release guard, and a blocking FIFO queue assembled from those
//! pieces. Every operation blocks the calling thread; nothing here is async
//! and nothing takes a timeout.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lockstep_sync::BoundedQueue;
//!
//! let queue = Arc::new(BoundedQueue::bounded(4));
//!
//! let consumer = {
//!     let queue = queue.clone();
//!     std::thread::spawn(move || {
//!         let mut total = 0;
//!         while let Ok(item) = queue.get() {
//!             total += item;
//!         }
//!         total
//!     })
//! };
//!
//! for i in 1..=10 {
//!     queue.put(i).unwrap();
//! }
//! queue.close();
//!
//! assert_eq!(consumer.join().unwrap(), 55);
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod condition;
pub mod event;
pub mod gate;
pub mod guard;
pub mod queue;
pub mod rlock;
pub mod semaphore;

#[cfg(test)]
pub(crate) mod test_support;

pub use condition::Condition;
pub use event::{Event, ValueEvent};
pub use gate::Gate;
pub use guard::{Acquire, ScopedLock};
pub use queue::{BoundedQueue, RecvError, SendError, TryRecvError, TrySendError};
pub use rlock::ReentrantLock;
pub use semaphore::{Lock, Semaphore};
