#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Producer/consumer pipeline over a `lockstep_sync::BoundedQueue`.
//!
//! This binary demonstrates:
//! - Producers blocking on a small queue until consumers make room
//! - Consumers draining the queue until it is closed
//! - `try_put` refusing items without blocking while the queue is full
//! - `close()` handing blocked threads a clean shutdown signal
//!
//! # Usage
//!
//! ```bash
//! cargo run --package lockstep_producer_consumer
//! ```

use std::sync::Arc;
use std::time::Duration;

use lockstep_sync::{BoundedQueue, SendError, TrySendError};

const PRODUCERS: usize = 2;
const CONSUMERS: usize = 2;
const ITEMS_PER_PRODUCER: usize = 10;
const QUEUE_CAPACITY: usize = 3;

/// Errors that can occur when running the pipeline example.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The queue was closed while a producer was still sending.
    #[error(transparent)]
    Send(#[from] SendError<(usize, usize)>),
}

/// Feeds `count` numbered items into the queue, blocking whenever it is at
/// capacity.
fn produce(
    queue: &BoundedQueue<(usize, usize)>,
    producer: usize,
    count: usize,
) -> Result<(), SendError<(usize, usize)>> {
    for sequence in 0..count {
        queue.put((producer, sequence))?;
        log::debug!("producer {producer}: queued item {sequence}");
    }

    println!("producer {producer}: done ({count} items queued)");
    Ok(())
}

/// Drains the queue until `close()` ends the stream, simulating a slow
/// worker so the producers hit the capacity bound.
fn consume(queue: &BoundedQueue<(usize, usize)>, consumer: usize) -> usize {
    let mut handled = 0;

    while let Ok((producer, sequence)) = queue.get() {
        println!("consumer {consumer}: item {sequence} from producer {producer}");
        std::thread::sleep(Duration::from_millis(5));
        handled += 1;
    }

    println!("consumer {consumer}: queue closed ({handled} items handled)");
    handled
}

fn main() -> Result<(), Error> {
    pretty_env_logger::init();

    println!("=== Bounded queue pipeline ===");
    println!(
        "{PRODUCERS} producers x {ITEMS_PER_PRODUCER} items -> capacity {QUEUE_CAPACITY} -> {CONSUMERS} consumers\n"
    );

    let queue = Arc::new(BoundedQueue::bounded(QUEUE_CAPACITY));

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|consumer| {
            let queue = queue.clone();
            std::thread::spawn(move || consume(&queue, consumer))
        })
        .collect();

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let queue = queue.clone();
            std::thread::spawn(move || produce(&queue, producer, ITEMS_PER_PRODUCER))
        })
        .collect();

    for producer in producers {
        producer.join().unwrap()?;
    }

    // The producers are done; show the non-blocking refusal on a queue the
    // consumers have not finished draining.
    let extra = match queue.try_put((99, 99)) {
        Ok(()) => {
            println!("\ntry_put: the queue had room left");
            1
        }
        Err(TrySendError::Full(_)) => {
            println!("\ntry_put: refused, queue full");
            0
        }
        Err(TrySendError::Closed(_)) => {
            println!("\ntry_put: refused, queue closed");
            0
        }
    };

    println!("closing the queue...");
    queue.close();

    let handled: usize = consumers
        .into_iter()
        .map(|consumer| consumer.join().unwrap())
        .sum();

    let expected = PRODUCERS * ITEMS_PER_PRODUCER + extra;
    println!("\n=== {handled} of {expected} items delivered, nothing lost ===");

    Ok(())
}
