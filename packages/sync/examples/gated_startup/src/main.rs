#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Coordinated worker startup using `lockstep_sync` primitives.
//!
//! This binary demonstrates:
//! - Holding a pool of workers at a closed `Gate` until setup finishes
//! - Publishing shared configuration to all of them through a `ValueEvent`
//! - Bounding how many work at once with a `Semaphore` and scoped guards
//!
//! # Usage
//!
//! ```bash
//! cargo run --package lockstep_gated_startup
//! ```

use std::sync::Arc;
use std::time::Duration;

use lockstep_sync::{Acquire, Gate, Semaphore, ValueEvent};

const WORKERS: usize = 5;
const WORK_SLOTS: usize = 2;

/// Everything a worker needs to start, produced by the setup phase.
#[derive(Debug, Clone)]
struct WorkerConfig {
    service_name: String,
    batch_size: usize,
}

/// Parks at the gate, picks up the published config, then does one slot-bound
/// unit of work.
fn run_worker(
    worker: usize,
    gate: &Gate,
    config: &ValueEvent<WorkerConfig>,
    slots: &Semaphore,
) {
    println!("worker {worker}: waiting at the gate");
    gate.go_through();

    let config = config.wait();
    log::debug!("worker {worker}: received config {config:?}");

    let _slot = slots.scoped();
    println!(
        "worker {worker}: processing {} items for {}",
        config.batch_size, config.service_name
    );
    std::thread::sleep(Duration::from_millis(20));
    println!("worker {worker}: done");
}

fn main() {
    pretty_env_logger::init();

    println!("=== Gated startup ===");
    println!("{WORKERS} workers, {WORK_SLOTS} concurrent work slots\n");

    let gate = Arc::new(Gate::new());
    let config = Arc::new(ValueEvent::new());
    let slots = Arc::new(Semaphore::new(WORK_SLOTS));

    // Workers launched before setup must not run yet.
    gate.close();

    let workers: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let gate = gate.clone();
            let config = config.clone();
            let slots = slots.clone();
            std::thread::spawn(move || run_worker(worker, &gate, &config, &slots))
        })
        .collect();

    // Simulated setup work while every worker is parked.
    println!("main: loading configuration...");
    std::thread::sleep(Duration::from_millis(100));
    config.send(WorkerConfig {
        service_name: "lockstep-demo".to_string(),
        batch_size: 32,
    });

    println!("main: opening the gate\n");
    gate.open();

    for worker in workers {
        worker.join().unwrap();
    }

    println!("\n=== all workers finished ===");
}
