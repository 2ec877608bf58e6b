use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::{Duration, Instant};

use lockstep_sync::{Acquire, Condition, Gate, Lock, Semaphore, ValueEvent};

fn wait_for_condition(
    condition: impl Fn() -> bool,
    timeout: Duration,
    description: &str,
) -> Result<(), String> {
    let start = Instant::now();

    while start.elapsed() < timeout {
        if condition() {
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(1));
    }

    Err(format!(
        "Timeout after {timeout:?} waiting for {description}"
    ))
}

#[test_log::test]
fn test_gated_workers_all_start_after_open() {
    const WORKERS: usize = 5;

    let gate = Arc::new(Gate::new());
    gate.close();

    let started = Arc::new(AtomicUsize::new(0));
    let workers: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let gate = gate.clone();
            let started = started.clone();
            std::thread::spawn(move || {
                gate.go_through();
                started.fetch_add(1, Ordering::SeqCst);
                worker
            })
        })
        .collect();

    // Nobody runs until the gate opens.
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(started.load(Ordering::SeqCst), 0);

    gate.open();

    let mut finished: Vec<usize> = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .collect();
    finished.sort_unstable();

    assert_eq!(started.load(Ordering::SeqCst), WORKERS);
    assert_eq!(finished, (0..WORKERS).collect::<Vec<usize>>());
}

#[test_log::test]
fn test_semaphore_bounds_concurrent_workers() {
    const SLOTS: usize = 2;
    const WORKERS: usize = 6;

    let slots = Arc::new(Semaphore::new(SLOTS));
    let active = Arc::new(AtomicUsize::new(0));
    let max_active = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..WORKERS)
        .map(|_| {
            let slots = slots.clone();
            let active = active.clone();
            let max_active = max_active.clone();
            std::thread::spawn(move || {
                let _slot = slots.scoped();
                let now_active = active.fetch_add(1, Ordering::SeqCst) + 1;
                max_active.fetch_max(now_active, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(10));
                active.fetch_sub(1, Ordering::SeqCst);
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert!(
        max_active.load(Ordering::SeqCst) <= SLOTS,
        "more than {SLOTS} workers ran at once"
    );
    assert_eq!(slots.available_permits(), SLOTS);
}

#[test_log::test]
fn test_value_event_fans_out_one_payload_to_all_waiters() {
    const WORKERS: usize = 3;

    let config = Arc::new(ValueEvent::new());

    let workers: Vec<_> = (0..WORKERS)
        .map(|_| {
            let config = config.clone();
            std::thread::spawn(move || config.wait())
        })
        .collect();

    // Give the workers time to park before publishing.
    std::thread::sleep(Duration::from_millis(50));
    config.send("primary".to_string());

    for worker in workers {
        assert_eq!(worker.join().unwrap(), "primary");
    }
}

#[test_log::test]
fn test_condition_batches_release_the_requested_counts() {
    const WAITERS: usize = 5;

    let condition = Arc::new(Condition::new());
    let woken = Arc::new(AtomicUsize::new(0));

    let waiters: Vec<_> = (0..WAITERS)
        .map(|_| {
            let condition = condition.clone();
            let woken = woken.clone();
            std::thread::spawn(move || {
                condition.wait();
                woken.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    let condition_check = condition.clone();
    wait_for_condition(
        || condition_check.waiters() == WAITERS,
        Duration::from_secs(5),
        "all waiters to park",
    )
    .expect("waiters should park");

    // Release in two batches, then sweep up the rest.
    condition.notify(2);
    let woken_check = woken.clone();
    wait_for_condition(
        || woken_check.load(Ordering::SeqCst) == 2,
        Duration::from_secs(5),
        "the first batch to wake",
    )
    .expect("two waiters should wake");

    condition.notify(1);
    let woken_check = woken.clone();
    wait_for_condition(
        || woken_check.load(Ordering::SeqCst) == 3,
        Duration::from_secs(5),
        "the second batch to wake",
    )
    .expect("one more waiter should wake");

    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(woken.load(Ordering::SeqCst), 3);

    condition.notify_all();
    for waiter in waiters {
        waiter.join().unwrap();
    }
    assert_eq!(woken.load(Ordering::SeqCst), WAITERS);
}

#[test_log::test]
fn test_scoped_guards_keep_the_lock_usable_after_a_worker_panics() {
    const WORKERS: usize = 4;
    const ROUNDS: usize = 20;

    let lock = Arc::new(Lock::new());
    let holders = Arc::new(AtomicUsize::new(0));
    let max_holders = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let lock = lock.clone();
            let holders = holders.clone();
            let max_holders = max_holders.clone();
            std::thread::spawn(move || {
                for round in 0..ROUNDS {
                    let _guard = lock.scoped();
                    let concurrent = holders.fetch_add(1, Ordering::SeqCst) + 1;
                    max_holders.fetch_max(concurrent, Ordering::SeqCst);
                    holders.fetch_sub(1, Ordering::SeqCst);

                    // One worker dies mid-run; its guard must still release.
                    if worker == 0 && round == ROUNDS / 2 {
                        panic!("worker 0 failed while holding the lock");
                    }
                }
            })
        })
        .collect();

    let mut panics = 0;
    for worker in workers {
        if worker.join().is_err() {
            panics += 1;
        }
    }

    assert_eq!(panics, 1);
    assert_eq!(max_holders.load(Ordering::SeqCst), 1);
    assert!(!lock.is_locked());
    assert!(lock.try_acquire());
    lock.release();
}
