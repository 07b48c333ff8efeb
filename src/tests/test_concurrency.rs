use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

use crate::{DelayOrigin, SleepingTicker, SmoothRateLimiter, SystemTicker, VirtualRateLimiter};

/// A ticker frozen at instant 0 that only counts requested sleeps.
#[derive(Default)]
struct FrozenTicker {
    slept_micros: AtomicU64,
}

impl SleepingTicker for FrozenTicker {
    fn read(&self) -> u64 {
        0
    }

    fn sleep_micros_uninterruptibly(&self, micros: u64) {
        self.slept_micros.fetch_add(micros, Ordering::Relaxed);
    }
}

#[test]
fn concurrent_acquisitions_reserve_each_permit_exactly_once() {
    let threads = 8u64;
    let per_thread = 50u64;
    let interval_micros = 10_000u64;

    let ticker = Arc::new(FrozenTicker::default());
    let limiter = Arc::new(SmoothRateLimiter::create(Arc::clone(&ticker), 100.0).unwrap());
    let waits = Arc::new(Mutex::new(Vec::new()));

    let handles = (0..threads)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            let waits = Arc::clone(&waits);
            thread::spawn(move || {
                for _ in 0..per_thread {
                    let waited = limiter.acquire();
                    waits.lock().push((waited * 1_000_000f64).round() as u64);
                }
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.join().unwrap();
    }

    // Time never moves, so every grant must land on its own slot: 0, 1, 2, ... intervals.
    let total = threads * per_thread;
    let mut waits = waits.lock().clone();
    waits.sort_unstable();

    let expected = (0..total).map(|i| i * interval_micros).collect::<Vec<_>>();
    assert_eq!(waits, expected);
    assert_eq!(limiter.next_free_ticket_micros(), total * interval_micros);
    assert_eq!(
        ticker.slept_micros.load(Ordering::Relaxed),
        expected.iter().sum::<u64>()
    );
}

#[test]
fn concurrent_try_acquire_grants_at_most_one_immediate_permit() {
    let ticker = Arc::new(FrozenTicker::default());
    let limiter = Arc::new(SmoothRateLimiter::create(Arc::clone(&ticker), 1.0).unwrap());
    let granted = Arc::new(AtomicU64::new(0));

    let handles = (0..16)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            let granted = Arc::clone(&granted);
            thread::spawn(move || {
                if limiter.try_acquire() {
                    granted.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(granted.load(Ordering::Relaxed), 1);
    assert_eq!(ticker.slept_micros.load(Ordering::Relaxed), 0);
}

#[test]
fn virtual_limiter_is_shareable_across_threads() {
    let rl = Arc::new(VirtualRateLimiter::new(10.0).unwrap());

    let handles = (0..4)
        .map(|_| {
            let rl = Arc::clone(&rl);
            thread::spawn(move || {
                for _ in 0..5 {
                    rl.limiter().acquire();
                }
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.join().unwrap();
    }

    // 20 permits, the first one free: at most 19 limiter-imposed sleeps.
    let events = rl.drain_delay_events();
    assert!(!events.is_empty());
    assert!(events.len() <= 19);
    assert!(
        events
            .iter()
            .all(|event| event.origin() == DelayOrigin::Limiter)
    );
}

#[test]
fn system_ticker_throttles_real_threads() {
    let start = Instant::now();
    let limiter = Arc::new(SmoothRateLimiter::create(SystemTicker::new(), 200.0).unwrap());

    let handles = (0..4)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            thread::spawn(move || {
                for _ in 0..10 {
                    limiter.acquire();
                }
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.join().unwrap();
    }

    // 40 permits at 5ms each, the first one free. Oversleeping threads may bank a few
    // milliseconds of credit.
    assert!(start.elapsed() >= Duration::from_millis(150));
}

#[test]
fn system_ticker_is_monotonic_and_sleeps() {
    let ticker = SystemTicker::new();

    let before = ticker.read();
    ticker.sleep_micros_uninterruptibly(2_000);
    let after = ticker.read();

    assert!(after >= before + 2_000_000);
}
