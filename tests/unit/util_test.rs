//! Tests for utility functions and shared bookkeeping types

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use procsched::core::{JobQueue, ProcessRegistry, ResourceBudget};
use procsched::util::{secs_between, Clock, MonotonicClock};
use proptest::prelude::*;
use rand::Rng;

#[test]
fn test_secs_between() {
    let start = Instant::now();
    let end = start + Duration::from_millis(2500);
    assert!((secs_between(start, end) - 2.5).abs() < 1e-9);
    assert!(secs_between(end, start).abs() < f64::EPSILON);
}

#[test]
fn test_monotonic_clock() {
    let clock = MonotonicClock;
    let a = clock.now();
    thread::sleep(Duration::from_millis(2));
    assert!(clock.now() > a);
}

#[test]
fn test_queue_fifo_and_scan() {
    let mut queue: JobQueue = (0..5).collect();
    assert_eq!(queue.dequeue(), Some(0));
    queue.scan(|id| id % 2 == 1);
    assert_eq!(queue.snapshot(), vec![1, 3]);
    queue.enqueue(0);
    assert_eq!(queue.snapshot(), vec![1, 3, 0]);
}

#[test]
fn test_registry_register_and_remove() {
    let mut registry = ProcessRegistry::new();
    assert_eq!(registry.register(500, 2), None);
    assert_eq!(registry.register(500, 3), Some(2));
    assert_eq!(registry.remove(500), Some(3));
    assert_eq!(registry.remove(500), None);
    assert!(registry.is_empty());
}

#[test]
fn test_budget_random_contention() {
    let budget = Arc::new(ResourceBudget::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let budget = Arc::clone(&budget);
            thread::spawn(move || {
                let mut rng = rand::rng();
                for _ in 0..500 {
                    let cores = rng.random_range(1..=3);
                    if budget.try_admit(cores) {
                        assert!(budget.in_use() <= 8);
                        budget.release(cores);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(budget.in_use(), 0);
    assert!(budget.peak() <= 8);
}

proptest! {
    #[test]
    fn prop_budget_never_overcommits(total in 1u32..16, requests in prop::collection::vec(1u32..8, 0..40)) {
        let budget = ResourceBudget::new(total);
        let mut held = Vec::new();
        for cores in requests {
            if budget.try_admit(cores) {
                held.push(cores);
            } else {
                prop_assert!(budget.in_use() + cores > total);
            }
            prop_assert!(budget.in_use() <= total);
        }
        prop_assert_eq!(budget.in_use(), held.iter().sum::<u32>());
        for cores in held {
            budget.release(cores);
        }
        prop_assert_eq!(budget.in_use(), 0);
        prop_assert!(budget.peak() <= total);
    }
}
