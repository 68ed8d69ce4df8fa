//! Core-unit budget with lock-free admission.

use std::sync::atomic::{AtomicU32, Ordering};

/// Tracks how many of the configured cores are charged to running jobs.
///
/// Uses an `AtomicU32` for `in_use` so that the check and the debit in
/// [`ResourceBudget::try_admit`] are a single compare-and-swap. Two callers can
/// never both observe room for requests whose sum exceeds what is free.
#[derive(Debug)]
pub struct ResourceBudget {
    total: u32,
    in_use: AtomicU32,
    /// High-water mark of `in_use`.
    peak: AtomicU32,
}

impl ResourceBudget {
    /// Budget with `total` free cores.
    #[must_use]
    pub const fn new(total: u32) -> Self {
        Self {
            total,
            in_use: AtomicU32::new(0),
            peak: AtomicU32::new(0),
        }
    }

    /// Debit `cores` if that many are free. Returns `false` without side
    /// effects otherwise.
    pub fn try_admit(&self, cores: u32) -> bool {
        let mut current = self.in_use.load(Ordering::Acquire);
        loop {
            let Some(next) = current.checked_add(cores).filter(|&n| n <= self.total) else {
                return false;
            };
            match self.in_use.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.peak.fetch_max(next, Ordering::AcqRel);
                    tracing::trace!(cores, in_use = next, "cores debited");
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Credit back cores previously debited by [`ResourceBudget::try_admit`].
    pub fn release(&self, cores: u32) {
        let result = self
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                cur.checked_sub(cores)
            });
        match result {
            Ok(prev) => tracing::trace!(cores, in_use = prev - cores, "cores credited"),
            Err(cur) => tracing::error!(
                cores,
                in_use = cur,
                "release exceeds charged cores; budget left unchanged"
            ),
        }
    }

    /// Whether a job of this size could ever be admitted.
    #[must_use]
    pub const fn fits(&self, cores: u32) -> bool {
        cores <= self.total
    }

    /// Configured total.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Cores currently charged.
    #[must_use]
    pub fn in_use(&self) -> u32 {
        self.in_use.load(Ordering::Acquire)
    }

    /// Cores currently free.
    #[must_use]
    pub fn available(&self) -> u32 {
        self.total - self.in_use()
    }

    /// Largest number of cores ever charged at once.
    #[must_use]
    pub fn peak(&self) -> u32 {
        self.peak.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_admit_and_release() {
        let budget = ResourceBudget::new(4);
        assert!(budget.try_admit(3));
        assert!(!budget.try_admit(2));
        assert_eq!(budget.available(), 1);
        assert!(budget.try_admit(1));
        assert_eq!(budget.available(), 0);

        budget.release(3);
        assert_eq!(budget.available(), 3);
        assert_eq!(budget.peak(), 4);
    }

    #[test]
    fn test_failed_admit_has_no_side_effects() {
        let budget = ResourceBudget::new(2);
        assert!(!budget.try_admit(3));
        assert_eq!(budget.in_use(), 0);
        assert_eq!(budget.peak(), 0);
    }

    #[test]
    fn test_over_release_is_ignored() {
        let budget = ResourceBudget::new(2);
        assert!(budget.try_admit(1));
        budget.release(2);
        assert_eq!(budget.in_use(), 1);
    }

    #[test]
    fn test_fits() {
        let budget = ResourceBudget::new(2);
        assert!(budget.fits(2));
        assert!(!budget.fits(3));
    }

    #[test]
    fn test_concurrent_admission_never_overcommits() {
        let budget = Arc::new(ResourceBudget::new(3));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let budget = Arc::clone(&budget);
                thread::spawn(move || {
                    let cores = 1 + (i % 2);
                    for _ in 0..2_000 {
                        if budget.try_admit(cores) {
                            assert!(budget.in_use() <= budget.total());
                            budget.release(cores);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(budget.in_use(), 0);
        assert!(budget.peak() <= 3);
    }
}
