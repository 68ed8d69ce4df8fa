//! FIFO queue of jobs awaiting dispatch.

use std::collections::VecDeque;

use crate::core::job::JobId;

/// Ordered sequence of pending jobs.
///
/// Insertion order decides FCFS priority and round-robin rotation. The queue
/// holds ids only; the records live in the run's job table. Callers that
/// share the queue between workers guard it with the run's state lock.
#[derive(Debug, Default, Clone)]
pub struct JobQueue {
    jobs: VecDeque<JobId>,
}

impl JobQueue {
    /// Empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            jobs: VecDeque::new(),
        }
    }

    /// Append to the back.
    pub fn enqueue(&mut self, job: JobId) {
        debug_assert!(!self.jobs.contains(&job), "job {job} queued twice");
        self.jobs.push_back(job);
    }

    /// Remove and return the front.
    pub fn dequeue(&mut self) -> Option<JobId> {
        self.jobs.pop_front()
    }

    /// Whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Number of waiting jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Visit every queued job front to back, keeping those for which `keep`
    /// returns `true` in their original relative order.
    pub fn scan<F>(&mut self, mut keep: F)
    where
        F: FnMut(JobId) -> bool,
    {
        self.jobs.retain(|&job| keep(job));
    }

    /// Snapshot of queued ids, front first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<JobId> {
        self.jobs.iter().copied().collect()
    }
}

impl FromIterator<JobId> for JobQueue {
    fn from_iter<I: IntoIterator<Item = JobId>>(iter: I) -> Self {
        Self {
            jobs: iter.into_iter().collect(),
        }
    }
}
