//! Bounded worker pool
//!
//! A fixed number of workers drain a shared FIFO queue, each awaiting its
//! current item before taking the next one. All workers are polled on the
//! caller's task, so "concurrent" means interleaved at await points; at most
//! `concurrency` units of work are ever in flight.
//!
//! The pool does not look at what the unit of work returns. Callers that
//! need failure isolation return an outcome type instead of erroring.

use std::collections::VecDeque;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors raised when building a worker pool
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("worker pool concurrency must be at least 1")]
    ZeroConcurrency,
}

/// Runs a unit of work over a queue of items with a fixed concurrency ceiling
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    concurrency: NonZeroUsize,
}

impl WorkerPool {
    /// Creates a pool with `concurrency` workers
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ZeroConcurrency`] when `concurrency` is 0.
    pub fn new(concurrency: usize) -> Result<Self, PoolError> {
        NonZeroUsize::new(concurrency)
            .map(|concurrency| Self { concurrency })
            .ok_or(PoolError::ZeroConcurrency)
    }

    /// Number of workers started per run
    pub fn concurrency(&self) -> usize {
        self.concurrency.get()
    }

    /// Applies `unit_of_work` to every item and collects the results
    ///
    /// Each item is taken by exactly one worker. Results are appended in
    /// completion order, not input order.
    ///
    /// # Example
    ///
    /// ```
    /// use dataset_mirror::crawler::WorkerPool;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let pool = WorkerPool::new(2).unwrap();
    /// let mut doubled = pool.run(vec![1, 2, 3], |n| async move { n * 2 }).await;
    /// doubled.sort();
    /// assert_eq!(doubled, vec![2, 4, 6]);
    /// # }
    /// ```
    pub async fn run<T, M, F, Fut>(
        &self,
        items: impl IntoIterator<Item = T>,
        unit_of_work: F,
    ) -> Vec<M>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = M>,
    {
        let queue = Mutex::new(items.into_iter().collect::<VecDeque<T>>());
        let results = Mutex::new(Vec::with_capacity(queue_len(&queue)));

        tracing::debug!(
            "Starting {} workers over {} items",
            self.concurrency,
            queue_len(&queue)
        );

        let workers = (0..self.concurrency.get()).map(|worker| {
            let queue = &queue;
            let results = &results;
            let unit_of_work = &unit_of_work;

            async move {
                let mut processed = 0usize;
                // The pop happens outside any await so no two workers see the same item
                while let Some(item) = pop_next(queue) {
                    let output = unit_of_work(item).await;
                    results
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(output);
                    processed += 1;
                }
                tracing::trace!("Worker {} finished after {} items", worker, processed);
            }
        });

        futures::future::join_all(workers).await;

        results.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

fn pop_next<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

fn queue_len<T>(queue: &Mutex<VecDeque<T>>) -> usize {
    queue.lock().unwrap_or_else(PoisonError::into_inner).len()
}
