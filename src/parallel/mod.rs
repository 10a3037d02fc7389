//! Producer/consumer execution
//!
//! A pass has one producer (the tree walker) and a fixed pool of consumers
//! draining a bounded crossbeam channel. The channel bound is the
//! backpressure: the producer blocks once `queue_capacity` items are waiting.
//!
//! ```text
//!  producer ──▶ [ bounded queue ] ──▶ worker 0
//!                                 ├─▶ worker 1
//!                                 └─▶ worker N-1
//! ```
//!
//! Every item is received by exactly one worker. The pool returns once the
//! producer has finished and every worker has seen the closed queue.

use crossbeam::channel::{Receiver, Sender, bounded};

use crate::error::SyncError;

/// Calculate the worker count from available cores and configuration limits.
///
/// ```text
/// 1. cores * thread_percentage / 100, at least 1
/// 2. capped by max_threads_config when it is non-zero
/// ```
///
/// ```rust
/// use grafter::parallel::calculate_optimal_workers;
///
/// assert!(calculate_optimal_workers(0, 100) >= 1);
/// assert!(calculate_optimal_workers(2, 100) <= 2);
/// ```
pub fn calculate_optimal_workers(max_threads_config: usize, thread_percentage: u8) -> usize {
    let available_cores = num_cpus::get();
    let percentage = thread_percentage.clamp(1, 100) as usize;

    let workers_by_percentage = std::cmp::max(1, (available_cores * percentage) / 100);

    if max_threads_config > 0 {
        std::cmp::min(max_threads_config, workers_by_percentage)
    } else {
        workers_by_percentage
    }
}

/// Fixed-size pool fed by a single producer.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
    queue_capacity: usize,
}

impl WorkerPool {
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        Self {
            workers: workers.max(1),
            queue_capacity: queue_capacity.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Run `producer` on its own thread and `worker` on each pool thread.
    ///
    /// The producer owns the only sender; dropping it closes the queue. Each
    /// worker receives its id and a receiver, and returns a partial result.
    /// Results come back in worker id order.
    pub fn run<T, R, P, W>(&self, producer: P, worker: W) -> Result<Vec<R>, SyncError>
    where
        T: Send,
        R: Send,
        P: FnOnce(Sender<T>) + Send,
        W: Fn(usize, Receiver<T>) -> R + Sync,
    {
        let (work_tx, work_rx): (Sender<T>, Receiver<T>) = bounded(self.queue_capacity);
        let worker = &worker;

        crossbeam::thread::scope(|s| {
            let handles: Vec<_> = (0..self.workers)
                .map(|worker_id| {
                    let work_rx = work_rx.clone();
                    s.spawn(move |_| worker(worker_id, work_rx))
                })
                .collect();

            // Workers hold their own clones; ours would keep the queue alive.
            drop(work_rx);

            let producer_handle = s.spawn(move |_| producer(work_tx));

            let results = handles
                .into_iter()
                .map(|h| h.join().map_err(|_| SyncError::WorkerPanic))
                .collect::<Result<Vec<R>, SyncError>>()?;
            producer_handle.join().map_err(|_| SyncError::WorkerPanic)?;
            Ok(results)
        })
        .map_err(|_| SyncError::WorkerPanic)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_optimal_workers_calculation() {
        assert!(calculate_optimal_workers(0, 100) >= 1);
        assert!(calculate_optimal_workers(1, 100) == 1);
        assert!(calculate_optimal_workers(0, 0) >= 1);
    }

    #[test]
    fn test_pool_delivers_each_item_once() {
        let pool = WorkerPool::new(4, 2);
        let results = pool
            .run(
                |tx: Sender<u32>| {
                    for i in 0..100 {
                        tx.send(i).unwrap();
                    }
                },
                |_id, rx| rx.iter().collect::<Vec<u32>>(),
            )
            .unwrap();

        assert_eq!(results.len(), 4);
        let all: Vec<u32> = results.into_iter().flatten().collect();
        assert_eq!(all.len(), 100);
        let unique: HashSet<u32> = all.into_iter().collect();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn test_pool_with_zero_sizes_is_clamped() {
        let pool = WorkerPool::new(0, 0);
        assert_eq!(pool.workers(), 1);
        assert_eq!(pool.queue_capacity(), 1);

        let results = pool
            .run(
                |tx: Sender<u8>| {
                    tx.send(7).unwrap();
                },
                |_id, rx| rx.iter().sum::<u8>(),
            )
            .unwrap();
        assert_eq!(results, vec![7]);
    }

    #[test]
    fn test_producer_stops_when_workers_exit() {
        let pool = WorkerPool::new(2, 1);
        let results = pool
            .run(
                |tx: Sender<u32>| {
                    let mut sent = 0;
                    while tx.send(sent).is_ok() {
                        sent += 1;
                    }
                },
                |_id, rx| rx.recv().is_ok(),
            )
            .unwrap();
        assert_eq!(results, vec![true, true]);
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let pool = WorkerPool::new(1, 1);
        let result = pool.run(
            |tx: Sender<u8>| {
                let _ = tx.send(1);
            },
            |_id, _rx| -> u8 { panic!("worker failure") },
        );
        assert!(matches!(result, Err(SyncError::WorkerPanic)));
    }
}
