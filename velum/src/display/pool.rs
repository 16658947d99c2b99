// Copyright 2026 the Velum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use std::sync::OnceLock;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Upper bound on worker threads.
pub const MAX_WORKERS: usize = 16;

/// A fixed set of threads running display work.
///
/// Jobs are taken from one shared queue in submission order. Dropping the pool lets the
/// workers finish queued jobs and exit.
#[derive(Debug)]
pub struct WorkerPool {
    sender: Sender<Job>,
    workers: usize,
}

impl WorkerPool {
    /// Starts a pool with `threads` workers, clamped to `1..=MAX_WORKERS`.
    pub fn new(threads: usize) -> Self {
        let (sender, receiver) = unbounded::<Job>();
        let wanted = threads.clamp(1, MAX_WORKERS);
        let mut workers = 0;
        for index in 0..wanted {
            let receiver: Receiver<Job> = receiver.clone();
            let spawned = thread::Builder::new()
                .name(alloc::format!("velum-display-{index}"))
                .spawn(move || {
                    for job in receiver {
                        job();
                    }
                });
            match spawned {
                Ok(_) => workers += 1,
                Err(err) => log::warn!("failed to start display worker {index}: {err}"),
            }
        }
        log::debug!("display pool started with {workers} workers");
        Self { sender, workers }
    }

    /// The process wide pool, sized to the available parallelism.
    pub fn global() -> &'static Self {
        static POOL: OnceLock<WorkerPool> = OnceLock::new();
        POOL.get_or_init(|| {
            let threads = thread::available_parallelism().map_or(1, |n| n.get());
            Self::new(threads)
        })
    }

    /// Number of running workers.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queues `job`. Runs it on the calling thread if no worker could be started.
    pub fn spawn(&self, job: impl FnOnce() + Send + 'static) {
        if self.workers == 0 {
            job();
            return;
        }
        if let Err(err) = self.sender.send(Box::new(job)) {
            (err.into_inner())();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn jobs_run_on_workers() {
        let pool = WorkerPool::new(2);
        assert_eq!(pool.workers(), 2);
        let (tx, rx) = bounded(4);
        for value in 0..4 {
            let tx = tx.clone();
            pool.spawn(move || {
                let _ = tx.send(value);
            });
        }
        let mut seen: alloc::vec::Vec<i32> = rx.iter().take(4).collect();
        seen.sort_unstable();
        assert_eq!(seen, [0, 1, 2, 3]);
    }

    #[test]
    fn thread_count_is_clamped() {
        assert_eq!(WorkerPool::new(0).workers(), 1);
        assert_eq!(WorkerPool::new(64).workers(), MAX_WORKERS);
    }
}
