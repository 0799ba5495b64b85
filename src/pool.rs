// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A fixed-size pool of worker threads fed from one shared FIFO queue.
//!
//! `submit` hands the pool a closure; `wait` blocks until every closure
//! submitted so far has finished.  The barrier is a counter, not a set
//! of futures, so it can be reused for as many submit/wait rounds as
//! the caller likes.  Dropping the pool closes the queue, lets the
//! workers drain it, and joins them.

use crossbeam::channel::{self, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::errors::FractalError;

type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn lock(&self) -> MutexGuard<usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish_one(&self) {
        let mut count = self.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

/// Fixed-size thread pool with a completion barrier.
pub struct WorkerPool {
    sender: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
    pending: Arc<Pending>,
}

impl WorkerPool {
    /// Starts `size` workers; a size of zero is treated as one.
    pub fn new(size: usize) -> Result<WorkerPool, FractalError> {
        let size = size.max(1);
        let (sender, receiver) = channel::unbounded::<Task>();
        let pending = Arc::new(Pending::default());
        let mut workers = Vec::with_capacity(size);

        for id in 0..size {
            let receiver = receiver.clone();
            let pending = pending.clone();
            let handle = thread::Builder::new()
                .name(format!("fractile-worker-{}", id))
                .spawn(move || {
                    for task in receiver.iter() {
                        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                            error!("worker {} lost a task to a panic", id);
                        }
                        pending.finish_one();
                    }
                })
                .map_err(FractalError::WorkerSpawn)?;
            workers.push(handle);
        }

        debug!("worker pool started with {} threads", size);
        Ok(WorkerPool {
            sender: Some(sender),
            workers,
            pending,
        })
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queues `task` for the next free worker.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        *self.pending.lock() += 1;
        let queued = match self.sender {
            Some(ref sender) => sender.send(Box::new(task)).is_ok(),
            None => false,
        };
        if !queued {
            warn!("worker pool queue is closed; task dropped");
            self.pending.finish_one();
        }
    }

    /// Blocks until every submitted task has run.
    pub fn wait(&self) {
        let mut count = self.pending.lock();
        while *count > 0 {
            count = self
                .pending
                .idle
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the queue ends each worker's receive loop once the
        // queue is drained.
        self.sender.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("worker thread panicked during shutdown");
            }
        }
        debug!("worker pool stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn runs_every_task_before_wait_returns() {
        let pool = WorkerPool::new(4).unwrap();
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..200 {
            let done = done.clone();
            pool.submit(move || {
                done.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait();
        assert_eq!(done.load(Ordering::SeqCst), 200);
    }

    #[test]
    fn barrier_is_reusable() {
        let pool = WorkerPool::new(3).unwrap();
        let done = Arc::new(AtomicUsize::new(0));
        for round in 1..=5 {
            for _ in 0..10 {
                let done = done.clone();
                pool.submit(move || {
                    thread::sleep(Duration::from_millis(1));
                    done.fetch_add(1, Ordering::SeqCst);
                });
            }
            pool.wait();
            assert_eq!(done.load(Ordering::SeqCst), round * 10);
        }
    }

    #[test]
    fn wait_with_nothing_submitted_returns() {
        let pool = WorkerPool::new(2).unwrap();
        pool.wait();
    }

    #[test]
    fn zero_workers_means_one() {
        let pool = WorkerPool::new(0).unwrap();
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn panicking_task_does_not_hang_the_barrier() {
        let pool = WorkerPool::new(1).unwrap();
        let done = Arc::new(AtomicUsize::new(0));
        pool.submit(|| panic!("tile exploded"));
        let after = done.clone();
        pool.submit(move || {
            after.fetch_add(1, Ordering::SeqCst);
        });
        pool.wait();
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_finishes_queued_work() {
        let done = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(2).unwrap();
            for _ in 0..20 {
                let done = done.clone();
                pool.submit(move || {
                    done.fetch_add(1, Ordering::SeqCst);
                });
            }
        }
        assert_eq!(done.load(Ordering::SeqCst), 20);
    }
}
