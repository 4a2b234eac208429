//! Where the cryptography runs.
//!
//! Every seal or unseal is submitted to an [`Executor`] as one self contained
//! job and awaited through a [`Task`]. [`Inline`] runs the job on the calling
//! thread, [`WorkerPool`] hands it to a fixed set of background threads.
//! Executors are passed explicitly; there is no global worker.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam::channel;

use crate::PasetoError;

/// A unit of work submitted to an [`Executor`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs, either in place or elsewhere.
pub trait Executor: Send + Sync {
    /// Schedule the job. An error means the job was dropped without running.
    fn execute(&self, job: Job) -> Result<(), PasetoError>;
}

/// Runs every job synchronously on the caller's thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct Inline;

impl Executor for Inline {
    fn execute(&self, job: Job) -> Result<(), PasetoError> {
        job();
        Ok(())
    }
}

/// A fixed size pool of named worker threads fed from a shared queue.
///
/// Dropping the pool closes the queue, lets the workers drain it, and joins them.
pub struct WorkerPool {
    sender: Option<channel::Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(threads: usize) -> Result<Self, PasetoError> {
        if threads == 0 {
            return Err(PasetoError::Usage("a worker pool needs at least one thread".into()));
        }

        let (sender, receiver) = channel::unbounded::<Job>();
        let mut workers = Vec::with_capacity(threads);
        for i in 0..threads {
            let receiver = receiver.clone();
            let handle = std::thread::Builder::new()
                .name(format!("paseto-worker-{i}"))
                .spawn(move || worker_loop(receiver))
                .map_err(|_| PasetoError::Backend("failed to spawn worker thread"))?;
            workers.push(handle);
        }
        tracing::debug!(threads, "started crypto worker pool");

        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    pub fn threads(&self) -> usize {
        self.workers.len()
    }
}

fn worker_loop(receiver: channel::Receiver<Job>) {
    for job in receiver {
        if catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::error!("crypto job panicked");
        }
    }
}

impl Executor for WorkerPool {
    fn execute(&self, job: Job) -> Result<(), PasetoError> {
        let sender = self
            .sender
            .as_ref()
            .ok_or(PasetoError::Backend("worker pool is shut down"))?;
        sender
            .send(job)
            .map_err(|_| PasetoError::Backend("worker pool is shut down"))
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                tracing::error!("crypto worker exited abnormally");
            }
        }
        tracing::debug!("stopped crypto worker pool");
    }
}

/// The pending result of a submitted job.
///
/// Dropping a task abandons it. The job still runs to completion but its
/// result is discarded.
#[must_use = "a task does nothing unless waited on"]
pub struct Task<T> {
    receiver: channel::Receiver<Result<T, PasetoError>>,
}

impl<T> Task<T> {
    /// Block until the job completes.
    pub fn wait(self) -> Result<T, PasetoError> {
        self.receiver.recv().unwrap_or(Err(LOST))
    }

    /// Block until the job completes or the timeout elapses.
    ///
    /// Returns `None` on timeout, in which case the task may be waited on again.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, PasetoError>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(res) => Some(res),
            Err(channel::RecvTimeoutError::Timeout) => None,
            Err(channel::RecvTimeoutError::Disconnected) => Some(Err(LOST)),
        }
    }
}

const LOST: PasetoError = PasetoError::Backend("crypto job was dropped before completing");

/// Submit `f` to the executor.
pub fn submit<T, F>(executor: &dyn Executor, f: F) -> Task<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PasetoError> + Send + 'static,
{
    let (sender, receiver) = channel::bounded(1);
    let job = {
        let sender = sender.clone();
        Box::new(move || {
            // the receiver is gone if the task was abandoned
            let _ = sender.send(f());
        })
    };

    if let Err(err) = executor.execute(job) {
        let _ = sender.send(Err(err));
    }
    Task { receiver }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::time::Duration;

    use super::{Executor, Inline, WorkerPool, submit};
    use crate::PasetoError;

    #[test]
    fn inline_runs_immediately() {
        let task = submit(&Inline, || Ok(1 + 1));
        assert_eq!(task.wait().unwrap(), 2);
    }

    #[test]
    fn errors_are_forwarded() {
        let task = submit::<(), _>(&Inline, || Err(PasetoError::DecryptionFailed));
        assert!(matches!(task.wait(), Err(PasetoError::DecryptionFailed)));
    }

    #[test]
    fn pool_runs_jobs_concurrently() {
        let pool = WorkerPool::new(2).unwrap();
        assert_eq!(pool.threads(), 2);

        // both jobs must be running at once to get past the barrier
        let barrier = Arc::new(Barrier::new(2));
        let tasks: Vec<_> = (0..2)
            .map(|i| {
                let barrier = barrier.clone();
                submit(&pool, move || {
                    barrier.wait();
                    Ok(i)
                })
            })
            .collect();

        let results: Vec<i32> = tasks.into_iter().map(|t| t.wait().unwrap()).collect();
        assert_eq!(results, [0, 1]);
    }

    #[test]
    fn timeout_then_wait_again() {
        let pool = WorkerPool::new(1).unwrap();
        let (tx, rx) = crossbeam::channel::bounded::<()>(0);
        let task = submit(&pool, move || {
            rx.recv().map_err(|_| PasetoError::Backend("closed"))?;
            Ok("done")
        });

        assert!(task.wait_timeout(Duration::from_millis(10)).is_none());
        tx.send(()).unwrap();
        assert_eq!(task.wait().unwrap(), "done");
    }

    #[test]
    fn panicking_job_does_not_kill_the_pool() {
        let pool = WorkerPool::new(1).unwrap();
        let task = submit::<(), _>(&pool, || panic!("boom"));
        assert!(matches!(task.wait(), Err(PasetoError::Backend(_))));

        let task = submit(&pool, || Ok(42));
        assert_eq!(task.wait().unwrap(), 42);
    }

    #[test]
    fn zero_threads_is_a_usage_error() {
        assert!(matches!(WorkerPool::new(0), Err(PasetoError::Usage(_))));
    }

    struct Closed;
    impl Executor for Closed {
        fn execute(&self, _: super::Job) -> Result<(), PasetoError> {
            Err(PasetoError::Backend("closed"))
        }
    }

    #[test]
    fn rejected_jobs_resolve_to_the_error() {
        let task = submit(&Closed, || Ok(()));
        assert!(matches!(task.wait(), Err(PasetoError::Backend("closed"))));
    }
}
