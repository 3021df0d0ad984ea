//! Fixed-size worker pool over a list of tasks
//!
//! The producer queues every task and closes the queue before any worker
//! starts draining it. A worker that hits an error reports it and exits; the
//! others keep draining. The first reported error is returned once all
//! workers have finished.

use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread;

use crate::error::Result;

/// Run `task` over `items` on at most `workers` threads
///
/// Fewer threads are started when there are fewer items than workers.
pub fn run_pool<T, F>(workers: usize, items: Vec<T>, task: F) -> Result<()>
where
    T: Send,
    F: Fn(T) -> Result<()> + Sync,
{
    if items.is_empty() {
        return Ok(());
    }
    let workers = workers.clamp(1, items.len());

    let (work_tx, work_rx) = mpsc::channel::<T>();
    for item in items {
        // The receiver outlives this loop, so sending cannot fail.
        let _ = work_tx.send(item);
    }
    drop(work_tx);

    let work_rx = Mutex::new(work_rx);
    let (err_tx, err_rx) = mpsc::sync_channel(workers);

    thread::scope(|scope| {
        for _ in 0..workers {
            let err_tx = err_tx.clone();
            let work_rx = &work_rx;
            let task = &task;
            scope.spawn(move || {
                loop {
                    let next = work_rx
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .recv();
                    let Ok(item) = next else {
                        break;
                    };
                    if let Err(e) = task(item) {
                        let _ = err_tx.send(e);
                        break;
                    }
                }
            });
        }
    });
    drop(err_tx);

    match err_rx.try_recv() {
        Ok(e) => Err(e),
        Err(_) => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::{MixError, pipeline as pipeline_error};

    #[test]
    fn test_runs_every_task() {
        let count = AtomicUsize::new(0);
        let items: Vec<usize> = (0..100).collect();

        run_pool(4, items, |_| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .expect("pool");

        assert_eq!(count.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn test_returns_an_error_when_tasks_fail() {
        let items: Vec<u32> = (0..20).collect();

        let err = run_pool(3, items, |i| {
            if i % 5 == 0 {
                Err(pipeline_error::invalid_parameter(format!("task {i}")))
            } else {
                Ok(())
            }
        })
        .expect_err("should fail");

        assert!(matches!(err, MixError::InvalidBuildParameter { .. }));
    }

    #[test]
    fn test_more_workers_than_items() {
        let count = AtomicUsize::new(0);
        run_pool(64, vec![1, 2], |_| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .expect("pool");
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_and_zero_workers() {
        run_pool(0, Vec::<u32>::new(), |_| Ok(())).expect("empty");
        run_pool(0, vec![1], |_| Ok(())).expect("zero workers still runs");
    }
}
