//! A fixed-size worker pool (C4) with a shared FIFO task queue and a blocking
//! `wait_all` barrier. Owned by a [`crate::Context`] rather than a process-wide
//! singleton, so its thread count is fixed for the lifetime of that `Context`.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

type Task = Box<dyn FnOnce() + Send>;

struct State {
    tasks: VecDeque<Task>,
    active_tasks: usize,
    stop: bool,
}

struct Shared {
    state: Mutex<State>,
    cv_task: Condvar,
    cv_done: Condvar,
}

pub struct Pool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    thread_count: usize,
}

impl Pool {
    /// Spawns a pool sized to the platform's available parallelism (falling back to 1
    /// if that cannot be determined), the idiomatic replacement for the original's
    /// `hardware_concurrency`.
    pub fn new() -> Pool {
        let count = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Pool::with_thread_count(count)
    }

    /// Spawns a pool with exactly `thread_count` workers. `thread_count == 0` is a
    /// precondition violation.
    pub fn with_thread_count(thread_count: usize) -> Pool {
        assert!(thread_count > 0, "Pool::with_thread_count: thread_count must be > 0");
        let shared = Arc::new(Shared {
            state: Mutex::new(State { tasks: VecDeque::new(), active_tasks: 0, stop: false }),
            cv_task: Condvar::new(),
            cv_done: Condvar::new(),
        });

        let workers = (0..thread_count)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || Pool::worker_loop(shared))
            })
            .collect();

        Pool { shared, workers, thread_count }
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Moves `task` onto the back of the FIFO queue for some worker to pick up.
    pub fn enqueue(&self, task: impl FnOnce() + Send + 'static) {
        let mut state = self.shared.state.lock().unwrap();
        state.tasks.push_back(Box::new(task));
        self.shared.cv_task.notify_one();
    }

    /// Blocks the calling thread until the queue is empty and no task is in progress.
    pub fn wait_all(&self) {
        let state = self.shared.state.lock().unwrap();
        let _guard = self
            .shared
            .cv_done
            .wait_while(state, |state| !state.tasks.is_empty() || state.active_tasks > 0)
            .unwrap();
    }

    fn worker_loop(shared: Arc<Shared>) {
        loop {
            let mut state = shared.state.lock().unwrap();
            state = shared.cv_task.wait_while(state, |state| state.tasks.is_empty() && !state.stop).unwrap();

            let Some(task) = state.tasks.pop_front() else {
                debug_assert!(state.stop);
                return;
            };
            state.active_tasks += 1;
            drop(state);

            task();

            let mut state = shared.state.lock().unwrap();
            state.active_tasks -= 1;
            if state.tasks.is_empty() && state.active_tasks == 0 {
                shared.cv_done.notify_all();
            }
        }
    }
}

impl Default for Pool {
    fn default() -> Pool {
        Pool::new()
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.stop = true;
        }
        self.shared.cv_task.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn wait_all_blocks_until_every_enqueued_task_completes() {
        let pool = Pool::with_thread_count(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            pool.enqueue(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait_all();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn single_threaded_pool_still_completes_all_tasks() {
        let pool = Pool::with_thread_count(1);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            pool.enqueue(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait_all();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn wait_all_on_an_empty_queue_returns_immediately() {
        let pool = Pool::with_thread_count(2);
        pool.wait_all();
    }
}
