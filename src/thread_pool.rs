// Copyright (c) Radzivon Bartoshyk. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
use crate::{BlurError, ThreadingPolicy};
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error};

type Task = Box<dyn FnOnce() + Send + 'static>;

struct PoolState {
    queue: VecDeque<Task>,
    /// Workers currently executing a claimed task.
    busy: usize,
    stop: bool,
}

struct Shared {
    state: Mutex<PoolState>,
    work_available: Condvar,
    idle: Condvar,
}

impl Shared {
    fn is_idle(state: &PoolState) -> bool {
        state.queue.is_empty() && state.busy == 0
    }
}

/// Fixed size pool of worker threads consuming one shared FIFO queue.
///
/// Workers are spawned once and live until the pool is dropped, dropping
/// drains the queue and joins every worker.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

static GLOBAL_POOL: Mutex<Option<Arc<ThreadPool>>> = parking_lot::const_mutex(None);

impl ThreadPool {
    /// Spawns exactly `thread_count` workers, at least one.
    pub fn new(thread_count: usize) -> Result<ThreadPool, BlurError> {
        let thread_count = thread_count.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                busy: 0,
                stop: false,
            }),
            work_available: Condvar::new(),
            idle: Condvar::new(),
        });
        let mut pool = ThreadPool {
            shared,
            workers: Vec::with_capacity(thread_count),
        };
        for index in 0..thread_count {
            let shared = pool.shared.clone();
            // On failure the partially built pool is dropped and joins what was spawned.
            let handle = std::thread::Builder::new()
                .name(format!("fastblur-worker-{index}"))
                .spawn(move || worker_loop(shared))?;
            pool.workers.push(handle);
        }
        debug!(threads = thread_count, "thread pool started");
        Ok(pool)
    }

    /// Creates a pool sized by the given policy for this host.
    pub fn with_policy(policy: ThreadingPolicy) -> Result<ThreadPool, BlurError> {
        ThreadPool::new(policy.thread_count())
    }

    /// Process wide pool, created on the first call.
    ///
    /// Only the first call's policy is honoured, later calls return the existing instance.
    pub fn global(policy: ThreadingPolicy) -> Result<Arc<ThreadPool>, BlurError> {
        let mut global = GLOBAL_POOL.lock();
        if let Some(pool) = global.as_ref() {
            return Ok(pool.clone());
        }
        let pool = Arc::new(ThreadPool::with_policy(policy)?);
        *global = Some(pool.clone());
        Ok(pool)
    }

    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Enqueues a task at the tail of the queue and wakes one idle worker.
    ///
    /// Never blocks. There is no guarantee on which worker runs the task.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(Box::new(task));
    }

    fn push(&self, task: Task) {
        self.shared.state.lock().queue.push_back(task);
        self.shared.work_available.notify_one();
    }

    /// Blocks until the queue is empty and every worker finished its task.
    pub fn wait_idle(&self) {
        let mut state = self.shared.state.lock();
        while !Shared::is_idle(&state) {
            self.shared.idle.wait(&mut state);
        }
    }

    /// Runs `f` with a [Scope] whose tasks may borrow from the caller's stack.
    ///
    /// Returns only after the pool became idle, so every task submitted through
    /// the scope has finished. If any scoped task panicked, the panic is resumed
    /// here. Must not be called from a task running on the same pool, the wait
    /// would include the calling task itself.
    pub fn scope<'env, F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Scope<'_, 'env>) -> R,
    {
        let scope = Scope {
            pool: self,
            panic: Arc::new(Mutex::new(None)),
            _env: PhantomData,
        };
        let result = {
            let _barrier = IdleBarrier(self);
            f(&scope)
        };
        if let Some(payload) = scope.panic.lock().take() {
            resume_unwind(payload);
        }
        result
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shared.state.lock().stop = true;
        self.shared.work_available.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

/// Waits for the pool to drain even if the scope body unwinds.
struct IdleBarrier<'a>(&'a ThreadPool);

impl Drop for IdleBarrier<'_> {
    fn drop(&mut self) {
        self.0.wait_idle();
    }
}

/// Submission handle for tasks borrowing data that outlives `'env`.
pub struct Scope<'pool, 'env> {
    pool: &'pool ThreadPool,
    panic: Arc<Mutex<Option<Box<dyn Any + Send + 'static>>>>,
    _env: PhantomData<&'env mut &'env ()>,
}

impl<'env> Scope<'_, 'env> {
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'env,
    {
        let panic = self.panic.clone();
        let task: Box<dyn FnOnce() + Send + 'env> = Box::new(move || {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(task)) {
                panic.lock().get_or_insert(payload);
            }
        });
        // SAFETY: `ThreadPool::scope` does not return, nor unwind past the borrowed
        // environment, before `wait_idle` observed that this task has completed.
        let task: Task = unsafe {
            std::mem::transmute::<Box<dyn FnOnce() + Send + 'env>, Task>(task)
        };
        self.pool.push(task);
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let task = {
            let mut state = shared.state.lock();
            loop {
                if let Some(task) = state.queue.pop_front() {
                    state.busy += 1;
                    break task;
                }
                if state.stop {
                    return;
                }
                shared.work_available.wait(&mut state);
            }
        };

        if catch_unwind(AssertUnwindSafe(task)).is_err() {
            error!("task panicked on a worker thread");
        }

        let mut state = shared.state.lock();
        state.busy -= 1;
        if Shared::is_idle(&state) {
            shared.idle.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn count_in_scope(threads: usize) {
        let pool = ThreadPool::new(threads).unwrap();
        assert_eq!(pool.thread_count(), threads);
        let counter = AtomicUsize::new(0);
        let mut slots = vec![0usize; 1000];
        pool.scope(|scope| {
            for (i, slot) in slots.iter_mut().enumerate() {
                let counter = &counter;
                scope.submit(move || {
                    *slot += i + 1;
                    counter.fetch_add(1, Ordering::Relaxed);
                });
            }
        });
        assert_eq!(counter.load(Ordering::Relaxed), 1000);
        for (i, slot) in slots.iter().enumerate() {
            assert_eq!(*slot, i + 1, "Slot {i} was written {slot} with {threads} threads");
        }
    }

    #[test]
    fn test_scope_counts_every_task() {
        count_in_scope(1);
        count_in_scope(2);
        count_in_scope(ThreadingPolicy::Full.thread_count());
    }

    #[test]
    fn test_submit_then_wait_idle() {
        let pool = ThreadPool::new(3).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..257 {
            let counter = counter.clone();
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait_idle();
        assert_eq!(counter.load(Ordering::SeqCst), 257);
        // Idle pool returns immediately.
        pool.wait_idle();
    }

    #[test]
    fn test_single_worker_is_fifo() {
        let pool = ThreadPool::new(1).unwrap();
        let order = Mutex::new(Vec::new());
        pool.scope(|scope| {
            for i in 0..64 {
                let order = &order;
                scope.submit(move || order.lock().push(i));
            }
        });
        assert_eq!(order.into_inner(), (0..64).collect::<Vec<_>>());
    }

    #[test]
    #[should_panic(expected = "scoped failure")]
    fn test_scope_resumes_task_panic() {
        let pool = ThreadPool::new(2).unwrap();
        pool.scope(|scope| {
            scope.submit(|| panic!("scoped failure"));
            scope.submit(|| {});
        });
    }

    #[test]
    fn test_worker_survives_raw_task_panic() {
        let pool = ThreadPool::new(1).unwrap();
        pool.submit(|| panic!("raw failure"));
        pool.wait_idle();
        let counter = Arc::new(AtomicUsize::new(0));
        let task_counter = counter.clone();
        pool.submit(move || {
            task_counter.fetch_add(1, Ordering::SeqCst);
        });
        pool.wait_idle();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_drains_queue() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = ThreadPool::new(2).unwrap();
            for _ in 0..32 {
                let counter = counter.clone();
                pool.submit(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 32);
    }

    #[test]
    fn test_global_is_created_once() {
        let first = ThreadPool::global(ThreadingPolicy::from_hint(1.)).unwrap();
        let second = ThreadPool::global(ThreadingPolicy::Full).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.thread_count(), second.thread_count());
    }
}
