//! Worker manager.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::config::WorkerConfig;
use crate::error::{Error, Result};
use crate::worker::{self, Task, WorkerId};

/// State shared between the manager and its worker threads.
pub(crate) struct Shared {
    state: Mutex<State>,
    /// Signalled when `running` turns false.
    closed: Condvar,
}

struct State {
    running: bool,
    enabled: BTreeMap<WorkerId, bool>,
    next_id: u64,
}

/// What a loop worker does on its next iteration.
pub(crate) enum Gate {
    Run,
    Skip,
    Exit,
}

impl Shared {
    pub(crate) fn gate(&self, id: WorkerId) -> Gate {
        let state = self.state.lock();
        if !state.running {
            Gate::Exit
        } else if state.enabled.get(&id).copied().unwrap_or(false) {
            Gate::Run
        } else {
            Gate::Skip
        }
    }

    /// Sleeps for `timeout`, returning early only if the manager closes.
    pub(crate) fn sleep_while_running(&self, timeout: Duration) {
        if timeout.is_zero() {
            thread::yield_now();
            return;
        }
        let mut state = self.state.lock();
        let _ = self
            .closed
            .wait_while_for(&mut state, |s| s.running, timeout);
    }

    fn disable_all(&self) {
        let mut state = self.state.lock();
        for flag in state.enabled.values_mut() {
            *flag = false;
        }
    }
}

struct Worker {
    id: WorkerId,
    handle: JoinHandle<()>,
}

/// Runs one-shot and periodic workers on dedicated threads.
///
/// Every worker has an enabled flag. Loop workers keep iterating while the
/// manager runs but only invoke their body while enabled; one-shot workers
/// run their body once regardless. Cancellation is cooperative: [`close`]
/// clears the run flag and then waits for every worker to hand back control,
/// it never interrupts a body mid-execution.
///
/// A manager is an ordinary value. Wrap it in an `Arc` to let worker bodies
/// reach it, for example an input loop that calls [`close`] on an exit
/// command. Dropping the manager closes it.
///
/// [`close`]: Manager::close
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use physio_manager::Manager;
///
/// let manager = Manager::new();
/// let ticks = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&ticks);
/// let id = manager
///     .add_loop_thread(Duration::from_millis(5), move || {
///         counter.fetch_add(1, Ordering::Relaxed);
///     })
///     .unwrap();
/// assert!(manager.thread_status(id));
///
/// std::thread::sleep(Duration::from_millis(50));
/// manager.close();
///
/// assert!(!manager.is_running());
/// assert!(ticks.load(Ordering::Relaxed) > 0);
/// ```
pub struct Manager {
    shared: Arc<Shared>,
    workers: Mutex<Vec<Worker>>,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    /// Creates a running manager with no workers.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    running: true,
                    enabled: BTreeMap::new(),
                    next_id: 0,
                }),
                closed: Condvar::new(),
            }),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Spawns a worker that runs `f` once.
    ///
    /// The worker stays resident until [`Manager::close`] joins it.
    pub fn add_thread<F>(&self, f: F) -> Result<WorkerId>
    where
        F: FnOnce() + Send + 'static,
    {
        self.add_thread_with(&WorkerConfig::default(), f)
    }

    /// Spawns a one-shot worker with explicit settings.
    ///
    /// The period is ignored. The body runs even if `config.start` is
    /// false; the flag is only reported by [`Manager::thread_status`].
    pub fn add_thread_with<F>(&self, config: &WorkerConfig, f: F) -> Result<WorkerId>
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn(config, Task::Once(Box::new(f)))
    }

    /// Spawns a worker that invokes `f` every `period` while enabled.
    pub fn add_loop_thread<F>(&self, period: Duration, f: F) -> Result<WorkerId>
    where
        F: FnMut() + Send + 'static,
    {
        self.add_loop_thread_with(&WorkerConfig::new().period(period), f)
    }

    /// Spawns a loop worker with explicit settings.
    pub fn add_loop_thread_with<F>(&self, config: &WorkerConfig, f: F) -> Result<WorkerId>
    where
        F: FnMut() + Send + 'static,
    {
        self.spawn(
            config,
            Task::Loop {
                period: config.period,
                body: Box::new(f),
            },
        )
    }

    fn spawn(&self, config: &WorkerConfig, task: Task) -> Result<WorkerId> {
        // Held until the handle is recorded so close() never misses a worker.
        let mut workers = self.workers.lock();

        let id = {
            let mut state = self.shared.state.lock();
            if !state.running {
                return Err(Error::Closed);
            }
            let id = WorkerId(state.next_id);
            state.next_id += 1;
            state.enabled.insert(id, config.start);
            id
        };

        let name = if config.name.is_empty() {
            format!("physio-{}", id)
        } else {
            config.name.clone()
        };
        let kind = task.kind();
        let shared = Arc::clone(&self.shared);

        match thread::Builder::new()
            .name(name.clone())
            .spawn(move || worker::run(shared, id, task))
        {
            Ok(handle) => {
                debug!(
                    "spawned {} {} ({}, enabled={})",
                    kind, id, name, config.start
                );
                workers.push(Worker { id, handle });
                Ok(id)
            }
            Err(e) => {
                self.shared.state.lock().enabled.remove(&id);
                warn!("failed to spawn {} {}: {}", kind, name, e);
                Err(Error::Spawn(e))
            }
        }
    }

    /// Disables a single worker.
    ///
    /// A loop worker keeps sleeping through its periods but skips its body
    /// until re-enabled by [`Manager::start`].
    pub fn interrupt_thread(&self, id: WorkerId) {
        let mut state = self.shared.state.lock();
        match state.enabled.get_mut(&id) {
            Some(flag) => *flag = false,
            None => debug!("ignoring interrupt of unknown {}", id),
        }
    }

    /// Returns whether a worker is enabled. Unknown ids report false.
    pub fn thread_status(&self, id: WorkerId) -> bool {
        self.shared
            .state
            .lock()
            .enabled
            .get(&id)
            .copied()
            .unwrap_or(false)
    }

    /// Returns false once [`Manager::close`] has been called.
    pub fn is_running(&self) -> bool {
        self.shared.state.lock().running
    }

    /// Enables every worker, if the manager is still running.
    pub fn start(&self) {
        let mut state = self.shared.state.lock();
        if state.running {
            for flag in state.enabled.values_mut() {
                *flag = true;
            }
        }
    }

    /// Disables every worker. Loop workers keep running but skip their bodies.
    pub fn stop(&self) {
        self.shared.disable_all();
    }

    /// Stops the manager and joins every worker.
    ///
    /// Disables all workers, clears the run flag, wakes sleeping loop workers
    /// and [`Manager::wait`] callers, then waits for each worker to return.
    /// A worker that calls `close` on its own manager is not joined by
    /// itself; it exits at its next loop check. Calling `close` again does
    /// nothing.
    pub fn close(&self) {
        {
            let mut state = self.shared.state.lock();
            for flag in state.enabled.values_mut() {
                *flag = false;
            }
            state.running = false;
        }
        self.shared.closed.notify_all();

        let workers = std::mem::take(&mut *self.workers.lock());
        if !workers.is_empty() {
            info!("closing manager, joining {} workers", workers.len());
        }

        let current = thread::current().id();
        for worker in workers {
            if worker.handle.thread().id() == current {
                debug!("{} closed its own manager, not joining it", worker.id);
                continue;
            }
            match worker.handle.join() {
                Ok(()) => debug!("{} joined", worker.id),
                Err(_) => warn!("{} panicked", worker.id),
            }
        }

        self.shared.state.lock().enabled.clear();
    }

    /// Blocks until [`Manager::close`] is called from another context.
    pub fn wait(&self) {
        let mut state = self.shared.state.lock();
        self.shared.closed.wait_while(&mut state, |s| s.running);
    }

    /// Like [`Manager::wait`], giving up after `timeout`.
    ///
    /// Returns true if the manager was closed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut state = self.shared.state.lock();
        let _ = self
            .shared
            .closed
            .wait_while_for(&mut state, |s| s.running, timeout);
        !state.running
    }

    /// Returns the number of workers not yet joined.
    pub fn worker_count(&self) -> usize {
        self.workers.lock().len()
    }

    /// Returns the ids of all registered workers in creation order.
    pub fn worker_ids(&self) -> Vec<WorkerId> {
        self.shared.state.lock().enabled.keys().copied().collect()
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.close();
    }
}
