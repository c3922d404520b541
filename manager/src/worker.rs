//! Worker identity and the bodies run on worker threads.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::manager::{Gate, Shared};

/// Identifies a worker within the manager that created it.
///
/// Ids are assigned in creation order and never reused by a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub(crate) u64);

impl WorkerId {
    /// Returns the raw id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Work handed to a worker thread.
pub(crate) enum Task {
    Once(Box<dyn FnOnce() + Send + 'static>),
    Loop {
        period: Duration,
        body: Box<dyn FnMut() + Send + 'static>,
    },
}

impl Task {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Task::Once(_) => "one-shot",
            Task::Loop { .. } => "loop",
        }
    }
}

/// Entry point of every worker thread.
pub(crate) fn run(shared: Arc<Shared>, id: WorkerId, task: Task) {
    match task {
        Task::Once(f) => {
            f();
            trace!("{} finished", id);
        }
        Task::Loop { period, body } => run_loop(&shared, id, period, body),
    }
}

/// Invokes `body` once per `period` while the manager runs.
///
/// An iteration that overruns the period is followed immediately by the
/// next one. Disabled iterations still sleep.
fn run_loop(shared: &Shared, id: WorkerId, period: Duration, mut body: Box<dyn FnMut() + Send>) {
    loop {
        let started = Instant::now();

        match shared.gate(id) {
            Gate::Exit => break,
            Gate::Run => body(),
            Gate::Skip => {}
        }

        shared.sleep_while_running(period.saturating_sub(started.elapsed()));
    }
    debug!("{} exited", id);
}
