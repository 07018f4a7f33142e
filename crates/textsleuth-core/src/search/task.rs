/// A single cancellable search over a fixed scope and pattern, run on its
/// own background thread.
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::model::FileTree;
use crate::search::cancel::{CancelToken, Completion};
use crate::search::pattern::Pattern;
use crate::search::progress::SearchProgress;
use crate::search::walker::{SearchScope, TreeWalker, WalkOutcome};
use crossbeam_channel::{SendTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How often a worker blocked on a full channel re-checks its cancel token.
const SEND_POLL: Duration = Duration::from_millis(50);

/// Lifecycle of one search task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Created,
    Running,
    Completed,
    Cancelled,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// A search that has been configured but not started.
pub struct SearchTask {
    id: u64,
    tree: Arc<FileTree>,
    scope: SearchScope,
    pattern: Pattern,
    config: SearchConfig,
}

impl SearchTask {
    pub fn new(
        id: u64,
        tree: Arc<FileTree>,
        scope: SearchScope,
        pattern: Pattern,
        config: SearchConfig,
    ) -> Self {
        Self {
            id,
            tree,
            scope,
            pattern,
            config,
        }
    }

    /// Spawn the search thread. All output goes to `progress_tx`.
    pub fn start(self, progress_tx: Sender<SearchProgress>) -> Result<TaskHandle> {
        let cancel = CancelToken::new();
        let completion = Completion::new();
        let state = Arc::new(Mutex::new(TaskState::Created));
        let id = self.id;

        let worker_cancel = cancel.clone();
        let worker_completion = completion.clone();
        let worker_state = state.clone();

        *state.lock() = TaskState::Running;
        let thread = thread::Builder::new()
            .name(format!("textsleuth-search-{id}"))
            .spawn(move || {
                let _done = worker_completion.guard();
                let final_state = self.run(&progress_tx, &worker_cancel);
                *worker_state.lock() = final_state;
            })
            .map_err(|e| {
                *state.lock() = TaskState::Cancelled;
                completion.finish();
                SearchError::Spawn(e)
            })?;

        Ok(TaskHandle {
            id,
            cancel,
            completion,
            state,
            _thread: Some(thread),
        })
    }

    fn run(self, tx: &Sender<SearchProgress>, cancel: &CancelToken) -> TaskState {
        let start = Instant::now();
        let total = self.scope.leaf_count(&self.tree);
        info!(
            "Search {} started: {} leaves, {} byte pattern",
            self.id,
            total,
            self.pattern.len()
        );

        let mut emit = |msg| send_unless_cancelled(tx, msg, cancel);

        if !emit(SearchProgress::Started { total }) {
            debug!("Search {} superseded before walking", self.id);
            return TaskState::Cancelled;
        }

        let walker = TreeWalker::new(&self.tree, &self.pattern, cancel, &self.config, &mut emit);
        match walker.walk(&self.scope) {
            WalkOutcome::Completed(stats) => {
                let duration = start.elapsed();
                info!(
                    "Search {} complete: {} matches in {} files ({} errors) in {duration:?}",
                    self.id, stats.matches, stats.visited, stats.errors
                );
                emit(SearchProgress::Complete {
                    duration,
                    matches: stats.matches,
                    errors: stats.errors,
                });
                TaskState::Completed
            }
            WalkOutcome::Cancelled(stats) => {
                debug!(
                    "Search {} cancelled after {} of {} files",
                    self.id, stats.visited, total
                );
                // Best effort: a superseded task's receiver is usually gone.
                let _ = tx.try_send(SearchProgress::Cancelled);
                TaskState::Cancelled
            }
        }
    }
}

/// Send `msg`, giving up if the receiver is gone or the task is cancelled
/// while the channel is full.
fn send_unless_cancelled(
    tx: &Sender<SearchProgress>,
    mut msg: SearchProgress,
    cancel: &CancelToken,
) -> bool {
    loop {
        match tx.send_timeout(msg, SEND_POLL) {
            Ok(()) => return true,
            Err(SendTimeoutError::Disconnected(_)) => return false,
            Err(SendTimeoutError::Timeout(back)) => {
                if cancel.is_cancelled() {
                    return false;
                }
                msg = back;
            }
        }
    }
}

/// Handle to a started search task.
pub struct TaskHandle {
    id: u64,
    cancel: CancelToken,
    completion: Completion,
    state: Arc<Mutex<TaskState>>,
    _thread: Option<thread::JoinHandle<()>>,
}

impl TaskHandle {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Request the task to stop at its next poll point.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// `true` once the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.completion.is_finished()
    }

    /// Block until the worker exits or `timeout` elapses.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        self.completion.wait_for(timeout)
    }

    pub fn state(&self) -> TaskState {
        *self.state.lock()
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
