/// Keeps at most one live search task and swaps it out on every request.
///
/// The current-task slot is the single source of truth for which task's
/// output the UI trusts. Replacing the slot is one `take`/`replace` under a
/// lock, never a separate read and write. A retired task that does not exit
/// within the timeout is abandoned: its channel belongs to a session the UI
/// has already dropped, so anything it still sends goes nowhere.
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::model::FileTree;
use crate::search::pattern::Pattern;
use crate::search::progress::SearchProgress;
use crate::search::task::{SearchTask, TaskHandle};
use crate::search::walker::SearchScope;
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the user asked for: where to look and what text to look for.
///
/// The encoding travels with the request rather than living in any
/// process-wide default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub scope: SearchScope,
    pub text: String,
    pub encoding: String,
}

/// The receiving end of one started search.
///
/// Dropping the session disconnects the channel, which the worker treats as
/// cancellation.
#[derive(Debug)]
pub struct SearchSession {
    pub id: u64,
    /// Progress range: leaves in scope.
    pub total: u64,
    pub progress_rx: Receiver<SearchProgress>,
}

pub struct Supervisor {
    tree: Arc<FileTree>,
    config: SearchConfig,
    current: Mutex<Option<TaskHandle>>,
    next_id: AtomicU64,
}

impl Supervisor {
    pub fn new(tree: Arc<FileTree>, config: SearchConfig) -> Self {
        Self {
            tree,
            config,
            current: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn tree(&self) -> &Arc<FileTree> {
        &self.tree
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Encode the request text and start a search, retiring any running one.
    ///
    /// Fails synchronously only if the text cannot be turned into a usable
    /// pattern or the thread cannot be spawned. On an encoding failure the
    /// running search, if any, is left untouched.
    pub fn start_search(&self, request: &SearchRequest) -> Result<SearchSession> {
        let pattern = Pattern::encode(&request.text, &request.encoding)?;
        self.start_search_bytes(request.scope.clone(), pattern)
    }

    /// Start a search for an already-encoded pattern.
    pub fn start_search_bytes(&self, scope: SearchScope, pattern: Pattern) -> Result<SearchSession> {
        if scope.is_empty() {
            return Err(SearchError::EmptyScope);
        }

        let previous = self.current.lock().take();
        if let Some(old) = previous {
            self.retire(old);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let total = scope.leaf_count(&self.tree);
        let (progress_tx, progress_rx) = crossbeam_channel::bounded(self.config.channel_capacity);

        let task = SearchTask::new(id, self.tree.clone(), scope, pattern, self.config.clone());
        let handle = task.start(progress_tx)?;

        // Another caller may have installed a task while we were retiring.
        if let Some(raced) = self.current.lock().replace(handle) {
            warn!("Search {} replaced concurrently; cancelling it", raced.id());
            raced.cancel();
        }

        info!("Search {id} running over {total} files");
        Ok(SearchSession {
            id,
            total,
            progress_rx,
        })
    }

    /// Cancel the current search, if any, without waiting for it.
    pub fn dispose(&self) {
        if let Some(handle) = self.current.lock().take() {
            debug!("Disposing search {}", handle.id());
            handle.cancel();
        }
    }

    /// `true` while the current task's thread is still alive.
    pub fn is_running(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    pub fn current_id(&self) -> Option<u64> {
        self.current.lock().as_ref().map(TaskHandle::id)
    }

    /// Signal cancellation and wait a bounded time for the worker to exit.
    fn retire(&self, old: TaskHandle) {
        old.cancel();
        let timeout = self.config.retire_timeout();
        if old.wait_for(timeout) {
            debug!("Search {} retired", old.id());
        } else {
            warn!(
                "Search {} did not stop within {timeout:?}; abandoning it",
                old.id()
            );
        }
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.dispose();
    }
}
