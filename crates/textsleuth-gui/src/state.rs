/// Application state management.
///
/// Centralises all mutable state that the UI reads and writes. The search
/// thread communicates only via its channel; state updates happen in
/// `process_search_messages()`, which runs once per frame on the UI thread,
/// so every match and progress step is applied in the order it was posted.
use crossbeam_channel::TryRecvError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use textsleuth_core::model::{FileTree, NodeIndex};
use textsleuth_core::search::{
    ListEvent, MatchList, ObserverId, Pattern, ProgressCounter, SearchProgress, SearchScope,
    SearchSession, Supervisor,
};
use textsleuth_core::SearchConfig;
use tracing::{error, warn};

/// The current phase of the search panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    /// No search has run yet.
    Idle,
    /// A search task is running; controls are disabled.
    Searching,
    /// The last search finished or was cancelled.
    Results,
}

/// Maximum number of search messages drained from the channel per frame.
///
/// Keeps a backlog (e.g. after the window was hidden) from stalling the
/// render thread.
const MAX_MESSAGES_PER_FRAME: usize = 2_000;

/// Maximum per-file errors kept for display.
pub const MAX_SEARCH_ERRORS: usize = 1_000;

pub struct AppState {
    // ── Scope ──────────────────────────────────────────
    pub tree: Arc<FileTree>,
    pub scope: SearchScope,

    // ── Inputs ─────────────────────────────────────────
    pub pattern_text: String,
    /// Selected charset label. Belongs to this panel only.
    pub encoding: String,
    pub controls_enabled: bool,
    /// Set when the text field should grab keyboard focus next frame.
    pub focus_text: bool,

    // ── Search ─────────────────────────────────────────
    pub phase: AppPhase,
    supervisor: Supervisor,
    session: Option<SearchSession>,
    pub progress: ProgressCounter,
    pub search_duration: Option<Duration>,
    pub search_was_cancelled: bool,
    pub search_error_count: u64,
    pub search_errors: Vec<(String, String)>,
    /// Message for a search that could not start (e.g. bad encoding).
    pub last_error: Option<String>,

    // ── Results ────────────────────────────────────────
    pub matches: MatchList,
    pub selected: Option<usize>,
    /// Observer on `matches` for the current run.
    match_observer: Option<ObserverId>,
    /// Set by the observer when the first result of a run arrives.
    first_result: Arc<AtomicBool>,
}

impl AppState {
    /// Create state for searching every root of `tree`.
    pub fn new(tree: Arc<FileTree>, config: SearchConfig) -> Self {
        let scope = SearchScope::new(tree.roots.clone());
        let encoding = config.default_encoding.clone();
        Self {
            tree: tree.clone(),
            scope,
            pattern_text: String::new(),
            encoding,
            controls_enabled: true,
            focus_text: true,
            phase: AppPhase::Idle,
            supervisor: Supervisor::new(tree, config),
            session: None,
            progress: ProgressCounter::Indeterminate,
            search_duration: None,
            search_was_cancelled: false,
            search_error_count: 0,
            search_errors: Vec::new(),
            last_error: None,
            matches: MatchList::new(),
            selected: None,
            match_observer: None,
            first_result: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        self.supervisor.config()
    }

    /// Whether the Find button should be enabled.
    pub fn can_search(&self) -> bool {
        self.controls_enabled && self.pattern_text.chars().count() >= self.config().min_pattern_len
    }

    /// Start searching for `pattern_text` under `encoding`.
    ///
    /// The text is encoded first: if that fails, the error is stored in
    /// `last_error` and the previous results stay on screen. Returns `true`
    /// if a search was started.
    pub fn start_search(&mut self) -> bool {
        if !self.can_search() {
            return false;
        }

        let pattern = match Pattern::encode(&self.pattern_text, &self.encoding) {
            Ok(p) => p,
            Err(e) => {
                warn!("Cannot search for text: {e}");
                self.last_error = Some(e.to_string());
                return false;
            }
        };

        // Disconnect the previous session before retiring its task so a
        // worker blocked on a full channel wakes up immediately.
        self.session = None;

        self.controls_enabled = false;
        self.focus_text = false;
        self.last_error = None;
        self.selected = None;
        self.matches = MatchList::new();
        self.first_result.store(false, Ordering::Relaxed);
        let first_result = self.first_result.clone();
        self.match_observer = Some(self.matches.observe(move |event| {
            let ListEvent::IntervalAdded { first, .. } = *event;
            if first == 0 {
                first_result.store(true, Ordering::Relaxed);
            }
        }));
        self.progress = ProgressCounter::Indeterminate;
        self.search_duration = None;
        self.search_was_cancelled = false;
        self.search_error_count = 0;
        self.search_errors.clear();

        match self
            .supervisor
            .start_search_bytes(self.scope.clone(), pattern)
        {
            Ok(session) => {
                self.progress = ProgressCounter::start(session.total);
                self.session = Some(session);
                self.phase = AppPhase::Searching;
                true
            }
            Err(e) => {
                error!("Search failed to start: {e}");
                self.last_error = Some(e.to_string());
                self.controls_enabled = true;
                self.phase = AppPhase::Idle;
                false
            }
        }
    }

    /// Cancel any running search without waiting for it.
    pub fn dispose(&mut self) {
        self.supervisor.dispose();
        if self.session.take().is_some() {
            self.finish_run(true);
        }
    }

    /// `true` while a search session is attached.
    pub fn is_searching(&self) -> bool {
        self.session.is_some()
    }

    /// Process pending search messages. Called once per frame.
    ///
    /// Returns `true` if the UI should repaint.
    pub fn process_search_messages(&mut self) -> bool {
        let mut repaint = false;
        let mut messages_this_frame = 0usize;

        while messages_this_frame < MAX_MESSAGES_PER_FRAME {
            let Some(session) = self.session.as_ref() else {
                break;
            };
            let msg = match session.progress_rx.try_recv() {
                Ok(m) => m,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // Worker gone without a terminal message.
                    self.session = None;
                    self.finish_run(true);
                    return true;
                }
            };
            messages_this_frame += 1;
            repaint = true;
            self.apply(msg);
        }

        repaint
    }

    fn apply(&mut self, msg: SearchProgress) {
        match msg {
            SearchProgress::Started { total } => {
                self.progress = ProgressCounter::start(total);
            }
            SearchProgress::Match(node) => {
                self.matches.append(node);
                if self.first_result.swap(false, Ordering::Relaxed) {
                    self.selected = Some(0);
                }
            }
            SearchProgress::Progress { visited } => {
                self.progress.advance_to(visited);
            }
            SearchProgress::Error { path, message } => {
                self.search_error_count += 1;
                if self.search_errors.len() < MAX_SEARCH_ERRORS {
                    self.search_errors.push((path, message));
                }
            }
            SearchProgress::Complete { duration, .. } => {
                self.search_duration = Some(duration);
                self.progress.finish();
                self.session = None;
                self.finish_run(false);
            }
            SearchProgress::Cancelled => {
                self.session = None;
                self.finish_run(true);
            }
        }
    }

    fn finish_run(&mut self, cancelled: bool) {
        if let Some(id) = self.match_observer.take() {
            self.matches.unobserve(id);
        }
        if cancelled {
            self.search_was_cancelled = true;
            self.progress.stop();
        }
        self.phase = AppPhase::Results;
        self.controls_enabled = true;
        self.focus_text = true;
    }

    /// Select a result row.
    pub fn select(&mut self, index: usize) {
        if index < self.matches.len() {
            self.selected = Some(index);
        }
    }

    pub fn selected_node(&self) -> Option<NodeIndex> {
        self.selected.and_then(|i| self.matches.get(i))
    }

    /// Display path of the selected result.
    pub fn selected_path(&self) -> Option<String> {
        self.selected_node().map(|n| self.tree.full_path(n))
    }
}
