/// Search module: finds files whose bytes contain a pattern.
///
/// A search runs on one background thread per request:
/// - [`walker`] visits every leaf in scope, depth-first.
/// - [`bytes`] streams each file through a fixed window looking for the pattern.
/// - [`task`] owns one walk and reports over a crossbeam channel.
/// - [`supervisor`] keeps at most one task current and retires the old one.
///
/// The UI side folds [`progress::SearchProgress`] messages into a
/// [`results::MatchList`] and a [`progress::ProgressCounter`].
pub mod bytes;
pub mod cancel;
pub mod pattern;
pub mod progress;
pub mod results;
pub mod supervisor;
pub mod task;
pub mod walker;

pub use bytes::contains_pattern;
pub use cancel::CancelToken;
pub use pattern::Pattern;
pub use progress::{ProgressCounter, SearchProgress};
pub use results::{ListEvent, MatchList, ObserverId};
pub use supervisor::{SearchRequest, SearchSession, Supervisor};
pub use task::{SearchTask, TaskHandle, TaskState};
pub use walker::{SearchScope, TreeWalker, WalkOutcome, WalkStats};
