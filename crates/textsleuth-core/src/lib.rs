/// TextSleuth Core: tree model and background content search.
///
/// This crate contains all search logic with zero UI dependencies.
///
/// # Modules
///
/// - [`model`]: Arena-allocated file tree the search is scoped to.
/// - [`search`]: Byte scanner, tree walker, cancellable tasks and supervisor.
/// - [`config`]: Tunable limits with JSON overrides.
/// - [`error`]: Errors returned synchronously to callers.
pub mod config;
pub mod error;
pub mod model;
pub mod search;

pub use config::SearchConfig;
pub use error::SearchError;
