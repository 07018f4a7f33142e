/// Errors surfaced synchronously to callers of the search engine.
///
/// Per-file I/O failures are deliberately absent: they are reported as
/// `SearchProgress::Error` messages and never abort a running search.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The byte pattern was empty.
    #[error("search pattern must not be empty")]
    EmptyPattern,

    /// No character encoding is known under this label.
    #[error("unknown character encoding '{0}'")]
    UnknownEncoding(String),

    /// The text contains characters the encoding cannot represent.
    #[error("text cannot be encoded as {encoding}")]
    Unmappable { encoding: &'static str },

    /// The search scope contains no roots.
    #[error("search scope is empty")]
    EmptyScope,

    /// The OS refused to start the background search thread.
    #[error("failed to spawn search thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// Invalid or unreadable configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
