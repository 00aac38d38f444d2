//! Error types for gcph-git.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not inside a git repository.
    #[error("not a git repository")]
    NotARepository,

    /// Reference could not be resolved to a commit.
    #[error("reference not found: {0}")]
    RefNotFound(String),

    /// Branch not found.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// A `git` invocation exited with a non-zero status.
    #[error("`{command}` failed with status {status}: {stderr}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Exit status, or -1 when killed by a signal.
        status: i32,
        /// Captured standard error.
        stderr: String,
    },

    /// Spawning the `git` binary failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}
