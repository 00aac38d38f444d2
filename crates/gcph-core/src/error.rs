//! Error types for gcph-core.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gcph-core operations.
///
/// Everything except `Io`/`Toml` is recoverable at the command boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reference could not be resolved to a commit.
    #[error("unknown reference: {0}")]
    UnknownRef(String),

    /// Target branch was never declared in this session.
    #[error("branch '{0}' has not been declared - use `branch {0}` first")]
    UnknownBranch(String),

    /// Replay would overwrite an existing branch.
    #[error("branch '{0}' already exists")]
    BranchExists(String),

    /// Index does not resolve to a visible candidate.
    #[error("index {index} does not refer to a listed commit ({len} candidates)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of candidates in the current listing.
        len: usize,
    },

    /// Option key or value outside its domain.
    #[error("{0}")]
    InvalidOption(String),

    /// No destination base branch configured.
    #[error("no base branch configured - use `onto <ref>` first")]
    MissingBase,

    /// Invalid target branch name.
    #[error("invalid branch name '{name}': {reason}")]
    InvalidBranchName {
        /// The invalid name.
        name: String,
        /// Why the name is invalid.
        reason: String,
    },

    /// A version-control invocation failed.
    #[error("backend command failed: {0}")]
    BackendCommandFailed(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<gcph_git::Error> for Error {
    fn from(err: gcph_git::Error) -> Self {
        match err {
            gcph_git::Error::RefNotFound(name) => Self::UnknownRef(name),
            gcph_git::Error::Io(e) => Self::Io(e),
            other => Self::BackendCommandFailed(other.to_string()),
        }
    }
}
