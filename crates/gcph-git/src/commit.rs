//! Commit metadata as read from the backend.

use git2::Oid;

/// Cached fields of a commit that triage and display need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Commit identity.
    pub id: Oid,
    /// Parent identities, first parent first.
    pub parents: Vec<Oid>,
    /// Authored timestamp in seconds since the epoch.
    pub authored: i64,
    /// First line of the commit message.
    pub summary: String,
}

impl CommitInfo {
    /// Whether this commit has more than one parent.
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Abbreviated identity used for display.
    #[must_use]
    pub fn short_id(&self) -> String {
        let id = self.id.to_string();
        id[..7.min(id.len())].to_string()
    }
}

/// Outcome of a cherry-pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickStatus {
    /// The commit applied cleanly.
    Applied,
    /// `git cherry-pick` exited non-zero; the working tree needs a human.
    Conflicted {
        /// Combined output of the failed pick.
        output: String,
    },
}

impl PickStatus {
    /// Check if the pick applied cleanly.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Strip lines of `git show` output that carry no content.
///
/// Object hashes (`commit`, `index`) and hunk headers (`@@`) differ between
/// a commit and its rebased copy, so they are dropped before scoring.
#[must_use]
pub fn clean_show_output(show: &str) -> String {
    show.split('\n')
        .filter(|line| {
            !(line.starts_with("commit ") || line.starts_with("index ") || line.starts_with("@@"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
