//! Trait abstractions for git operations.
//!
//! This module defines the `GitOps` trait which is everything the triage
//! engine and replay driver need from a version-control backend, enabling
//! dependency injection and testability.

use std::path::Path;

use git2::Oid;

use crate::{CommitInfo, PickStatus, Result};

/// Trait for git repository operations.
///
/// This trait abstracts git operations, allowing for:
/// - Dependency injection in the session and replay driver
/// - In-memory commit graphs for testing
///
/// Mutating operations report a failed command through their `Result`
/// rather than panicking. A conflicting cherry-pick is not an error: it is
/// reported as [`PickStatus::Conflicted`].
#[allow(clippy::missing_errors_doc)]
pub trait GitOps {
    // === Repository Info ===

    /// Get the working directory path.
    fn workdir(&self) -> Option<&Path>;

    // === References ===

    /// Resolve a reference name (branch, tag, `HEAD`, revision) to a commit.
    ///
    /// Returns `RefNotFound` if the name does not resolve.
    fn resolve_ref(&self, name: &str) -> Result<Oid>;

    /// List short names of all references, for completion.
    fn list_refs(&self) -> Result<Vec<String>>;

    /// Check if a local branch exists.
    fn branch_exists(&self, name: &str) -> bool;

    // === Commit Graph ===

    /// Read a commit's parents, authored timestamp and summary.
    fn commit(&self, id: Oid) -> Result<CommitInfo>;

    /// Full patch text with object hashes and hunk headers stripped.
    fn diff_text(&self, id: Oid) -> Result<String>;

    /// Unmodified `git show` output for display.
    fn show_text(&self, id: Oid) -> Result<String>;

    // === Working Directory ===

    /// Check if tracked files have uncommitted changes.
    fn is_dirty(&self) -> Result<bool>;

    // === Mutations ===

    /// Checkout a reference.
    fn checkout(&self, reference: &str) -> Result<()>;

    /// Create a branch at HEAD and switch to it.
    fn create_branch(&self, name: &str) -> Result<Oid>;

    /// Cherry-pick a commit onto HEAD.
    fn cherry_pick(&self, id: Oid) -> Result<PickStatus>;
}
