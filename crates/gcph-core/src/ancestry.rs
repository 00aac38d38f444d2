//! Lazy ancestry enumeration over the commit graph.

use std::collections::HashSet;

use gcph_git::{CommitInfo, GitOps, Oid};

use crate::error::Result;

/// Iterator over every commit reachable from a set of roots, roots included.
///
/// Traversal uses an explicit stack, so history depth is bounded only by
/// memory. Each commit is yielded once even when several merge parents
/// lead to it. Call [`Ancestors::restart`] or clone before iterating to walk
/// the same roots again.
pub struct Ancestors<'a, G: GitOps> {
    repo: &'a G,
    roots: Vec<Oid>,
    pending: Vec<Oid>,
    seen: HashSet<Oid>,
}

impl<'a, G: GitOps> Ancestors<'a, G> {
    /// Walk the ancestry of a single commit.
    #[must_use]
    pub fn new(repo: &'a G, root: Oid) -> Self {
        Self::from_roots(repo, [root])
    }

    /// Walk the union of ancestries of several commits.
    #[must_use]
    pub fn from_roots(repo: &'a G, roots: impl IntoIterator<Item = Oid>) -> Self {
        let roots: Vec<Oid> = roots.into_iter().collect();
        Self {
            repo,
            pending: roots.clone(),
            roots,
            seen: HashSet::new(),
        }
    }

    /// Reset to the initial roots, forgetting everything visited.
    pub fn restart(&mut self) {
        self.pending.clone_from(&self.roots);
        self.seen.clear();
    }
}

impl<G: GitOps> Clone for Ancestors<'_, G> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo,
            roots: self.roots.clone(),
            pending: self.pending.clone(),
            seen: self.seen.clone(),
        }
    }
}

impl<G: GitOps> Iterator for Ancestors<'_, G> {
    type Item = Result<CommitInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.pending.pop() {
            if !self.seen.insert(id) {
                continue;
            }

            return Some(match self.repo.commit(id) {
                Ok(commit) => {
                    self.pending.extend(commit.parents.iter().copied());
                    Ok(commit)
                }
                Err(e) => Err(e.into()),
            });
        }
        None
    }
}

/// Collect the full ancestry of `root`.
///
/// # Errors
/// Returns error if any commit in the ancestry cannot be read.
pub fn ancestors<G: GitOps>(repo: &G, root: Oid) -> Result<Vec<CommitInfo>> {
    Ancestors::new(repo, root).collect()
}
