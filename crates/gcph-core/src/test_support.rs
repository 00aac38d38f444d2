//! In-memory commit graph implementing `GitOps` for unit tests.

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::{Hash, Hasher};
use std::path::Path;

use gcph_git::{CommitInfo, GitOps, Oid, PickStatus, Result as GitResult};

/// Mock implementation of `GitOps` backed by `RefCell`s.
///
/// Every mutating call is appended to `calls` as a short readable string
/// (`checkout main`, `branch feat`, `pick B`).
#[derive(Default)]
pub struct MockGitOps {
    commits: RefCell<HashMap<Oid, CommitInfo>>,
    diffs: RefCell<HashMap<Oid, String>>,
    refs: RefCell<HashMap<String, Oid>>,
    branches: RefCell<HashSet<String>>,
    conflicts: RefCell<HashSet<Oid>>,
    dirty_checks: RefCell<VecDeque<bool>>,
    pub calls: RefCell<Vec<String>>,
}

impl MockGitOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic identity derived from a commit name.
    pub fn oid_for(name: &str) -> Oid {
        let mut bytes = [0u8; 20];
        for (chunk, salt) in bytes.chunks_mut(8).zip(0u64..) {
            let mut hasher = DefaultHasher::new();
            (name, salt).hash(&mut hasher);
            let digest = hasher.finish().to_be_bytes();
            chunk.copy_from_slice(&digest[..chunk.len()]);
        }
        Oid::from_bytes(&bytes).unwrap()
    }

    /// Add a commit; its summary is `name` and its patch is `diff`.
    pub fn add_commit(&self, name: &str, parents: &[Oid], authored: i64, diff: &str) -> Oid {
        let id = Self::oid_for(name);
        self.commits.borrow_mut().insert(
            id,
            CommitInfo {
                id,
                parents: parents.to_vec(),
                authored,
                summary: name.to_string(),
            },
        );
        self.diffs.borrow_mut().insert(id, diff.to_string());
        id
    }

    /// Point a local branch at a commit.
    pub fn with_branch(self, name: &str, id: Oid) -> Self {
        self.refs.borrow_mut().insert(name.to_string(), id);
        self.branches.borrow_mut().insert(name.to_string());
        self
    }

    /// Make cherry-picking `id` report a conflict.
    pub fn with_conflict(self, id: Oid) -> Self {
        self.conflicts.borrow_mut().insert(id);
        self
    }

    /// Script the answers of successive `is_dirty` calls; `false` afterwards.
    pub fn with_dirty_sequence(self, answers: &[bool]) -> Self {
        self.dirty_checks.borrow_mut().extend(answers);
        self
    }

    fn summary(&self, id: Oid) -> String {
        self.commits
            .borrow()
            .get(&id)
            .map_or_else(|| id.to_string(), |c| c.summary.clone())
    }

    fn missing(what: &str) -> gcph_git::Error {
        gcph_git::Error::CommandFailed {
            command: format!("git show {what}"),
            status: 128,
            stderr: "bad object".into(),
        }
    }
}

impl GitOps for MockGitOps {
    fn workdir(&self) -> Option<&Path> {
        None
    }

    fn resolve_ref(&self, name: &str) -> GitResult<Oid> {
        if let Some(id) = self.refs.borrow().get(name) {
            return Ok(*id);
        }
        Oid::from_str(name)
            .ok()
            .filter(|id| self.commits.borrow().contains_key(id))
            .ok_or_else(|| gcph_git::Error::RefNotFound(name.to_string()))
    }

    fn list_refs(&self) -> GitResult<Vec<String>> {
        let mut refs: Vec<String> = self.refs.borrow().keys().cloned().collect();
        refs.sort();
        Ok(refs)
    }

    fn branch_exists(&self, name: &str) -> bool {
        self.branches.borrow().contains(name)
    }

    fn commit(&self, id: Oid) -> GitResult<CommitInfo> {
        self.commits
            .borrow()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::missing(&id.to_string()))
    }

    fn diff_text(&self, id: Oid) -> GitResult<String> {
        self.diffs
            .borrow()
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::missing(&id.to_string()))
    }

    fn show_text(&self, id: Oid) -> GitResult<String> {
        let diff = self.diff_text(id)?;
        Ok(format!("commit {id}\n\n    {}\n\n{diff}", self.summary(id)))
    }

    fn is_dirty(&self) -> GitResult<bool> {
        Ok(self.dirty_checks.borrow_mut().pop_front().unwrap_or(false))
    }

    fn checkout(&self, reference: &str) -> GitResult<()> {
        self.resolve_ref(reference)?;
        self.calls.borrow_mut().push(format!("checkout {reference}"));
        Ok(())
    }

    fn create_branch(&self, name: &str) -> GitResult<Oid> {
        if !self.branches.borrow_mut().insert(name.to_string()) {
            return Err(gcph_git::Error::CommandFailed {
                command: format!("git branch {name}"),
                status: 128,
                stderr: "already exists".into(),
            });
        }
        self.calls.borrow_mut().push(format!("branch {name}"));
        Ok(Oid::zero())
    }

    fn cherry_pick(&self, id: Oid) -> GitResult<PickStatus> {
        self.calls
            .borrow_mut()
            .push(format!("pick {}", self.summary(id)));

        if self.conflicts.borrow().contains(&id) {
            return Ok(PickStatus::Conflicted {
                output: "CONFLICT (content)".into(),
            });
        }
        Ok(PickStatus::Applied)
    }
}
