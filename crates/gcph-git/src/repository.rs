//! Repository wrapper providing high-level git operations.

use std::path::Path;
use std::process::{Command, Output};

use git2::{BranchType, Oid, StatusOptions};

use crate::commit::{CommitInfo, PickStatus, clean_show_output};
use crate::error::{Error, Result};
use crate::traits::GitOps;

/// High-level wrapper around a git repository.
pub struct Repository {
    inner: git2::Repository,
}

impl Repository {
    /// Open a repository at the given path.
    ///
    /// # Errors
    /// Returns error if no repository found at path or any parent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let inner = git2::Repository::discover(path).map_err(|_| Error::NotARepository)?;
        Ok(Self { inner })
    }

    /// Open the repository containing the current directory.
    ///
    /// # Errors
    /// Returns error if not inside a git repository.
    pub fn open_current() -> Result<Self> {
        Self::open(".")
    }

    /// Get the path to the .git directory.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        self.inner.path()
    }

    /// Get the name of the current branch, if HEAD is on one.
    #[must_use]
    pub fn current_branch(&self) -> Option<String> {
        let head = self.inner.head().ok()?;
        if !head.is_branch() {
            return None;
        }
        head.shorthand().map(String::from)
    }

    /// Run `git` in the working directory and capture its output.
    fn run_git(&self, args: &[&str]) -> Result<Output> {
        let workdir = self.workdir().ok_or(Error::NotARepository)?;
        tracing::debug!(args = ?args, "running git");

        Ok(Command::new("git").args(args).current_dir(workdir).output()?)
    }

    /// Run `git` and return stdout, failing on a non-zero exit.
    fn git(&self, args: &[&str]) -> Result<String> {
        let output = self.run_git(args)?;
        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: format!("git {}", args.join(" ")),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    // === Low-level access ===

    /// Get a reference to the underlying git2 repository.
    ///
    /// Use sparingly - prefer high-level methods.
    #[must_use]
    pub const fn inner(&self) -> &git2::Repository {
        &self.inner
    }
}

impl GitOps for Repository {
    fn workdir(&self) -> Option<&Path> {
        self.inner.workdir()
    }

    fn resolve_ref(&self, name: &str) -> Result<Oid> {
        let object = self
            .inner
            .revparse_single(name)
            .map_err(|_| Error::RefNotFound(name.into()))?;

        object
            .peel_to_commit()
            .map(|commit| commit.id())
            .map_err(|_| Error::RefNotFound(name.into()))
    }

    fn list_refs(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .inner
            .references()?
            .filter_map(std::result::Result::ok)
            .filter_map(|r| r.shorthand().map(String::from))
            .collect();

        names.push("HEAD".into());
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn branch_exists(&self, name: &str) -> bool {
        self.inner.find_branch(name, BranchType::Local).is_ok()
    }

    fn commit(&self, id: Oid) -> Result<CommitInfo> {
        let commit = self.inner.find_commit(id)?;

        Ok(CommitInfo {
            id,
            parents: commit.parent_ids().collect(),
            authored: commit.author().when().seconds(),
            summary: commit.summary().unwrap_or_default().to_string(),
        })
    }

    fn diff_text(&self, id: Oid) -> Result<String> {
        let show = self.show_text(id)?;
        Ok(clean_show_output(&show))
    }

    fn show_text(&self, id: Oid) -> Result<String> {
        self.git(&["show", "--no-color", &id.to_string()])
    }

    fn is_dirty(&self) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);

        let statuses = self.inner.statuses(Some(&mut opts))?;
        Ok(!statuses.is_empty())
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        self.git(&["checkout", "--quiet", reference])?;
        Ok(())
    }

    fn create_branch(&self, name: &str) -> Result<Oid> {
        let head_commit = self.inner.head()?.peel_to_commit()?;
        let branch = self.inner.branch(name, &head_commit, false)?;
        let target = branch
            .get()
            .target()
            .ok_or_else(|| Error::BranchNotFound(name.into()))?;

        // Same tree as HEAD, so only the symbolic ref moves.
        self.inner.set_head(&format!("refs/heads/{name}"))?;

        Ok(target)
    }

    fn cherry_pick(&self, id: Oid) -> Result<PickStatus> {
        let sha = id.to_string();
        let is_merge = self.inner.find_commit(id)?.parent_count() > 1;

        let mut args = vec!["cherry-pick"];
        if is_merge {
            args.extend(["-m", "1"]);
        }
        args.push(&sha);

        let output = self.run_git(&args)?;
        if output.status.success() {
            return Ok(PickStatus::Applied);
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        tracing::debug!(commit = %sha, status = ?output.status.code(), "cherry-pick failed");

        Ok(PickStatus::Conflicted {
            output: text.trim().to_string(),
        })
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.git_dir())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use git2::{Signature, Time};
    use std::fs;
    use tempfile::TempDir;

    fn signature(seconds: i64) -> Signature<'static> {
        Signature::new("Test User", "test@example.com", &Time::new(seconds, 0)).unwrap()
    }

    fn commit_file(repo: &git2::Repository, file: &str, content: &str, at: i64) -> Oid {
        let workdir = repo.workdir().unwrap().to_path_buf();
        fs::write(workdir.join(file), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let parents: Vec<git2::Commit<'_>> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let sig = signature(at);
        repo.commit(
            Some("HEAD"),
            &sig,
            &sig,
            &format!("Update {file}\n\nBody text"),
            &tree,
            &parent_refs,
        )
        .unwrap()
    }

    fn init_test_repo() -> (TempDir, Repository) {
        let temp = TempDir::new().unwrap();
        let repo = git2::Repository::init(temp.path()).unwrap();
        commit_file(&repo, "README.md", "# test\n", 1_700_000_000);

        let wrapped = Repository { inner: repo };
        (temp, wrapped)
    }

    #[test]
    fn test_resolve_head_and_branch() {
        let (_temp, repo) = init_test_repo();

        let head = repo.resolve_ref("HEAD").unwrap();
        let branch = repo.current_branch().unwrap();
        assert_eq!(repo.resolve_ref(&branch).unwrap(), head);
    }

    #[test]
    fn test_resolve_unknown_ref() {
        let (_temp, repo) = init_test_repo();

        let err = repo.resolve_ref("does-not-exist").unwrap_err();
        assert!(matches!(err, Error::RefNotFound(name) if name == "does-not-exist"));
    }

    #[test]
    fn test_commit_info() {
        let (_temp, repo) = init_test_repo();
        let first = repo.resolve_ref("HEAD").unwrap();
        let second = commit_file(repo.inner(), "a.txt", "a\n", 1_700_000_100);

        let info = repo.commit(second).unwrap();
        assert_eq!(info.id, second);
        assert_eq!(info.parents, vec![first]);
        assert_eq!(info.authored, 1_700_000_100);
        assert_eq!(info.summary, "Update a.txt");
        assert!(!info.is_merge());
    }

    #[test]
    fn test_create_branch_switches_head() {
        let (_temp, repo) = init_test_repo();
        let head = repo.resolve_ref("HEAD").unwrap();

        let target = repo.create_branch("feature/pick").unwrap();
        assert_eq!(target, head);
        assert!(repo.branch_exists("feature/pick"));
        assert_eq!(repo.current_branch().as_deref(), Some("feature/pick"));
    }

    #[test]
    fn test_create_existing_branch_fails() {
        let (_temp, repo) = init_test_repo();

        repo.create_branch("dup").unwrap();
        assert!(repo.create_branch("dup").is_err());
    }

    #[test]
    fn test_is_dirty_ignores_untracked() {
        let (temp, repo) = init_test_repo();
        assert!(!repo.is_dirty().unwrap());

        fs::write(temp.path().join("untracked.txt"), "content").unwrap();
        assert!(!repo.is_dirty().unwrap());

        fs::write(temp.path().join("README.md"), "changed\n").unwrap();
        assert!(repo.is_dirty().unwrap());
    }

    #[test]
    fn test_list_refs() {
        let (_temp, repo) = init_test_repo();
        repo.inner()
            .branch(
                "feature/a",
                &repo.inner().head().unwrap().peel_to_commit().unwrap(),
                false,
            )
            .unwrap();

        let refs = repo.list_refs().unwrap();
        assert!(refs.iter().any(|r| r == "feature/a"));
        assert!(refs.iter().any(|r| r == "HEAD"));
    }
}
