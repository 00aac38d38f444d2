//! Replay of accepted commits onto freshly created target branches.
//!
//! Replay is split into planning, which validates the session and reads
//! every commit it will need, and execution, which drives the backend.
//! A failed pick suspends execution until [`ReplayHooks`] reports that the
//! working tree is clean again.

use std::fmt;

use gcph_git::{CommitInfo, GitOps, PickStatus};

use crate::error::{Error, Result};
use crate::session::Session;

/// A single backend mutation performed during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayAction {
    /// Check out the base branch.
    Checkout(String),
    /// Create a target branch at HEAD and switch to it.
    CreateBranch(String),
    /// Cherry-pick a commit onto the current branch.
    CherryPick(CommitInfo),
}

impl fmt::Display for ReplayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkout(reference) => write!(f, "git checkout {reference}"),
            Self::CreateBranch(name) => write!(f, "git checkout -b {name}"),
            Self::CherryPick(commit) => write!(f, "git cherry-pick {}", commit.id),
        }
    }
}

/// What the human decided while a pick was left conflicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Check the working tree again.
    Retry,
    /// Stop replaying; the tree is left as is.
    Abandon,
}

/// Callbacks through which the driver reports progress and waits for a human.
pub trait ReplayHooks {
    /// Called before each action; `dry_run` actions are never executed.
    fn on_action(&mut self, action: &ReplayAction, dry_run: bool);

    /// Block until the human has dealt with a conflicted pick.
    ///
    /// # Errors
    /// Returns error if the human cannot be asked.
    fn await_resolution(
        &mut self,
        branch: &str,
        commit: &CommitInfo,
        output: &str,
    ) -> Result<Resolution>;
}

/// Commits to apply to one target branch.
#[derive(Debug, Clone)]
pub struct BranchPlan {
    /// Branch to create.
    pub name: String,
    /// Commits in the order they will be picked.
    pub commits: Vec<CommitInfo>,
}

/// Validated replay of every declared target branch.
#[derive(Debug, Clone)]
pub struct ReplayPlan {
    /// Base every branch starts from.
    pub base: String,
    /// Target branches in declaration order.
    pub branches: Vec<BranchPlan>,
}

impl ReplayPlan {
    /// Check if nothing would be picked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.iter().all(|b| b.commits.is_empty())
    }

    /// Every action in execution order.
    #[must_use]
    pub fn actions(&self) -> Vec<ReplayAction> {
        self.branches
            .iter()
            .flat_map(|branch| {
                [
                    ReplayAction::Checkout(self.base.clone()),
                    ReplayAction::CreateBranch(branch.name.clone()),
                ]
                .into_iter()
                .chain(branch.commits.iter().cloned().map(ReplayAction::CherryPick))
            })
            .collect()
    }
}

/// Result of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayResult {
    /// Every branch was created and every commit picked.
    Complete {
        /// Number of branches created.
        branches: usize,
        /// Number of commits picked.
        picked: usize,
    },
    /// Replay stopped while a pick was still conflicted.
    HaltedOnConflict {
        /// Branch being built.
        branch: String,
        /// Commit whose pick failed.
        commit: CommitInfo,
    },
}

/// Build the replay plan for the session's target branches.
///
/// Each branch's commits are applied oldest authored first. All target
/// branches are checked before anything is touched.
///
/// # Errors
/// Returns `MissingBase` without a base branch and `BranchExists` if any
/// target branch already exists.
pub fn create_replay_plan<G: GitOps>(repo: &G, session: &Session) -> Result<ReplayPlan> {
    let base = session.options.onto.clone().ok_or(Error::MissingBase)?;

    let mut branches = Vec::with_capacity(session.targets().len());
    for target in session.targets() {
        if repo.branch_exists(&target.name) {
            return Err(Error::BranchExists(target.name.to_string()));
        }

        let mut commits = target
            .commits
            .iter()
            .rev()
            .map(|id| repo.commit(*id))
            .collect::<gcph_git::Result<Vec<_>>>()?;
        commits.sort_by_key(|c| c.authored);

        branches.push(BranchPlan {
            name: target.name.to_string(),
            commits,
        });
    }

    Ok(ReplayPlan { base, branches })
}

/// Execute a replay plan.
///
/// With `dry_run` every action is reported through `hooks` and nothing is
/// executed.
///
/// # Errors
/// Returns error if a backend command fails or a hook fails.
pub fn execute_replay<G: GitOps>(
    repo: &G,
    plan: &ReplayPlan,
    dry_run: bool,
    hooks: &mut impl ReplayHooks,
) -> Result<ReplayResult> {
    let mut picked = 0;

    for branch in &plan.branches {
        let checkout = ReplayAction::Checkout(plan.base.clone());
        hooks.on_action(&checkout, dry_run);
        if !dry_run {
            repo.checkout(&plan.base)?;
        }

        let create = ReplayAction::CreateBranch(branch.name.clone());
        hooks.on_action(&create, dry_run);
        if !dry_run {
            repo.create_branch(&branch.name)?;
        }

        for commit in &branch.commits {
            hooks.on_action(&ReplayAction::CherryPick(commit.clone()), dry_run);
            if dry_run {
                continue;
            }

            if let PickStatus::Conflicted { output } = repo.cherry_pick(commit.id)? {
                tracing::warn!(branch = %branch.name, commit = %commit.id, "cherry-pick failed");
                while repo.is_dirty()? {
                    if hooks.await_resolution(&branch.name, commit, &output)?
                        == Resolution::Abandon
                    {
                        return Ok(ReplayResult::HaltedOnConflict {
                            branch: branch.name.clone(),
                            commit: commit.clone(),
                        });
                    }
                }
            }
            picked += 1;
        }

        tracing::info!(branch = %branch.name, commits = branch.commits.len(), "branch replayed");
    }

    Ok(ReplayResult::Complete {
        branches: plan.branches.len(),
        picked,
    })
}

/// Plan and execute a replay of the session.
///
/// # Errors
/// See [`create_replay_plan`] and [`execute_replay`].
pub fn replay<G: GitOps>(
    repo: &G,
    session: &Session,
    hooks: &mut impl ReplayHooks,
) -> Result<ReplayResult> {
    let plan = create_replay_plan(repo, session)?;
    execute_replay(repo, &plan, session.options.dry_run, hooks)
}
