//! Mutable session state edited by interactive commands.
//!
//! A [`Session`] owns the run-time options, the declared target branches
//! with their accepted commits, the blacklist, and the result of the most
//! recent triage pass. Candidate indices always refer to that last pass.

use std::collections::BTreeSet;
use std::fmt;

use gcph_git::{CommitInfo, GitOps, Oid};

use crate::blacklist::Blacklist;
use crate::branch_name::BranchName;
use crate::config::{ErrorPolicy, GeneralConfig};
use crate::error::{Error, Result};
use crate::similarity::Scorer;
use crate::triage::{Candidate, Classifier, Status, Triage, Verdict};

/// Run-time options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Branch whose history is triaged.
    pub source: String,
    /// Destination base branch.
    pub onto: Option<String>,
    /// Additional branches whose history is excluded.
    pub ignore: BTreeSet<String>,
    /// Print replay actions instead of running them.
    pub dry_run: bool,
    /// Classify merge commits instead of skipping them.
    pub include_merges: bool,
    /// List blacklisted candidates.
    pub show_blacklist: bool,
    /// Print or propagate command errors.
    pub error_policy: ErrorPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            source: "HEAD".into(),
            onto: None,
            ignore: BTreeSet::new(),
            dry_run: false,
            include_merges: false,
            show_blacklist: false,
            error_policy: ErrorPolicy::Print,
        }
    }
}

impl From<&GeneralConfig> for Options {
    fn from(general: &GeneralConfig) -> Self {
        Self {
            onto: general.default_onto.clone(),
            dry_run: general.dry_run,
            include_merges: general.include_merges,
            show_blacklist: general.show_blacklist,
            error_policy: general.error_policy,
            ..Self::default()
        }
    }
}

/// Settable option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKey {
    /// `source <ref>`
    Source,
    /// `onto <ref>`
    Onto,
    /// `ignore_branch <ref>...`
    IgnoreBranch,
    /// `set error {print|raise}`
    Error,
    /// `set dryrun {false|true}`
    DryRun,
    /// `set merge {false|true}`
    Merge,
    /// `set show_blacklist {false|true}`
    ShowBlacklist,
}

impl OptionKey {
    /// Name as typed at the prompt.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Onto => "onto",
            Self::IgnoreBranch => "ignore_branch",
            Self::Error => "error",
            Self::DryRun => "dryrun",
            Self::Merge => "merge",
            Self::ShowBlacklist => "show_blacklist",
        }
    }

    /// Accepted values for non-reference options.
    #[must_use]
    pub const fn domain(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Error => Some(&["print", "raise"]),
            Self::DryRun | Self::Merge | Self::ShowBlacklist => Some(&["false", "true"]),
            Self::Source | Self::Onto | Self::IgnoreBranch => None,
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A declared target branch and the commits accepted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetBranch {
    /// Branch to create on replay.
    pub name: BranchName,
    /// Accepted commits in acceptance order.
    pub commits: Vec<Oid>,
}

/// One listed candidate with its effective status.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    /// Index used to refer to the candidate in commands.
    pub index: usize,
    /// The candidate.
    pub candidate: &'a Candidate,
    /// Status after session overrides.
    pub status: Status,
}

/// The single mutable aggregate every command operates on.
#[derive(Debug, Clone)]
pub struct Session {
    /// Run-time options.
    pub options: Options,
    targets: Vec<TargetBranch>,
    blacklist: Blacklist,
    scorer: Scorer,
    triage: Option<Triage>,
}

impl Session {
    /// Create a session with no target branches and no triage yet.
    #[must_use]
    pub const fn new(options: Options, blacklist: Blacklist, scorer: Scorer) -> Self {
        Self {
            options,
            targets: Vec::new(),
            blacklist,
            scorer,
            triage: None,
        }
    }

    /// The persistent blacklist.
    #[must_use]
    pub const fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    /// Declared target branches in declaration order.
    #[must_use]
    pub fn targets(&self) -> &[TargetBranch] {
        &self.targets
    }

    /// Result of the last triage pass, if any.
    #[must_use]
    pub const fn triage(&self) -> Option<&Triage> {
        self.triage.as_ref()
    }

    /// Scorer used for duplicate detection.
    #[must_use]
    pub const fn scorer(&self) -> Scorer {
        self.scorer
    }

    /// Find a declared target branch.
    #[must_use]
    pub fn find_target(&self, name: &str) -> Option<&TargetBranch> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Target branch a commit is assigned to.
    #[must_use]
    pub fn picked_by(&self, id: Oid) -> Option<&BranchName> {
        self.targets
            .iter()
            .find(|t| t.commits.contains(&id))
            .map(|t| &t.name)
    }

    // === Branch declarations ===

    /// Declare a target branch. Returns `false` if it was already declared.
    ///
    /// # Errors
    /// Returns `InvalidBranchName` if `name` is not a valid git branch name.
    pub fn declare_branch(&mut self, name: &str) -> Result<bool> {
        let name = BranchName::new(name)?;
        if self.find_target(&name).is_some() {
            return Ok(false);
        }
        self.targets.push(TargetBranch {
            name,
            commits: Vec::new(),
        });
        Ok(true)
    }

    /// Remove a target branch; its commits fall back to their computed status.
    ///
    /// # Errors
    /// Returns `UnknownBranch` if the branch was never declared.
    pub fn remove_branch(&mut self, name: &str) -> Result<TargetBranch> {
        let pos = self
            .targets
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| Error::UnknownBranch(name.to_string()))?;
        Ok(self.targets.remove(pos))
    }

    // === Candidate listing ===

    /// Effective status of a candidate, or `None` if it is hidden as already applied.
    #[must_use]
    pub fn status(&self, candidate: &Candidate) -> Option<Status> {
        let id = candidate.commit.id;
        if let Some(branch) = self.picked_by(id) {
            return Some(Status::Picked(branch.to_string()));
        }
        if self.blacklist.contains(&id.to_string()) {
            return Some(Status::Ignored);
        }
        match candidate.verdict {
            Verdict::NotIn => Some(Status::NotIn),
            Verdict::Maybe { best, score } => Some(Status::Maybe { best, score }),
            Verdict::Applied => None,
        }
    }

    /// Every candidate that has a status, blacklisted ones included.
    #[must_use]
    pub fn entries(&self) -> Vec<Entry<'_>> {
        let Some(triage) = &self.triage else {
            return Vec::new();
        };

        triage
            .candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                self.status(candidate).map(|status| Entry {
                    index,
                    candidate,
                    status,
                })
            })
            .collect()
    }

    /// Candidates shown under the current `show_blacklist` setting.
    #[must_use]
    pub fn visible(&self) -> Vec<Entry<'_>> {
        self.entries()
            .into_iter()
            .filter(|e| self.options.show_blacklist || e.status != Status::Ignored)
            .collect()
    }

    /// Number of blacklisted candidates currently hidden.
    #[must_use]
    pub fn hidden_count(&self) -> usize {
        if self.options.show_blacklist {
            return 0;
        }
        self.entries()
            .iter()
            .filter(|e| e.status == Status::Ignored)
            .count()
    }

    /// Number of candidates in the last triage pass.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.triage.as_ref().map_or(0, |t| t.candidates.len())
    }

    /// Resolve an index to a visible candidate.
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` if the index is past the listing or hidden.
    pub fn candidate(&self, index: usize) -> Result<&Candidate> {
        let out_of_range = || Error::IndexOutOfRange {
            index,
            len: self.candidate_count(),
        };

        let candidate = self
            .triage
            .as_ref()
            .and_then(|t| t.candidates.get(index))
            .ok_or_else(out_of_range)?;

        match self.status(candidate) {
            Some(Status::Ignored) if !self.options.show_blacklist => Err(out_of_range()),
            Some(_) => Ok(candidate),
            None => Err(out_of_range()),
        }
    }

    // === Mutations ===

    /// Append candidates to a declared branch, moving them out of any other.
    ///
    /// All indices are validated before anything changes.
    ///
    /// # Errors
    /// Returns `UnknownBranch` or `IndexOutOfRange`.
    pub fn assign(&mut self, branch: &str, indices: &[usize]) -> Result<()> {
        if self.find_target(branch).is_none() {
            return Err(Error::UnknownBranch(branch.to_string()));
        }
        let ids = indices
            .iter()
            .map(|&i| self.candidate(i).map(|c| c.commit.id))
            .collect::<Result<Vec<Oid>>>()?;

        for id in ids {
            for target in &mut self.targets {
                if target.name != branch {
                    target.commits.retain(|c| *c != id);
                }
            }
            if let Some(target) = self.targets.iter_mut().find(|t| t.name == branch) {
                if !target.commits.contains(&id) {
                    target.commits.push(id);
                }
            }
        }
        Ok(())
    }

    /// Blacklist a candidate. Returns `false` if it already was.
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` if the index is not a visible candidate.
    pub fn blacklist_commit(&mut self, index: usize) -> Result<bool> {
        let id = self.candidate(index)?.commit.id;
        Ok(self.blacklist.insert(id.to_string()))
    }

    /// Set an option from the tokens typed after its name.
    ///
    /// Empty tokens are ignored and duplicates collapse. Reference options
    /// must resolve in `repo`; `source` and `onto` default to `HEAD`.
    ///
    /// # Errors
    /// Returns `InvalidOption` for a value outside the option's domain and
    /// `UnknownRef` for a reference that does not resolve.
    pub fn set_option<G: GitOps>(&mut self, repo: &G, key: OptionKey, values: &[&str]) -> Result<()> {
        let tokens: BTreeSet<&str> = values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect();

        match key {
            OptionKey::Source | OptionKey::Onto => {
                let reference = match tokens.len() {
                    0 => "HEAD",
                    1 => tokens.first().copied().unwrap_or("HEAD"),
                    _ => {
                        return Err(Error::InvalidOption(format!(
                            "can only set a single branch for `{key}`"
                        )));
                    }
                };
                repo.resolve_ref(reference)?;
                if key == OptionKey::Source {
                    self.options.source = reference.to_string();
                } else {
                    self.options.onto = Some(reference.to_string());
                }
            }
            OptionKey::IgnoreBranch => {
                if tokens.is_empty() {
                    return Err(Error::InvalidOption(
                        "`ignore_branch` requires at least one branch".into(),
                    ));
                }
                for reference in &tokens {
                    repo.resolve_ref(reference)?;
                }
                self.options
                    .ignore
                    .extend(tokens.into_iter().map(String::from));
            }
            OptionKey::Error | OptionKey::DryRun | OptionKey::Merge | OptionKey::ShowBlacklist => {
                let domain = key.domain().unwrap_or_default();
                let value = match tokens.len() {
                    1 => tokens.first().copied().filter(|v| domain.contains(v)),
                    _ => None,
                }
                .ok_or_else(|| {
                    Error::InvalidOption(format!(
                        "`{key}` takes exactly one of: {}",
                        domain.join(", ")
                    ))
                })?;

                match key {
                    OptionKey::Error => {
                        self.options.error_policy = if value == "raise" {
                            ErrorPolicy::Raise
                        } else {
                            ErrorPolicy::Print
                        };
                    }
                    OptionKey::DryRun => self.options.dry_run = value == "true",
                    OptionKey::Merge => self.options.include_merges = value == "true",
                    _ => self.options.show_blacklist = value == "true",
                }
            }
        }

        tracing::debug!(option = %key, "option updated");
        Ok(())
    }

    // === Triage ===

    /// References whose history is excluded: the base, then ignored branches.
    ///
    /// # Errors
    /// Returns `MissingBase` if no base branch is configured.
    pub fn excluded_refs(&self) -> Result<Vec<&str>> {
        let onto = self.options.onto.as_deref().ok_or(Error::MissingBase)?;
        Ok(std::iter::once(onto)
            .chain(self.options.ignore.iter().map(String::as_str))
            .collect())
    }

    /// Recompute the candidate list from the repository.
    ///
    /// # Errors
    /// Returns `MissingBase`, `UnknownRef`, or a backend failure.
    pub fn update<G: GitOps>(&mut self, repo: &G) -> Result<&Triage> {
        let source = repo.resolve_ref(&self.options.source)?;
        let excluded = self
            .excluded_refs()?
            .into_iter()
            .map(|r| repo.resolve_ref(r))
            .collect::<gcph_git::Result<Vec<Oid>>>()?;

        let classifier =
            Classifier::new(repo, self.scorer).with_merges(self.options.include_merges);
        let triage = classifier.triage(source, &excluded, |c| {
            self.picked_by(c.id).is_some() || self.blacklist.contains(&c.id.to_string())
        })?;

        tracing::info!(
            source = %self.options.source,
            candidates = triage.candidates.len(),
            "candidates updated"
        );
        Ok(self.triage.insert(triage))
    }

    /// Excluded commits sharing a timestamp with a candidate, with their scores.
    ///
    /// Returns `None` when no excluded commit shares the timestamp.
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` or a backend failure.
    pub fn similar_commits<G: GitOps>(
        &self,
        repo: &G,
        index: usize,
    ) -> Result<Option<Vec<(CommitInfo, f64)>>> {
        let candidate = self.candidate(index)?;
        let Some(bucket) = self.bucket(candidate) else {
            return Ok(None);
        };

        Classifier::new(repo, self.scorer)
            .similar_commits(&candidate.commit, bucket)
            .map(Some)
    }

    /// Diffs to compare for a candidate: its own first, then its bucket's.
    ///
    /// Returns `None` when no excluded commit shares the timestamp.
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` or a backend failure.
    pub fn review_diffs<G: GitOps>(&self, repo: &G, index: usize) -> Result<Option<Vec<String>>> {
        let candidate = self.candidate(index)?;
        let Some(bucket) = self.bucket(candidate) else {
            return Ok(None);
        };

        std::iter::once(&candidate.commit)
            .chain(bucket)
            .map(|c| repo.diff_text(c.id).map_err(Error::from))
            .collect::<Result<Vec<String>>>()
            .map(Some)
    }

    fn bucket(&self, candidate: &Candidate) -> Option<&[CommitInfo]> {
        self.triage.as_ref()?.bucket_for(&candidate.commit)
    }
}
