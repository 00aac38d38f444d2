//! Candidate classification.
//!
//! A candidate is a commit reachable from the source branch but not from
//! the base or any excluded branch. Excluded commits are indexed by authored
//! timestamp; a candidate sharing a timestamp with excluded commits is
//! compared against them to spot reworked copies of work already applied.

use std::collections::{HashMap, HashSet};
use std::fmt;

use gcph_git::{CommitInfo, GitOps, Oid};

use crate::ancestry::Ancestors;
use crate::error::Result;
use crate::similarity::Scorer;

/// Classification computed from history alone, before session overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// No excluded commit shares the candidate's authored timestamp.
    NotIn,
    /// Excluded commits share the timestamp but at least one pair differs.
    Maybe {
        /// Closest excluded commit.
        best: Oid,
        /// Its similarity to the candidate.
        score: f64,
    },
    /// Indistinguishable from excluded work; hidden unless overridden.
    Applied,
}

/// Status shown for a candidate.
///
/// `Picked` and `Ignored` are session facts that take precedence over the
/// computed [`Verdict`].
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// New work.
    NotIn,
    /// Probable duplicate of an excluded commit.
    Maybe {
        /// Closest excluded commit.
        best: Oid,
        /// Its similarity to the candidate.
        score: f64,
    },
    /// Assigned to a target branch.
    Picked(String),
    /// Present in the blacklist.
    Ignored,
}

impl Status {
    /// Short label used in listings and logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotIn => "notin",
            Self::Maybe { .. } => "maybe",
            Self::Picked(_) => "picked",
            Self::Ignored => "ignored",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A candidate commit and its computed verdict.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The commit.
    pub commit: CommitInfo,
    /// Classification from history.
    pub verdict: Verdict,
}

/// Excluded commits grouped by authored timestamp.
#[derive(Debug, Clone, Default)]
pub struct TimestampBuckets {
    buckets: HashMap<i64, Vec<CommitInfo>>,
}

impl TimestampBuckets {
    /// Add a commit to the bucket for its authored timestamp.
    pub fn insert(&mut self, commit: CommitInfo) {
        self.buckets.entry(commit.authored).or_default().push(commit);
    }

    /// Excluded commits authored at `timestamp`, in walk order.
    #[must_use]
    pub fn get(&self, timestamp: i64) -> Option<&[CommitInfo]> {
        self.buckets.get(&timestamp).map(Vec::as_slice)
    }

    /// Number of distinct timestamps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if no excluded commits were indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl FromIterator<CommitInfo> for TimestampBuckets {
    fn from_iter<I: IntoIterator<Item = CommitInfo>>(iter: I) -> Self {
        let mut buckets = Self::default();
        for commit in iter {
            buckets.insert(commit);
        }
        buckets
    }
}

/// Result of one triage pass.
#[derive(Debug, Clone, Default)]
pub struct Triage {
    /// Candidates, most recently authored first.
    pub candidates: Vec<Candidate>,
    /// Excluded history indexed by timestamp.
    pub buckets: TimestampBuckets,
}

impl Triage {
    /// Excluded commits sharing a timestamp with `commit`.
    #[must_use]
    pub fn bucket_for(&self, commit: &CommitInfo) -> Option<&[CommitInfo]> {
        self.buckets.get(commit.authored)
    }
}

/// Computes candidate sets and their verdicts.
pub struct Classifier<'a, G: GitOps> {
    repo: &'a G,
    scorer: Scorer,
    include_merges: bool,
}

impl<'a, G: GitOps> Classifier<'a, G> {
    /// Create a classifier that skips merge commits.
    #[must_use]
    pub const fn new(repo: &'a G, scorer: Scorer) -> Self {
        Self {
            repo,
            scorer,
            include_merges: false,
        }
    }

    /// Whether merge commits are classified or skipped.
    #[must_use]
    pub const fn with_merges(mut self, include_merges: bool) -> Self {
        self.include_merges = include_merges;
        self
    }

    /// Classify every commit in `ancestors(source) - ancestors(excluded...)`.
    ///
    /// Commits found verbatim in excluded history never become candidates.
    /// A candidate whose verdict is [`Verdict::Applied`] is dropped unless
    /// `is_overridden` says the session already picked or blacklisted it.
    ///
    /// # Errors
    /// Returns error if the commit graph or a diff cannot be read.
    pub fn triage(
        &self,
        source: Oid,
        excluded: &[Oid],
        is_overridden: impl Fn(&CommitInfo) -> bool,
    ) -> Result<Triage> {
        let included: Vec<CommitInfo> = Ancestors::new(self.repo, source).collect::<Result<_>>()?;
        let excluded_history: Vec<CommitInfo> =
            Ancestors::from_roots(self.repo, excluded.iter().copied()).collect::<Result<_>>()?;

        let excluded_ids: HashSet<Oid> = excluded_history.iter().map(|c| c.id).collect();
        let buckets: TimestampBuckets = excluded_history.into_iter().collect();

        let mut remaining: Vec<CommitInfo> = included
            .into_iter()
            .filter(|c| !excluded_ids.contains(&c.id))
            .collect();
        remaining.sort_by(|a, b| b.authored.cmp(&a.authored).then_with(|| a.id.cmp(&b.id)));

        let mut diffs = HashMap::new();
        let mut candidates = Vec::with_capacity(remaining.len());
        let mut skipped_merges = 0usize;
        let mut dropped = 0usize;

        for commit in remaining {
            if commit.is_merge() && !self.include_merges {
                skipped_merges += 1;
                continue;
            }

            let verdict = match buckets.get(commit.authored) {
                None => Verdict::NotIn,
                Some(bucket) => self.verdict(&commit, bucket, &mut diffs)?,
            };

            if verdict == Verdict::Applied && !is_overridden(&commit) {
                dropped += 1;
                continue;
            }
            candidates.push(Candidate { commit, verdict });
        }

        tracing::debug!(
            candidates = candidates.len(),
            excluded = excluded_ids.len(),
            timestamps = buckets.len(),
            skipped_merges,
            dropped,
            "triage complete"
        );

        Ok(Triage {
            candidates,
            buckets,
        })
    }

    /// Similarity of `commit` to each excluded commit in `bucket`.
    ///
    /// # Errors
    /// Returns error if a diff cannot be read.
    pub fn similar_commits(
        &self,
        commit: &CommitInfo,
        bucket: &[CommitInfo],
    ) -> Result<Vec<(CommitInfo, f64)>> {
        let diff = self.repo.diff_text(commit.id)?;

        bucket
            .iter()
            .map(|other| {
                let other_diff = self.repo.diff_text(other.id)?;
                let score = self.scorer.score(&[&diff, &other_diff]);
                Ok((other.clone(), score))
            })
            .collect()
    }

    fn verdict(
        &self,
        commit: &CommitInfo,
        bucket: &[CommitInfo],
        diffs: &mut HashMap<Oid, String>,
    ) -> Result<Verdict> {
        let ids: Vec<Oid> = std::iter::once(commit.id)
            .chain(bucket.iter().map(|c| c.id))
            .collect();
        for id in &ids {
            if !diffs.contains_key(id) {
                diffs.insert(*id, self.repo.diff_text(*id)?);
            }
        }
        let blobs: Vec<&str> = ids.iter().map(|id| diffs[id].as_str()).collect();

        let matrix = self.scorer.matrix(&blobs);
        let worst = matrix
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row[..i].iter().copied())
            .fold(1.0_f64, f64::min);

        if worst >= 1.0 {
            return Ok(Verdict::Applied);
        }

        let (best, score) = bucket
            .iter()
            .zip(&matrix[0][1..])
            .fold((bucket[0].id, f64::MIN), |acc, (c, &s)| {
                if s > acc.1 { (c.id, s) } else { acc }
            });

        Ok(Verdict::Maybe { best, score })
    }
}
