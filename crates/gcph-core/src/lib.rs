//! # gcph-core
//!
//! Triage engine for gcph: finds commits on a source branch that are not
//! yet on a base branch, flags those that look like reworked copies of
//! commits already applied, and replays the accepted ones onto new branches.
//!
//! The engine never touches a repository directly; everything goes through
//! [`gcph_git::GitOps`].

pub mod ancestry;
pub mod blacklist;
pub mod branch_name;
pub mod config;
pub mod error;
pub mod history;
pub mod persist;
pub mod replay;
pub mod review;
pub mod session;
pub mod similarity;
pub mod triage;

#[cfg(test)]
mod test_support;

pub use ancestry::{Ancestors, ancestors};
pub use blacklist::Blacklist;
pub use branch_name::BranchName;
pub use config::{Config, ErrorPolicy};
pub use error::{Error, Result};
pub use history::History;
pub use replay::{ReplayAction, ReplayHooks, ReplayPlan, ReplayResult, Resolution, replay};
pub use review::{ReviewPair, least_similar_pair};
pub use session::{Entry, OptionKey, Options, Session, TargetBranch};
pub use similarity::{Granularity, Scorer, similarity};
pub use triage::{Candidate, Classifier, Status, Triage, Verdict};
