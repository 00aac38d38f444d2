//! # gcph-git
//!
//! Version-control backend for gcph, built on git2-rs.
//! Reads the commit graph through libgit2 and delegates working-tree
//! mutations (checkout, cherry-pick) to the `git` binary.

mod commit;
mod error;
mod repository;
mod traits;

pub use commit::{CommitInfo, PickStatus, clean_show_output};
pub use error::{Error, Result};
pub use git2::Oid;
pub use repository::Repository;
pub use traits::GitOps;
