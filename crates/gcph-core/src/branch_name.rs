//! Target branch name validation and newtype.
//!
//! Names typed at the prompt end up as arguments to `git`, so they are
//! checked against git's ref-name rules before a branch is declared.

use std::fmt;

use crate::error::Error;

/// A validated name for a branch the replay driver will create.
///
/// # Examples
///
/// ```
/// use gcph_core::BranchName;
///
/// assert!(BranchName::new("backport/fix-123").is_ok());
/// assert!(BranchName::new("two..dots").is_err());
/// assert!(BranchName::new("a;b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBranchName`] if the name violates git's
    /// branch naming rules or contains shell metacharacters.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if let Some(reason) = rejection(&name) {
            return Err(Error::InvalidBranchName { name, reason });
        }
        Ok(Self(name))
    }

    /// Get the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for BranchName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for BranchName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BranchName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Sequences git refuses anywhere in a ref name.
const FORBIDDEN_SEQUENCES: [&str; 4] = ["..", "//", "@{", "/."];

/// Characters git refuses, plus shell metacharacters.
const FORBIDDEN_CHARS: &[char] = &[
    ' ', '~', '^', ':', '?', '*', '[', '$', ';', '|', '&', '>', '<', '`', '\\', '"', '\'', '(', ')',
    '{', '}', '!',
];

/// Return why `name` is not a usable branch name, if it isn't.
fn rejection(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("branch name cannot be empty".into());
    }
    if name == "@" || name == "HEAD" {
        return Some(format!("branch name cannot be '{name}'"));
    }
    if name.starts_with('.') || name.ends_with('.') {
        return Some("branch name cannot start or end with '.'".into());
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Some("branch name cannot start or end with '/'".into());
    }
    if name.starts_with('-') {
        return Some("branch name cannot start with '-'".into());
    }
    #[allow(clippy::case_sensitive_file_extension_comparisons)]
    if name.ends_with(".lock") {
        return Some("branch name cannot end with '.lock'".into());
    }
    if name.chars().any(|c| c.is_ascii_control()) {
        return Some("branch name cannot contain control characters".into());
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Some(format!("branch name cannot contain '{c}'"));
    }
    FORBIDDEN_SEQUENCES
        .iter()
        .find(|seq| name.contains(**seq))
        .map(|seq| format!("branch name cannot contain '{seq}'"))
}
