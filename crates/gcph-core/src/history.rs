//! Command-line history kept across sessions.

use std::collections::VecDeque;
use std::path::Path;

use crate::error::Result;
use crate::persist;

/// Most recent command lines, oldest first, capped at a fixed length.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    limit: usize,
}

impl History {
    /// Create an empty history holding at most `limit` lines.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    /// Load from disk, keeping the newest `limit` lines.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read.
    pub fn load(path: &Path, limit: usize) -> Result<Self> {
        let mut history = Self::new(limit);
        for line in persist::read_lines(path)? {
            history.push(&line);
        }
        Ok(history)
    }

    /// Rewrite the history file.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        persist::write_lines_atomic(path, self.entries.iter().map(String::as_str))
    }

    /// Record a line; blank lines and immediate repeats are skipped.
    pub fn push(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || self.entries.back().is_some_and(|last| last == line) {
            return;
        }
        self.entries.push_back(line.to_string());
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    /// Distinct lines, newest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<String> {
        let mut seen = Vec::new();
        for line in self.entries.iter().rev() {
            if seen.len() == n {
                break;
            }
            if !seen.contains(line) {
                seen.push(line.clone());
            }
        }
        seen
    }

    /// Number of stored lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no lines are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
