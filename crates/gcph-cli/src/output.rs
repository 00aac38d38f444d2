//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use gcph_core::Status;
use gcph_git::CommitInfo;

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "ERROR:".red().bold(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Print essential output (always prints).
///
/// Use for listings and commit text the user asked for.
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Glyph shown in front of a candidate.
#[must_use]
pub fn status_glyph(status: &Status) -> String {
    match status {
        Status::NotIn => " ".to_string(),
        Status::Maybe { .. } => "?".yellow().bold().to_string(),
        Status::Picked(_) => "✓".green().bold().to_string(),
        Status::Ignored => "~".dimmed().to_string(),
    }
}

/// Legend printed above the candidate listing.
#[must_use]
pub fn legend() -> String {
    format!(
        "{} maybe already picked    {} selected for picking    {} blacklisted",
        status_glyph(&Status::Maybe {
            best: gcph_git::Oid::zero(),
            score: 0.0,
        }),
        status_glyph(&Status::Picked(String::new())),
        status_glyph(&Status::Ignored),
    )
}

/// Width needed to right-align indices below `count`.
#[must_use]
pub fn index_width(count: usize) -> usize {
    count.saturating_sub(1).max(1).to_string().len()
}

/// One candidate line: `<index>: <glyph> <short-sha> <summary>`.
#[must_use]
pub fn candidate_line(index: usize, width: usize, status: &Status, commit: &CommitInfo) -> String {
    let mut line = format!(
        "{index:>width$}: {} {} {}",
        status_glyph(status),
        commit.short_id().yellow(),
        commit.summary
    );
    match status {
        Status::Maybe { score, .. } => {
            line.push_str(&format!(" {}", format!("[{:.1}%]", score * 100.0).dimmed()));
        }
        Status::Picked(branch) => {
            line.push_str(&format!(" {}", format!("[{branch}]").cyan()));
        }
        Status::NotIn | Status::Ignored => {}
    }
    fit_to_terminal(&line)
}

/// Indented line for a related commit, prefixed with `label`.
#[must_use]
pub fn related_line(width: usize, label: &str, commit: &CommitInfo) -> String {
    let date = chrono::DateTime::from_timestamp(commit.authored, 0)
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    fit_to_terminal(&format!(
        "{label:>pad$} {} {} {}",
        commit.short_id().yellow(),
        date.dimmed(),
        commit.summary,
        pad = width + 4
    ))
}

/// Truncate a line to the terminal width when stdout is a terminal.
fn fit_to_terminal(line: &str) -> String {
    let term = console::Term::stdout();
    if !term.is_term() {
        return line.to_string();
    }
    let (_, cols) = term.size();
    console::truncate_str(line, usize::from(cols), "…").into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gcph_git::Oid;
    use serial_test::serial;

    fn commit(summary: &str) -> CommitInfo {
        CommitInfo {
            id: Oid::from_str("0123456789abcdef0123456789abcdef01234567").unwrap(),
            parents: Vec::new(),
            authored: 0,
            summary: summary.to_string(),
        }
    }

    #[test]
    #[serial]
    fn test_status_glyphs() {
        colored::control::set_override(false);
        assert_eq!(status_glyph(&Status::NotIn), " ");
        assert_eq!(status_glyph(&Status::Ignored), "~");
        assert_eq!(status_glyph(&Status::Picked("feat".into())), "✓");
    }

    #[test]
    fn test_index_width() {
        assert_eq!(index_width(0), 1);
        assert_eq!(index_width(10), 1);
        assert_eq!(index_width(11), 2);
        assert_eq!(index_width(101), 3);
    }

    #[test]
    #[serial]
    fn test_candidate_line_format() {
        colored::control::set_override(false);
        let line = candidate_line(3, 2, &Status::NotIn, &commit("Fix parser"));
        assert_eq!(line, " 3:   0123456 Fix parser");

        let line = candidate_line(
            1,
            1,
            &Status::Maybe {
                best: Oid::zero(),
                score: 0.95,
            },
            &commit("Rework"),
        );
        assert_eq!(line, "1: ? 0123456 Rework [95.0%]");
    }

    #[test]
    #[serial]
    fn test_related_line_has_date() {
        colored::control::set_override(false);
        let line = related_line(1, "95.0%", &commit("Upstream"));
        assert_eq!(line, "95.0% 0123456 1970-01-01 00:00 Upstream");
    }

    #[test]
    #[serial]
    fn test_quiet_mode_default() {
        set_quiet(false);
        assert!(!is_quiet());
    }
}
