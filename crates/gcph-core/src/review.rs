//! Side-by-side review of the most dissimilar pair of diffs.

use std::io::Write;
use std::process::{Command, ExitStatus};

use crate::error::{Error, Result};
use crate::similarity::Scorer;

/// The pair of blobs a human should compare.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPair<'a> {
    /// Positions of the pair in the input.
    pub indices: (usize, usize),
    /// First blob.
    pub left: &'a str,
    /// Second blob.
    pub right: &'a str,
    /// Their similarity.
    pub score: f64,
}

/// Select the least similar pair among `blobs`.
///
/// Returns `None` for fewer than two blobs.
///
/// # Panics
/// Panics if the chosen pair scores above the minimum over all pairs, which
/// would mean the similarity matrix is inconsistent.
#[must_use]
pub fn least_similar_pair<'a>(scorer: &Scorer, blobs: &[&'a str]) -> Option<ReviewPair<'a>> {
    if blobs.len() < 2 {
        return None;
    }

    let worst = scorer.score(blobs);
    let matrix = scorer.matrix(blobs);

    let mut chosen = (0, 1);
    for (i, row) in matrix.iter().enumerate() {
        for (j, &score) in row.iter().enumerate().skip(i + 1) {
            if score < matrix[chosen.0][chosen.1] {
                chosen = (i, j);
            }
        }
    }

    let score = matrix[chosen.0][chosen.1];
    assert!(
        score <= worst,
        "similarity matrix inconsistent: pair {chosen:?} scores {score} above minimum {worst}"
    );

    Some(ReviewPair {
        indices: chosen,
        left: blobs[chosen.0],
        right: blobs[chosen.1],
        score,
    })
}

/// Write the pair to two temporary files and run `tool` on them.
///
/// `tool` is split on whitespace; the file paths are appended as the last
/// two arguments. Blocks until the tool exits; the files are removed after.
///
/// # Errors
/// Returns `InvalidOption` for an empty tool and `Io` if the files cannot be
/// written or the tool cannot be started.
pub fn launch(tool: &str, pair: &ReviewPair<'_>) -> Result<ExitStatus> {
    let mut words = tool.split_whitespace();
    let program = words
        .next()
        .ok_or_else(|| Error::InvalidOption("no comparison tool configured".into()))?;

    let left = write_temp(pair.left, ".a")?;
    let right = write_temp(pair.right, ".b")?;

    tracing::debug!(%program, score = pair.score, "launching comparison tool");
    let status = Command::new(program)
        .args(words)
        .arg(left.path())
        .arg(right.path())
        .status()?;

    if !status.success() {
        tracing::warn!(%program, ?status, "comparison tool exited with failure");
    }
    Ok(status)
}

fn write_temp(content: &str, suffix: &str) -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("gcph.")
        .suffix(suffix)
        .tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_least_similar_pair() {
        let blobs = ["abcdefghij", "abcdefghiX", "zzzzzzzzzz"];
        let pair = least_similar_pair(&Scorer::default(), &blobs).unwrap();

        assert!(pair.indices == (0, 2) || pair.indices == (1, 2));
        assert_eq!(pair.right, "zzzzzzzzzz");
        assert!(pair.score.abs() < 1e-9);
    }

    #[test]
    fn test_two_blobs_form_the_only_pair() {
        let blobs = ["left", "right"];
        let pair = least_similar_pair(&Scorer::default(), &blobs).unwrap();
        assert_eq!(pair.indices, (0, 1));
        assert_eq!((pair.left, pair.right), ("left", "right"));
    }

    #[test]
    fn test_fewer_than_two_blobs() {
        assert!(least_similar_pair(&Scorer::default(), &["only"]).is_none());
        assert!(least_similar_pair(&Scorer::default(), &[]).is_none());
    }

    #[test]
    fn test_empty_tool_rejected() {
        let pair = least_similar_pair(&Scorer::default(), &["a", "b"]).unwrap();
        assert!(matches!(launch("   ", &pair), Err(Error::InvalidOption(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_passes_both_files() {
        let pair = least_similar_pair(&Scorer::default(), &["same\n", "same\n"]).unwrap();
        // cmp exits 0 only if both paths exist and match
        assert!(launch("cmp -s", &pair).unwrap().success());

        let pair = least_similar_pair(&Scorer::default(), &["one\n", "two\n"]).unwrap();
        assert!(!launch("cmp -s", &pair).unwrap().success());
    }
}
