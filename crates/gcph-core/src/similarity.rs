//! Near-duplicate scoring of commit diffs.
//!
//! Scores are `2 * matched / total` over the tokens of both inputs, where
//! matched tokens come from a Myers diff. Characters are the tokens unless
//! some input exceeds the line threshold, in which case every input is
//! compared line by line instead.

use std::hash::Hash;

use imara_diff::{Algorithm, Diff, InternedInput, TokenSource};

/// Inputs longer than this many characters are compared by line.
pub const DEFAULT_LINE_THRESHOLD: usize = 10_000;

/// Token granularity chosen for a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Compare character by character.
    Chars,
    /// Compare line by line.
    Lines,
}

/// Scores closeness of text blobs in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    line_threshold: usize,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_THRESHOLD)
    }
}

impl Scorer {
    /// Create a scorer that switches to line granularity above `line_threshold` characters.
    #[must_use]
    pub const fn new(line_threshold: usize) -> Self {
        Self { line_threshold }
    }

    /// Granularity used when all of `blobs` are compared together.
    #[must_use]
    pub fn granularity(&self, blobs: &[&str]) -> Granularity {
        if blobs
            .iter()
            .any(|b| b.len() > self.line_threshold && b.chars().count() > self.line_threshold)
        {
            Granularity::Lines
        } else {
            Granularity::Chars
        }
    }

    /// Score of the least similar pair among `blobs`.
    ///
    /// With two inputs this is their plain ratio. With more, every unordered
    /// pair is scored and the minimum wins, so a single mismatching blob pulls
    /// the result down. Fewer than two inputs score `1.0`.
    #[must_use]
    pub fn score(&self, blobs: &[&str]) -> f64 {
        let granularity = self.granularity(blobs);
        let mut worst: f64 = 1.0;

        for (i, a) in blobs.iter().enumerate() {
            for b in &blobs[i + 1..] {
                worst = worst.min(ratio(a, b, granularity));
            }
        }

        worst
    }

    /// Full symmetric matrix of pairwise scores, with `1.0` on the diagonal.
    #[must_use]
    pub fn matrix(&self, blobs: &[&str]) -> Vec<Vec<f64>> {
        let granularity = self.granularity(blobs);
        let n = blobs.len();
        let mut matrix = vec![vec![1.0; n]; n];

        for i in 0..n {
            for j in 0..i {
                let score = ratio(blobs[i], blobs[j], granularity);
                matrix[i][j] = score;
                matrix[j][i] = score;
            }
        }

        matrix
    }
}

/// Score `blobs` with the default line threshold.
#[must_use]
pub fn similarity(blobs: &[&str]) -> f64 {
    Scorer::default().score(blobs)
}

/// Similarity ratio of two texts at the given granularity.
#[must_use]
pub fn ratio(a: &str, b: &str, granularity: Granularity) -> f64 {
    match granularity {
        Granularity::Chars => {
            let a: Vec<char> = a.chars().collect();
            let b: Vec<char> = b.chars().collect();
            token_ratio(&a, &b)
        }
        Granularity::Lines => {
            let a: Vec<&str> = a.split('\n').collect();
            let b: Vec<&str> = b.split('\n').collect();
            token_ratio(&a, &b)
        }
    }
}

/// Token source over an already split slice.
struct SliceTokens<'a, T> {
    slice: &'a [T],
}

impl<'a, T: Clone + Hash + Eq> TokenSource for SliceTokens<'a, T> {
    type Token = T;
    type Tokenizer = std::iter::Cloned<std::slice::Iter<'a, T>>;

    fn tokenize(&self) -> Self::Tokenizer {
        self.slice.iter().cloned()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn estimate_tokens(&self) -> u32 {
        self.slice.len() as u32
    }
}

#[allow(clippy::cast_precision_loss)]
fn token_ratio<T: Clone + Hash + Eq>(a: &[T], b: &[T]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let input = InternedInput::new(SliceTokens { slice: a }, SliceTokens { slice: b });
    let diff = Diff::compute(Algorithm::Myers, &input);
    let removed: usize = diff
        .hunks()
        .map(|hunk| (hunk.before.end - hunk.before.start) as usize)
        .sum();
    let matched = a.len() - removed;

    (2 * matched) as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_identical_text_scores_one() {
        let text = "fn main() {\n    println!(\"hi\");\n}\n";
        assert!((similarity(&[text, text]) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_disjoint_text_scores_zero() {
        assert!(similarity(&["aaaa", "bbbb"]).abs() < EPS);
    }

    #[test]
    fn test_known_ratio() {
        // "abcd" vs "abce": 3 matched of 8 tokens -> 6/8
        assert!((similarity(&["abcd", "abce"]) - 0.75).abs() < EPS);
    }

    #[test]
    fn test_two_argument_order_insensitive() {
        let a = "the quick brown fox";
        let b = "the quack brown fix";
        assert!((similarity(&[a, b]) - similarity(&[b, a])).abs() < EPS);
    }

    #[test]
    fn test_many_arguments_take_worst_pair() {
        let blobs = ["abcdefgh", "abcdefgx", "zzzzzzzz"];
        let expected = [
            ratio(blobs[0], blobs[1], Granularity::Chars),
            ratio(blobs[0], blobs[2], Granularity::Chars),
            ratio(blobs[1], blobs[2], Granularity::Chars),
        ]
        .into_iter()
        .fold(1.0_f64, f64::min);

        assert!((similarity(&blobs) - expected).abs() < EPS);
        assert!(similarity(&blobs).abs() < EPS);
    }

    #[test]
    fn test_worst_pair_includes_pairs_without_first_argument() {
        // first blob matches both others equally; the others differ more
        let blobs = ["ab", "a", "b"];
        let with_first = ratio("ab", "a", Granularity::Chars);
        assert!(similarity(&blobs) < with_first);
    }

    #[test]
    fn test_fewer_than_two_inputs() {
        assert!((similarity(&["only"]) - 1.0).abs() < EPS);
        assert!((similarity(&[]) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_empty_inputs_are_identical() {
        assert!((similarity(&["", ""]) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_large_inputs_switch_to_lines() {
        let scorer = Scorer::new(10);
        let long = "line one\nline two\nline three\n";
        assert_eq!(scorer.granularity(&[long, "short"]), Granularity::Lines);
        assert_eq!(scorer.granularity(&["short", "tiny"]), Granularity::Chars);

        // one of four lines differs
        let a = "l1\nl2\nl3\nl4";
        let b = "l1\nl2\nXX\nl4";
        let by_lines = Scorer::new(1).score(&[a, b]);
        assert!((by_lines - 0.75).abs() < EPS);
    }

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let blobs = ["abc", "abd", "xyz"];
        let matrix = Scorer::default().matrix(&blobs);

        for (i, row) in matrix.iter().enumerate() {
            assert!((row[i] - 1.0).abs() < EPS);
            for (j, value) in row.iter().enumerate() {
                assert!((value - matrix[j][i]).abs() < EPS);
            }
        }
        assert!((matrix[0][1] - ratio("abc", "abd", Granularity::Chars)).abs() < EPS);
    }
}
