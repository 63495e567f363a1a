//! Answer matching under the two strictness policies.
//!
//! `Hard` is exact equality after case and whitespace normalization.
//! `Soft` additionally folds umlauts and forgives one stray typo (a single
//! substitution or a single missing character) as long as the error is not in
//! the final character. The final letter usually carries the inflection, so an
//! error there is always counted.

mod normalize;

use serde::{Deserialize, Serialize};

pub use normalize::normalize;

/// Strictness level used when comparing an answer to its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    Soft,
    Hard,
}

/// Decide whether `actual` counts as a correct answer for `expected`.
#[must_use]
pub fn matches(expected: &str, actual: &str, policy: MatchPolicy) -> bool {
    match policy {
        MatchPolicy::Hard => normalize(expected, true) == normalize(actual, true),
        MatchPolicy::Soft => {
            let expected = normalize(expected, false);
            let actual = normalize(actual, false);
            if expected == actual {
                return true;
            }
            if expected.is_empty() || actual.is_empty() {
                return false;
            }
            let expected: Vec<char> = expected.chars().collect();
            let actual: Vec<char> = actual.chars().collect();
            is_near_miss(&expected, &actual)
        }
    }
}

fn is_near_miss(expected: &[char], actual: &[char]) -> bool {
    if actual.len() == expected.len() {
        single_interior_substitution(expected, actual)
    } else if actual.len() + 1 == expected.len() {
        single_interior_deletion(expected, actual)
    } else {
        false
    }
}

fn single_interior_substitution(expected: &[char], actual: &[char]) -> bool {
    let mut mismatch = None;
    for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
        if e != a {
            if mismatch.is_some() {
                return false;
            }
            mismatch = Some(i);
        }
    }
    mismatch.is_some_and(|i| i + 1 != expected.len())
}

// `actual` is exactly one character shorter than `expected`.
fn single_interior_deletion(expected: &[char], actual: &[char]) -> bool {
    let last = expected.len() - 1;
    let mut skipped = false;
    let (mut i, mut j) = (0, 0);
    while i < expected.len() && j < actual.len() {
        if expected[i] == actual[j] {
            i += 1;
            j += 1;
            continue;
        }
        if skipped || i == last {
            return false;
        }
        skipped = true;
        i += 1;
    }
    // Only the final expected character is left over: a truncated ending.
    !(i == last && j == actual.len())
}
