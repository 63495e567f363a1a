//! Text canonicalization applied before answers are compared.

/// Diacritics folded to their base letter under lenient matching.
///
/// `ß` is not folded.
const SOFT_FOLDS: [(char, char); 3] = [('ä', 'a'), ('ö', 'o'), ('ü', 'u')];

fn fold_diacritic(ch: char) -> char {
    SOFT_FOLDS
        .iter()
        .find_map(|&(from, to)| (from == ch).then_some(to))
        .unwrap_or(ch)
}

/// Lower-case `text`, collapse whitespace runs to one space and trim.
///
/// With `strict == false` the characters `ä`, `ö`, `ü` are additionally folded
/// to `a`, `o`, `u`. Punctuation and digits pass through unchanged.
#[must_use]
pub fn normalize(text: &str, strict: bool) -> String {
    let lowered = text.to_lowercase();
    let folded: String = if strict {
        lowered
    } else {
        lowered.chars().map(fold_diacritic).collect()
    };
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
