//! "Did you mean" suggestions for patterns that match no test
//!
//! Two phases, the first one to produce a candidate wins:
//!
//! 1. Subsequence match: every character of the pattern appears in the
//!    candidate in order. This resolves abbreviations like `f.l.b` to
//!    `foo.long.bar`. Matches are ranked by edit distance, then by length
//!    (shorter first), then by name.
//! 2. Edit distance: candidates whose Levenshtein distance to the pattern
//!    is strictly below `max(2, len(candidate) / 2)` are accepted, and the
//!    closest wins. Ties go to the lexicographically smallest name.

/// Suggest the known identifier closest to `pattern`.
pub fn suggest<'a, I>(pattern: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let candidates: Vec<&str> = candidates.into_iter().collect();

    let subsequence_match = candidates
        .iter()
        .copied()
        .filter(|candidate| is_subsequence(pattern, candidate))
        .min_by_key(|candidate| {
            (
                levenshtein(pattern, candidate),
                candidate.chars().count(),
                *candidate,
            )
        });
    if subsequence_match.is_some() {
        return subsequence_match;
    }

    candidates
        .iter()
        .copied()
        .filter_map(|candidate| {
            let distance = levenshtein(pattern, candidate);
            (distance < threshold(candidate)).then_some((distance, candidate))
        })
        .min()
        .map(|(_, candidate)| candidate)
}

/// Edit budget a candidate tolerates: half its length, but at least 2.
fn threshold(candidate: &str) -> usize {
    (candidate.chars().count() / 2).max(2)
}

/// Whether all characters of `pattern` occur in `candidate` in order.
pub fn is_subsequence(pattern: &str, candidate: &str) -> bool {
    let mut remaining = candidate.chars();
    pattern
        .chars()
        .all(|wanted| remaining.any(|c| c == wanted))
}

/// Levenshtein edit distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single row over the shorter string.
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let mut row: Vec<usize> = (0..=short.len()).collect();

    for (j, long_char) in long.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = j + 1;
        for (i, short_char) in short.iter().enumerate() {
            let cost = usize::from(short_char != long_char);
            let value = (row[i] + 1).min(row[i + 1] + 1).min(diagonal + cost);
            diagonal = row[i + 1];
            row[i + 1] = value;
        }
    }

    row[short.len()]
}
