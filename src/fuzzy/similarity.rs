// File: src/fuzzy/similarity.rs
//! The one similarity measure every fuzzy stage uses.
//!
//! Score = round(100 × normalized Levenshtein) over Unicode scalar values.
//! It is symmetric and deterministic, and integer-valued so threshold checks
//! never hinge on float noise. Scores are not comparable with other measures.

/// 0..=100 similarity between two strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round()
}

/// Best-scoring candidate. Ties keep the earliest candidate, so callers pass
/// candidates in a stable order to get reproducible results.
pub fn best_match<'a, I>(text: &str, candidates: I) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let score = similarity(text, candidate);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((candidate, score)),
        }
    }
    best
}

/// Jaccard overlap of the two character sets, 0.0..=1.0.
pub fn char_set_overlap(a: &str, b: &str) -> f64 {
    use std::collections::HashSet;
    let left: HashSet<char> = a.chars().collect();
    let right: HashSet<char> = b.chars().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}
