use std::collections::HashSet;

/// Jaccard floor for the wide matcher.
pub const WIDE_JACCARD: f64 = 0.40;
/// Jaccard floor shared by the wide fallback arm and the strict matcher.
pub const STRICT_JACCARD: f64 = 0.30;
/// Prefix-token floor for the strict matcher.
pub const STRICT_PREFIX: usize = 3;

/// A scored candidate. Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    pub name: String,
    pub jaccard: f64,
    pub prefix: usize,
}

fn tokens(name: &str) -> Vec<&str> {
    name.split('-').filter(|t| !t.is_empty()).collect()
}

/// Token-set Jaccard similarity between two hyphen-tokenized names.
/// 1.0 for identical token sets, 0.0 for disjoint ones. Order-insensitive.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let set_a: HashSet<&str> = tokens(a).into_iter().collect();
    let set_b: HashSet<&str> = tokens(b).into_iter().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return if a == b { 1.0 } else { 0.0 };
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// Count of leading tokens that match exactly, stopping at the first
/// mismatch. Order-sensitive, unlike Jaccard: `rust-test-mock` vs
/// `rust-api-test` scores 1 even though `test` appears in both.
pub fn prefix_count(a: &str, b: &str) -> usize {
    tokens(a)
        .iter()
        .zip(tokens(b).iter())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Wide matcher: jaccard ≥ 0.40, or jaccard ≥ 0.30 with a 3-token shared
/// prefix. Sorted by jaccard descending. Used to flag possible duplicates
/// before a new skill is created — false positives are fine there, a
/// reviewer decides.
pub fn find_wide(name: &str, candidates: &[String]) -> Vec<SimilarityMatch> {
    let mut matches: Vec<SimilarityMatch> = candidates
        .iter()
        .map(|c| SimilarityMatch {
            name: c.clone(),
            jaccard: jaccard(name, c),
            prefix: prefix_count(name, c),
        })
        .filter(|m| m.jaccard >= WIDE_JACCARD || (m.jaccard >= STRICT_JACCARD && m.prefix >= STRICT_PREFIX))
        .collect();
    matches.sort_by(|a, b| b.jaccard.partial_cmp(&a.jaccard).unwrap_or(std::cmp::Ordering::Equal));
    matches
}

/// Strict matcher: jaccard ≥ 0.30 AND a 3-token shared prefix, sorted by
/// jaccard descending. Used for unattended consolidation, where a false
/// positive would merge unrelated skills — the prefix gate rejects pairs
/// with high token overlap but different leading structure.
pub fn find_strict(name: &str, candidates: &[String]) -> Vec<SimilarityMatch> {
    let mut matches: Vec<SimilarityMatch> = candidates
        .iter()
        .map(|c| SimilarityMatch {
            name: c.clone(),
            jaccard: jaccard(name, c),
            prefix: prefix_count(name, c),
        })
        .filter(|m| m.jaccard >= STRICT_JACCARD && m.prefix >= STRICT_PREFIX)
        .collect();
    matches.sort_by(|a, b| b.jaccard.partial_cmp(&a.jaccard).unwrap_or(std::cmp::Ordering::Equal));
    matches
}
