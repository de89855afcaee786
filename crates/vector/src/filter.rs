use crate::types::Match;

/// Keep matches scoring at least `threshold`, in backend order
pub fn filter_by_threshold(matches: Vec<Match>, threshold: f64) -> Vec<Match> {
    matches
        .into_iter()
        .filter(|m| m.score_or_zero() >= threshold)
        .collect()
}
