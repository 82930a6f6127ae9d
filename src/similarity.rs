//! Scores in `0..=100` for how well two titles or artist strings agree.

use crate::normalize::normalize;

/// Scores two strings case-insensitively.
///
/// Containment of one string in the other scores `100`. Otherwise the
/// normalized Levenshtein similarity is scaled to `0..=100`. Empty input
/// never matches.
pub fn similarity(a: &str, b: &str) -> u8 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 100;
    }
    let ratio = strsim::normalized_levenshtein(&a, &b) * 100.0;
    ratio.round().clamp(0.0, 100.0) as u8
}

/// Flattens an artist set into the comma separated form used for scoring.
pub fn join_artists<S: AsRef<str>>(artists: &[S]) -> String {
    artists
        .iter()
        .map(|artist| artist.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `100` when every word of the candidate title occurs in the target title,
/// otherwise [`similarity`] of the normalized titles.
pub fn title_ratio(candidate: &str, target: &str) -> u8 {
    let candidate = normalize(candidate).to_lowercase();
    let target = normalize(target).to_lowercase();
    let mut words = candidate.split_whitespace().peekable();
    if words.peek().is_some() && words.all(|word| target.contains(word)) {
        return 100;
    }
    similarity(&candidate, &target)
}

/// `100` when the target artist string contains the candidate artists,
/// otherwise [`similarity`].
pub fn artist_ratio(candidate: &str, target: &str) -> u8 {
    let candidate = candidate.to_lowercase();
    let target = target.to_lowercase();
    if !candidate.is_empty() && target.contains(&candidate) {
        return 100;
    }
    similarity(&candidate, &target)
}
