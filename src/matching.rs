//! Selection of the downloadable item that best matches a catalog track.
//!
//! Matching runs in stages and the first stage that produces a hit wins:
//!
//! 1. a song search for `"{artist} - {title}"`,
//! 2. a result whose title contains the wanted title,
//! 3. the first result whose title and artists both score above
//!    [`MatchPolicy::accept`],
//! 4. the top search result for the bare title, if it is playable and lands
//!    in the asymmetric fallback band, otherwise the first song result.

use crate::normalize::normalize;
use crate::similarity::{artist_ratio, title_ratio};
use playsync_model::search::{self, Search, SearchHit};
use playsync_model::watch_url;
use std::sync::Arc;

pub type DynSearch = Arc<dyn Search>;

/// Score thresholds of the matching stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Number of song results considered.
    pub search_limit: usize,
    /// Minimum title and artist score of the fuzzy stage.
    pub accept: u8,
    /// Score one side of the top-result override must reach.
    pub fallback_strong: u8,
    /// Score the other side of the top-result override must reach.
    pub fallback_weak: u8,
}

impl MatchPolicy {
    pub const SEARCH_LIMIT: usize = 5;
    pub const ACCEPT: u8 = 90;
    pub const FALLBACK_STRONG: u8 = 90;
    pub const FALLBACK_WEAK: u8 = 40;

    fn accepts(&self, ratios: Ratios) -> bool {
        ratios.title >= self.accept && ratios.artist >= self.accept
    }

    fn overrides(&self, ratios: Ratios) -> bool {
        (ratios.title >= self.fallback_strong && ratios.artist >= self.fallback_weak)
            || (ratios.title >= self.fallback_weak && ratios.artist >= self.fallback_strong)
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            search_limit: Self::SEARCH_LIMIT,
            accept: Self::ACCEPT,
            fallback_strong: Self::FALLBACK_STRONG,
            fallback_weak: Self::FALLBACK_WEAK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratios {
    pub title: u8,
    pub artist: u8,
}

impl Ratios {
    pub fn of(hit: &SearchHit, artist: &str, title: &str) -> Self {
        Self {
            title: title_ratio(&hit.title, title),
            artist: artist_ratio(&hit.artist_string(), artist),
        }
    }
}

/// The stage that selected a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Containment,
    Fuzzy,
    TopResult,
    FirstResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub video_id: String,
    pub stage: Stage,
}

impl Match {
    pub fn uri(&self) -> String {
        watch_url(&self.video_id)
    }
}

fn lowered(text: &str) -> String {
    normalize(text).to_lowercase()
}

fn containment(hits: &[(&SearchHit, &str)], title: &str) -> Option<Match> {
    let wanted = lowered(title);
    hits.iter()
        .find(|(hit, _)| lowered(&hit.title).contains(&wanted))
        .map(|(_, id)| Match {
            video_id: id.to_string(),
            stage: Stage::Containment,
        })
}

fn fuzzy(
    hits: &[(&SearchHit, &str)],
    artist: &str,
    title: &str,
    policy: &MatchPolicy,
) -> Option<Match> {
    hits.iter()
        .find(|(hit, _)| policy.accepts(Ratios::of(hit, artist, title)))
        .map(|(_, id)| Match {
            video_id: id.to_string(),
            stage: Stage::Fuzzy,
        })
}

fn top_result_override(
    top: Option<&SearchHit>,
    artist: &str,
    title: &str,
    policy: &MatchPolicy,
) -> Option<Match> {
    let top = top.filter(|top| top.result_type.is_playable())?;
    let id = top.video_id.as_deref()?;
    policy
        .overrides(Ratios::of(top, artist, title))
        .then(|| Match {
            video_id: id.to_string(),
            stage: Stage::TopResult,
        })
}

/// Containment and fuzzy stages over the song results.
pub fn select(
    results: &[SearchHit],
    artist: &str,
    title: &str,
    policy: &MatchPolicy,
) -> Option<Match> {
    let hits: Vec<(&SearchHit, &str)> = results
        .iter()
        .filter_map(|hit| hit.video_id.as_deref().map(|id| (hit, id)))
        .take(policy.search_limit)
        .collect();
    containment(&hits, title).or_else(|| fuzzy(&hits, artist, title, policy))
}

/// Fallback when no song result was accepted: the top result if it agrees
/// with the track, otherwise the first song result.
pub fn fallback(
    results: &[SearchHit],
    top: Option<&SearchHit>,
    artist: &str,
    title: &str,
    policy: &MatchPolicy,
) -> Option<Match> {
    top_result_override(top, artist, title, policy).or_else(|| {
        results
            .iter()
            .find_map(|hit| hit.video_id.as_deref())
            .map(|id| Match {
                video_id: id.to_string(),
                stage: Stage::FirstResult,
            })
    })
}

#[derive(Clone)]
pub struct LinkMatcher {
    search: DynSearch,
    policy: MatchPolicy,
}

impl std::fmt::Debug for LinkMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkMatcher")
            .field("policy", &self.policy)
            .finish()
    }
}

impl LinkMatcher {
    pub fn new(search: DynSearch) -> Self {
        Self::with_policy(search, MatchPolicy::default())
    }

    pub fn with_policy(search: DynSearch, policy: MatchPolicy) -> Self {
        Self { search, policy }
    }

    pub async fn find_match(&self, artist: &str, title: &str) -> Result<Option<Match>, search::Error> {
        let query = format!("{} - {}", artist, title);
        let results = self
            .search
            .search_songs(&query, self.policy.search_limit)
            .await?;
        if results.is_empty() {
            return Ok(None);
        }
        if let Some(found) = select(&results, artist, title, &self.policy) {
            return Ok(Some(found));
        }
        let top = match self.search.top_result(title).await {
            Ok(top) => top,
            Err(err) => {
                tracing::warn!(%artist, %title, "top result lookup failed: {}", err);
                None
            }
        };
        Ok(fallback(&results, top.as_ref(), artist, title, &self.policy))
    }

    /// Source URI of the best match, or `None` when nothing was found or
    /// the search failed.
    pub async fn find(&self, artist: &str, title: &str) -> Option<String> {
        match self.find_match(artist, title).await {
            Ok(Some(found)) => {
                tracing::debug!(%artist, %title, stage = ?found.stage, "matched {}", found.video_id);
                Some(found.uri())
            }
            Ok(None) => None,
            Err(err) => {
                tracing::error!(%artist, %title, "search failed: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers searches from fixed tables keyed by query.
    #[derive(Debug, Default)]
    pub struct FakeSearch {
        pub songs: HashMap<String, Vec<SearchHit>>,
        pub top: HashMap<String, SearchHit>,
        pub failing: bool,
        pub calls: AtomicUsize,
    }

    impl FakeSearch {
        pub fn songs(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
            self.songs.insert(query.to_string(), hits);
            self
        }

        pub fn top(mut self, query: &str, hit: SearchHit) -> Self {
            self.top.insert(query.to_string(), hit);
            self
        }

        pub fn failing() -> Self {
            Self {
                failing: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl Search for FakeSearch {
        async fn search_songs(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, search::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                return Err(search::Error::Response(format!("no route for `{}`", query)));
            }
            let mut hits = self.songs.get(query).cloned().unwrap_or_default();
            hits.truncate(limit);
            Ok(hits)
        }

        async fn top_result(&self, query: &str) -> Result<Option<SearchHit>, search::Error> {
            Ok(self.top.get(query).cloned())
        }
    }
}
