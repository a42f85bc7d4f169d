//! Related-content selection: rule-based scoring of a candidate pool.
//!
//! Each candidate's score is the sum of independent signals:
//!
//! ```text
//! score = category(10) + venue(3) + 2 × shared_tags + year(1)
//! ```
//!
//! Category dominates: with default weights a same-category candidate beats
//! any realistic combination of the weaker signals.
//!
//! Ordering: score desc, then year desc (missing year = 0), then original pool
//! order. The last rule comes from the sort being stable, so the result is a
//! pure function of `(current, pool, limit)`.
//!
//! Signals add with saturation, so oversized configured weights cap at
//! `u32::MAX` instead of wrapping.
//!
//! [`RelatedCache`] memoizes selections per `(current.id, pool version, limit)`
//! so views can call it every frame.

use std::collections::HashSet;
use std::num::NonZeroUsize;

use log::{debug, trace};
use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::core::kv_store::CacheStats;
use crate::entities::{ContentItem, ContentPool};

/// Default number of related items shown under a project page.
pub const DEFAULT_RELATED_LIMIT: usize = 3;

/// Per-signal weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceWeights {
    pub category: u32,
    pub venue: u32,
    /// Added once per shared tag
    pub tag: u32,
    pub year: u32,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            category: 10,
            venue: 3,
            tag: 2,
            year: 1,
        }
    }
}

/// Candidate with its score and the tags it shares with the current item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate<'a> {
    pub item: &'a ContentItem,
    pub score: u32,
    /// Shared tags in candidate tag order
    pub matched_tags: Vec<&'a str>,
}

/// Ranked entry by pool position, used internally and by the memo.
#[derive(Debug, Clone)]
struct Ranked {
    pool_index: usize,
    score: u32,
    /// Indices into the candidate's `tags`
    matched: Vec<usize>,
}

/// Stateless scorer holding the signal weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceScorer {
    weights: RelevanceWeights,
}

impl RelevanceScorer {
    pub fn new(weights: RelevanceWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> RelevanceWeights {
        self.weights
    }

    /// Score a single candidate against `current`.
    ///
    /// Returns the score and indices of the shared tags in `candidate.tags`.
    fn score_one(
        &self,
        current: &ContentItem,
        current_tags: &HashSet<&str>,
        candidate: &ContentItem,
    ) -> (u32, Vec<usize>) {
        let w = &self.weights;
        let mut score: u32 = 0;

        if !current.category.is_empty() && candidate.category == current.category {
            score = score.saturating_add(w.category);
        }

        if let (Some(a), Some(b)) = (current.venue(), candidate.venue())
            && a == b
        {
            score = score.saturating_add(w.venue);
        }

        // Set semantics: a tag repeated in the candidate counts once
        let mut seen: HashSet<&str> = HashSet::new();
        let matched: Vec<usize> = candidate
            .tags
            .iter()
            .enumerate()
            .filter(|(_, tag)| current_tags.contains(tag.as_str()) && seen.insert(tag.as_str()))
            .map(|(i, _)| i)
            .collect();
        let shared = u32::try_from(matched.len()).unwrap_or(u32::MAX);
        score = score.saturating_add(w.tag.saturating_mul(shared));

        if let (Some(a), Some(b)) = (current.year, candidate.year)
            && a == b
        {
            score = score.saturating_add(w.year);
        }

        (score, matched)
    }

    fn rank(&self, current: &ContentItem, pool: &[ContentItem], limit: usize) -> Vec<Ranked> {
        if limit == 0 {
            return Vec::new();
        }

        let current_tags: HashSet<&str> = current.tags.iter().map(String::as_str).collect();

        let mut ranked: Vec<Ranked> = pool
            .iter()
            .enumerate()
            .filter(|(_, candidate)| candidate.id != current.id)
            .map(|(pool_index, candidate)| {
                let (score, matched) = self.score_one(current, &current_tags, candidate);
                trace!("Related score {} -> {}: {}", current.id, candidate.id, score);
                Ranked { pool_index, score, matched }
            })
            .collect();

        // Stable sort: equal (score, year) keep pool order
        ranked.sort_by(|a, b| {
            let year_a = pool[a.pool_index].year.unwrap_or(0);
            let year_b = pool[b.pool_index].year.unwrap_or(0);
            b.score.cmp(&a.score).then(year_b.cmp(&year_a))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Rank `pool` against `current` and return the top `limit` candidates.
    ///
    /// The current item (and any duplicate of its id) never appears in the
    /// output. `limit == 0` yields an empty result.
    pub fn select_related<'a>(
        &self,
        current: &ContentItem,
        pool: &'a [ContentItem],
        limit: usize,
    ) -> Vec<ScoredCandidate<'a>> {
        let ranked = self.rank(current, pool, limit);
        materialize(pool, &ranked)
    }
}

fn materialize<'a>(pool: &'a [ContentItem], ranked: &[Ranked]) -> Vec<ScoredCandidate<'a>> {
    ranked
        .iter()
        .filter_map(|r| {
            let item = pool.get(r.pool_index)?;
            Some(ScoredCandidate {
                item,
                score: r.score,
                matched_tags: r
                    .matched
                    .iter()
                    .filter_map(|&i| item.tags.get(i))
                    .map(String::as_str)
                    .collect(),
            })
        })
        .collect()
}

/// Rank with default weights.
pub fn select_related<'a>(
    current: &ContentItem,
    pool: &'a [ContentItem],
    limit: usize,
) -> Vec<ScoredCandidate<'a>> {
    RelevanceScorer::default().select_related(current, pool, limit)
}

/// Memo key. Pool versions are process-unique, so the version also
/// identifies which pool the entry was ranked from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    current_id: String,
    pool_version: u64,
    limit: usize,
}

/// LRU memo over [`RelevanceScorer`].
///
/// Keyed on `(current.id, pool.version(), limit)`. Every pool, clone and
/// mutation carries a distinct version, so one cache can serve several pools
/// and never returns a selection ranked from different items.
pub struct RelatedCache {
    scorer: RelevanceScorer,
    memo: LruCache<MemoKey, Vec<Ranked>>,
    stats: CacheStats,
}

impl RelatedCache {
    pub fn new(scorer: RelevanceScorer, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        debug!("RelatedCache created: capacity={}", capacity);
        Self {
            scorer,
            memo: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    pub fn select<'a>(
        &mut self,
        current: &ContentItem,
        pool: &'a ContentPool,
        limit: usize,
    ) -> Vec<ScoredCandidate<'a>> {
        let key = MemoKey {
            current_id: current.id.clone(),
            pool_version: pool.version(),
            limit,
        };

        if let Some(ranked) = self.memo.get(&key) {
            self.stats.record_hit();
            return materialize(pool.items(), ranked);
        }

        self.stats.record_miss();
        let ranked = self.scorer.rank(current, pool.items(), limit);
        let result = materialize(pool.items(), &ranked);
        self.memo.put(key, ranked);
        result
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// Drop every memoized selection. Stats are kept.
    pub fn clear(&mut self) {
        self.memo.clear();
    }
}
