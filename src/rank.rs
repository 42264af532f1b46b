//! The [`Recommender`] and its reference-post rankings: [`Recommender::rank_posts`]
//! plus the simpler lookups (same author, similar tags, recent posts). The
//! cross-author and author-similarity selectors live in [`crate::diversity`]
//! and [`crate::authors`].
//!
//! None of these functions fail. When nothing qualifies they return an empty
//! [`Vec`], and every result borrows from the caller's candidate slice.

use crate::post::{newest_first, Post};
use crate::score::{Scorer, Weights};
use crate::tag::{jaccard_similarity, shared_tags, TagFilter};
use std::collections::HashSet;
use tracing::debug;

/// Bundles the scoring configuration that every recommendation needs. The
/// recommender holds no state of its own; each call reads only its arguments.
#[derive(Clone, Copy)]
pub struct Recommender<'a> {
    /// The weights for each scoring term.
    pub weights: &'a Weights,

    /// Strips structural tags before similarity is computed.
    pub tag_filter: &'a TagFilter,
}

impl<'a> Recommender<'a> {
    pub fn new(weights: &'a Weights, tag_filter: &'a TagFilter) -> Recommender<'a> {
        Recommender {
            weights,
            tag_filter,
        }
    }

    pub fn scorer(&self) -> Scorer<'a> {
        Scorer::new(self.weights, self.tag_filter)
    }

    /// Ranks `candidates` by relevance to `reference` and returns the best
    /// `k`. The reference itself (by `id`) is never returned, nor are drafts
    /// when `exclude_drafts` is set. Ties are broken by date (newest first)
    /// and then by input order.
    pub fn rank_posts<'p>(
        &self,
        reference: Option<&Post>,
        candidates: &'p [Post],
        k: usize,
        exclude_drafts: bool,
    ) -> Vec<&'p Post> {
        let reference = match reference {
            Some(reference) => reference,
            None => return Vec::new(),
        };

        let pool = candidate_pool(candidates, Some(reference), exclude_drafts);
        debug!(
            reference = %reference.id,
            candidates = candidates.len(),
            eligible = pool.len(),
            k,
            "ranking related posts"
        );

        let mut records = self.scorer().score_and_sort(reference, pool);
        records.truncate(k);
        records.into_iter().map(|r| r.post).collect()
    }

    /// Returns up to `limit` other non-draft posts by the reference's author,
    /// newest first. Empty if the reference has no author.
    pub fn posts_by_same_author<'p>(
        &self,
        reference: &Post,
        posts: &'p [Post],
        limit: usize,
    ) -> Vec<&'p Post> {
        let mut same: Vec<&Post> = candidate_pool(posts, Some(reference), true)
            .into_iter()
            .filter(|p| p.same_author(reference))
            .collect();
        same.sort_by(|a, b| newest_first(a, b));
        same.truncate(limit);
        same
    }

    /// Returns up to `limit` non-draft posts sharing at least one meaningful
    /// tag with the reference, ordered by the number of shared tags and then
    /// by date. Empty if the reference has no meaningful tags.
    pub fn posts_with_similar_tags<'p>(
        &self,
        reference: &Post,
        posts: &'p [Post],
        limit: usize,
    ) -> Vec<&'p Post> {
        let wanted = self.tag_filter.meaningful(&reference.tags);
        if wanted.is_empty() {
            return Vec::new();
        }

        let mut tagged: Vec<(usize, &Post)> = candidate_pool(posts, Some(reference), true)
            .into_iter()
            .map(|p| {
                let shared = shared_tags(&wanted, &self.tag_filter.meaningful(&p.tags));
                (shared.len(), p)
            })
            .filter(|(shared, _)| *shared > 0)
            .collect();
        tagged.sort_by(|(a_shared, a), (b_shared, b)| {
            b_shared.cmp(a_shared).then_with(|| newest_first(a, b))
        });
        tagged.into_iter().take(limit).map(|(_, p)| p).collect()
    }

    /// Returns up to `limit` non-draft posts, newest first, optionally leaving
    /// out one post (usually the one being viewed).
    pub fn recent_posts<'p>(
        &self,
        posts: &'p [Post],
        exclude: Option<&Post>,
        limit: usize,
    ) -> Vec<&'p Post> {
        let mut recent = candidate_pool(posts, exclude, true);
        recent.sort_by(|a, b| newest_first(a, b));
        recent.truncate(limit);
        recent
    }

    /// The percentage (0-100) of the reference's meaningful tags that
    /// `target` also carries. Zero when the reference has no meaningful tags.
    pub fn tag_relevance(&self, reference: &Post, target: &Post) -> f64 {
        let wanted = self.tag_filter.meaningful(&reference.tags);
        if wanted.is_empty() {
            return 0.0;
        }
        let shared = shared_tags(&wanted, &self.tag_filter.meaningful(&target.tags));
        shared.len() as f64 / wanted.len() as f64 * 100.0
    }

    /// A symmetric similarity between two posts: the same-author weight, plus
    /// the Jaccard similarity of their meaningful tags scaled by the tag
    /// weight, plus the recency term for their date gap.
    pub fn post_similarity(&self, a: &Post, b: &Post) -> f64 {
        let mut similarity = 0.0;
        if a.same_author(b) {
            similarity += self.weights.same_author;
        }
        similarity += jaccard_similarity(
            &self.tag_filter.meaningful(&a.tags),
            &self.tag_filter.meaningful(&b.tags),
        ) * self.weights.tag_match;
        similarity + self.weights.recency(a.days_between(b))
    }
}

/// Filters `candidates` down to the posts eligible for recommendation: not
/// the `reference` (by id), not a repeat of an id already seen, and not a
/// draft (if `exclude_drafts`). Ids are deduplicated before drafts are
/// dropped, so the first occurrence of an id decides: if it's a draft, later
/// posts with that id are dropped too. Input order is preserved.
pub(crate) fn candidate_pool<'p>(
    candidates: &'p [Post],
    reference: Option<&Post>,
    exclude_drafts: bool,
) -> Vec<&'p Post> {
    let mut seen: HashSet<&str> = HashSet::new();
    if let Some(reference) = reference {
        seen.insert(&reference.id);
    }
    candidates
        .iter()
        .filter(|p| seen.insert(&p.id))
        .filter(|p| !(exclude_drafts && p.draft))
        .collect()
}
