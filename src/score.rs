//! Relevance scoring of one candidate [`Post`] against a reference post. The
//! score is a sum of independent, non-negative terms so that adding a signal to
//! a candidate can never lower its score.

use crate::post::Post;
use crate::tag::{shared_tags, TagFilter};
use serde::Deserialize;
use std::cmp::Ordering;

/// Weights for each scoring term.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// Added when the candidate has the same author as the reference.
    pub same_author: f64,

    /// Added once per shared meaningful tag.
    pub tag_match: f64,

    /// The maximum recency contribution, earned by a candidate published on
    /// the same day as the reference. It decays linearly to zero over
    /// `recency_window_days`.
    pub recency_bonus: f64,

    /// The width of the recency window, in days.
    pub recency_window_days: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            same_author: 2.0,
            tag_match: 1.0,
            recency_bonus: 0.1,
            recency_window_days: 365.0,
        }
    }
}

impl Weights {
    /// The recency term for a date gap. Missing dates contribute nothing.
    pub fn recency(&self, days: Option<i64>) -> f64 {
        match days {
            Some(days) if self.recency_window_days > 0.0 => (self.recency_bonus
                * (self.recency_window_days - days as f64)
                / self.recency_window_days)
                .max(0.0),
            _ => 0.0,
        }
    }
}

/// A scored candidate. Only lives for the duration of a ranking call.
#[derive(Clone, Debug)]
pub struct ScoreRecord<'a> {
    pub post: &'a Post,
    pub score: f64,

    /// The meaningful tags the candidate shares with the reference, in the
    /// reference's tag order.
    pub shared_tags: Vec<String>,
}

impl ScoreRecord<'_> {
    /// Orders records by score descending, then by date descending. Used with
    /// a stable sort so that remaining ties keep input order.
    pub fn ranking(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.post.date.cmp(&a.post.date))
    }
}

/// Scores candidates against a reference post.
pub struct Scorer<'a> {
    pub weights: &'a Weights,
    pub tag_filter: &'a TagFilter,
}

impl<'a> Scorer<'a> {
    pub fn new(weights: &'a Weights, tag_filter: &'a TagFilter) -> Scorer<'a> {
        Scorer {
            weights,
            tag_filter,
        }
    }

    /// Scores `candidate` relative to `reference`. A post scored against
    /// itself (same `id`) gets a zero score with no shared tags; the ranking
    /// functions filter those out before scoring anyway.
    pub fn score_post<'p>(
        &self,
        reference: &Post,
        candidate: &'p Post,
    ) -> ScoreRecord<'p> {
        if reference.id == candidate.id {
            return ScoreRecord {
                post: candidate,
                score: 0.0,
                shared_tags: Vec::new(),
            };
        }

        let shared = shared_tags(
            &self.tag_filter.meaningful(&reference.tags),
            &self.tag_filter.meaningful(&candidate.tags),
        );

        let mut score = 0.0;
        if reference.same_author(candidate) {
            score += self.weights.same_author;
        }
        score += shared.len() as f64 * self.weights.tag_match;
        score += self.weights.recency(reference.days_between(candidate));

        ScoreRecord {
            post: candidate,
            score,
            shared_tags: shared,
        }
    }

    /// Scores each candidate and sorts the records best first.
    pub fn score_and_sort<'p, I>(
        &self,
        reference: &Post,
        candidates: I,
    ) -> Vec<ScoreRecord<'p>>
    where
        I: IntoIterator<Item = &'p Post>,
    {
        let mut records: Vec<ScoreRecord<'p>> = candidates
            .into_iter()
            .map(|c| self.score_post(reference, c))
            .collect();
        records.sort_by(ScoreRecord::ranking);
        records
    }
}
