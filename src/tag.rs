//! Tag-set utilities shared by every scoring function: the [`TagFilter`] that
//! strips structural tags, plus [`shared_tags`] and [`jaccard_similarity`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The structural tags that carry no topical meaning by default. Collection
/// tags like these end up on nearly every post, so counting them would make
/// every pair of posts look related.
pub const DEFAULT_EXCLUDED_TAGS: [&str; 3] = ["posts", "blog", "all"];

/// Separates the meaningful tags on a post from the structural ones. A
/// [`TagFilter`] is always passed explicitly to the functions that need one
/// (usually via [`crate::rank::Recommender`]) so that callers can override the
/// exclusion set per call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagFilter {
    /// The tags that are dropped before any similarity computation.
    exclude: BTreeSet<String>,
}

impl Default for TagFilter {
    fn default() -> Self {
        TagFilter::new(DEFAULT_EXCLUDED_TAGS.iter().copied())
    }
}

impl TagFilter {
    /// Builds a filter excluding exactly the provided tags.
    pub fn new<I, S>(exclude: I) -> TagFilter
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TagFilter {
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if `tag` is topical, i.e., not in the exclusion set.
    pub fn is_meaningful(&self, tag: &str) -> bool {
        !self.exclude.contains(tag)
    }

    /// Returns `tags` minus the exclusion set.
    pub fn meaningful(&self, tags: &BTreeSet<String>) -> BTreeSet<String> {
        self.meaningful_iter(tags).cloned().collect()
    }

    /// Like [`TagFilter::meaningful`] but lazy and borrowing.
    pub fn meaningful_iter<'a>(
        &'a self,
        tags: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = &'a String> + 'a {
        tags.iter().filter(move |t| self.is_meaningful(t))
    }

    /// The tags this filter excludes.
    pub fn excluded(&self) -> &BTreeSet<String> {
        &self.exclude
    }
}

/// Returns the intersection of `a` and `b` in the iteration order of `a`.
pub fn shared_tags(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Vec<String> {
    a.iter().filter(|t| b.contains(*t)).cloned().collect()
}

/// Computes `|a ∩ b| / |a ∪ b|`. Two empty sets have similarity `0.0` rather
/// than `NaN`.
pub fn jaccard_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    match union {
        0 => 0.0,
        _ => intersection as f64 / union as f64,
    }
}

/// A tag paired with the number of times it was counted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[cfg(test)]
pub(crate) fn tag_set(tags: &[&str]) -> BTreeSet<String> {
    tags.iter().map(|t| t.to_string()).collect()
}
