//! Defines the [`Post`] record that every recommendation function operates on,
//! and the [`PostSummary`] view used for output. Posts are produced by
//! [`crate::parser::Parser`] (or by any other caller) and are never mutated by
//! the engine.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use url::Url;

/// A single blog post as seen by the recommendation engine.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Post {
    /// Unique identifier, derived from the post's source path (and therefore
    /// from its URL path). Used for self-exclusion and deduplication.
    pub id: String,

    /// The title of the post.
    pub title: String,

    /// The URL of the rendered post.
    pub url: Url,

    /// The key identifying the post's author, if any.
    pub author: Option<String>,

    /// The publish date. Posts without a date never earn a recency bonus and
    /// sort after dated posts.
    pub date: Option<NaiveDate>,

    /// The post's tags, including structural ones like `posts`. See
    /// [`crate::tag::TagFilter`].
    pub tags: BTreeSet<String>,

    /// Drafts are excluded from candidate pools unless explicitly requested.
    pub draft: bool,

    /// A short description. Not used in scoring.
    pub description: Option<String>,
}

impl Post {
    /// Returns `true` if both posts have an author and it's the same one.
    pub fn same_author(&self, other: &Post) -> bool {
        match (&self.author, &other.author) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// The absolute distance between two posts' dates in days, or `None` if
    /// either date is missing.
    pub fn days_between(&self, other: &Post) -> Option<i64> {
        match (self.date, other.date) {
            (Some(a), Some(b)) => Some((a - b).num_days().abs()),
            _ => None,
        }
    }
}

/// Orders two posts newest first, with undated posts last. Intended for use
/// with stable sorts, which keep input order among equal dates.
pub fn newest_first(a: &Post, b: &Post) -> std::cmp::Ordering {
    b.date.cmp(&a.date)
}

/// The subset of a [`Post`] that's worth printing as a recommendation.
#[derive(Debug, Serialize)]
pub struct PostSummary<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<&'a str>,
}

impl<'a> From<&'a Post> for PostSummary<'a> {
    fn from(p: &'a Post) -> PostSummary<'a> {
        PostSummary {
            id: &p.id,
            title: &p.title,
            url: p.url.as_str(),
            author: p.author.as_deref(),
            date: p.date,
            tags: p.tags.iter().map(String::as_str).collect(),
        }
    }
}
