//! Author-level recommendations. These group posts by author into an
//! [`AuthorActivity`] aggregate and recommend one representative post per
//! author.

use crate::post::{newest_first, Post};
use crate::rank::{candidate_pool, Recommender};
use crate::tag::jaccard_similarity;
use crate::trending::{in_window, window_start};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// What an author has written across a set of posts. Built on demand and
/// never persisted.
#[derive(Debug)]
pub struct AuthorActivity<'p> {
    /// The union of the author's meaningful tags.
    pub tags: BTreeSet<String>,

    /// How many posts the author has in the set.
    pub post_count: usize,

    /// The author's newest post. On equal dates the first one seen is kept.
    pub most_recent: &'p Post,
}

/// An author paired with the number of posts they've published.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthorCount {
    pub author: String,
    pub count: usize,
}

/// The per-post bonus for authors with more posts, and the post count at
/// which it stops growing.
const EXPERIENCE_BONUS: f64 = 0.01;
const EXPERIENCE_CAP: usize = 10;

impl Recommender<'_> {
    /// Aggregates `posts` by author. Posts without an author are skipped.
    pub fn author_activity<'p, I>(&self, posts: I) -> BTreeMap<&'p str, AuthorActivity<'p>>
    where
        I: IntoIterator<Item = &'p Post>,
    {
        let mut activity: BTreeMap<&'p str, AuthorActivity<'p>> = BTreeMap::new();
        for post in posts {
            let author = match &post.author {
                Some(author) => author.as_str(),
                None => continue,
            };
            let entry = activity.entry(author).or_insert_with(|| AuthorActivity {
                tags: BTreeSet::new(),
                post_count: 0,
                most_recent: post,
            });
            entry
                .tags
                .extend(self.tag_filter.meaningful_iter(&post.tags).cloned());
            entry.post_count += 1;
            if post.date > entry.most_recent.date {
                entry.most_recent = post;
            }
        }
        activity
    }

    /// Finds the `k` authors (other than the reference's) whose body of work
    /// is most similar to the reference post's meaningful tags and returns
    /// each one's most recent post.
    ///
    /// An author's similarity is the Jaccard similarity between the
    /// reference's meaningful tags and all of the author's meaningful tags,
    /// plus a small bonus per post (capped at ten posts). Returns nothing
    /// when the reference has no meaningful tags.
    pub fn similar_authors<'p>(
        &self,
        reference: &Post,
        candidates: &'p [Post],
        k: usize,
    ) -> Vec<&'p Post> {
        let wanted = self.tag_filter.meaningful(&reference.tags);
        if wanted.is_empty() {
            debug!(reference = %reference.id, "no meaningful tags; skipping similar authors");
            return Vec::new();
        }

        let pool = candidate_pool(candidates, Some(reference), true)
            .into_iter()
            .filter(|p| !p.same_author(reference));
        let mut scored: Vec<(f64, &'p Post)> = self
            .author_activity(pool)
            .into_iter()
            .map(|(_, activity)| {
                let bonus = activity.post_count.min(EXPERIENCE_CAP) as f64 * EXPERIENCE_BONUS;
                (
                    jaccard_similarity(&wanted, &activity.tags) + bonus,
                    activity.most_recent,
                )
            })
            .filter(|(similarity, _)| *similarity > 0.0)
            .collect();

        scored.sort_by(|(a_sim, a), (b_sim, b)| {
            b_sim.total_cmp(a_sim).then_with(|| newest_first(a, b))
        });
        scored.into_iter().take(k).map(|(_, p)| p).collect()
    }

    /// Introduces readers to other authors: the most recent non-draft post of
    /// each author other than the reference's, ordered by how many posts the
    /// author has and then by recency.
    pub fn discover_authors<'p>(
        &self,
        reference: &Post,
        posts: &'p [Post],
        limit: usize,
    ) -> Vec<&'p Post> {
        let pool = candidate_pool(posts, Some(reference), true)
            .into_iter()
            .filter(|p| !p.same_author(reference));
        let mut samples: Vec<(usize, &'p Post)> = self
            .author_activity(pool)
            .into_iter()
            .map(|(_, activity)| (activity.post_count, activity.most_recent))
            .collect();
        samples.sort_by(|(a_count, a), (b_count, b)| {
            b_count.cmp(a_count).then_with(|| newest_first(a, b))
        });
        samples.into_iter().take(limit).map(|(_, p)| p).collect()
    }
}

/// Counts non-draft posts per author published within `days_back` days
/// before `today` (inclusive), most active first. Posts without an author are
/// counted as `unknown`; undated posts are skipped.
pub fn active_authors(posts: &[Post], days_back: i64, today: NaiveDate) -> Vec<AuthorCount> {
    let start = window_start(today, days_back);
    let mut counts: Vec<AuthorCount> = Vec::new();
    for post in posts
        .iter()
        .filter(|p| !p.draft && in_window(p.date, start))
    {
        let author = post.author.as_deref().unwrap_or("unknown");
        match counts.iter_mut().find(|c| c.author == author) {
            Some(c) => c.count += 1,
            None => counts.push(AuthorCount {
                author: author.to_owned(),
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::testutil::*;
    use crate::score::Weights;
    use crate::tag::{tag_set, TagFilter};

    fn blog() -> (Post, Vec<Post>) {
        let reference = post("ref", "A", &["posts", "music", "vinyl"], "2024-06-30");
        let posts = vec![
            reference.clone(),
            post("a2", "A", &["music"], "2024-06-01"),
            post("b1", "B", &["posts", "music"], "2024-01-01"),
            post("b2", "B", &["vinyl"], "2024-03-01"),
            post("c1", "C", &["music", "film", "books"], "2024-05-01"),
            post("d1", "D", &["gardening"], "2024-06-29"),
            draft("e1", "E", &["music", "vinyl"], "2024-06-29"),
            post("anon", "", &["music", "vinyl"], "2024-06-29"),
        ];
        (reference, posts)
    }

    #[test]
    fn test_author_activity() {
        let weights = Weights::default();
        let filter = TagFilter::default();
        let recommender = Recommender::new(&weights, &filter);
        let (_, posts) = blog();

        let activity = recommender.author_activity(&posts);
        assert_eq!(vec!["A", "B", "C", "D", "E"], activity.keys().copied().collect::<Vec<_>>());
        let b = &activity["B"];
        assert_eq!(2, b.post_count);
        assert_eq!(tag_set(&["music", "vinyl"]), b.tags);
        assert_eq!("b2", b.most_recent.id);
    }

    #[test]
    fn test_similar_authors() {
        let weights = Weights::default();
        let filter = TagFilter::default();
        let recommender = Recommender::new(&weights, &filter);
        let (reference, posts) = blog();

        // B: jaccard 1.0 + 0.02, C: 1/4 + 0.01, D: 0 + 0.01
        let similar = recommender.similar_authors(&reference, &posts, 5);
        assert_eq!(vec!["b2", "c1", "d1"], ids(&similar));

        let top = recommender.similar_authors(&reference, &posts, 1);
        assert_eq!(vec!["b2"], ids(&top));
    }

    #[test]
    fn test_similar_authors_needs_meaningful_tags() {
        let weights = Weights::default();
        let filter = TagFilter::default();
        let recommender = Recommender::new(&weights, &filter);
        let (_, posts) = blog();
        let bare = post("bare", "A", &["posts", "blog"], "2024-06-30");
        assert!(recommender.similar_authors(&bare, &posts, 3).is_empty());
    }

    #[test]
    fn test_discover_authors() {
        let weights = Weights::default();
        let filter = TagFilter::default();
        let recommender = Recommender::new(&weights, &filter);
        let (reference, posts) = blog();

        let discovered = recommender.discover_authors(&reference, &posts, 3);
        assert_eq!(vec!["b2", "d1", "c1"], ids(&discovered));
    }

    #[test]
    fn test_active_authors() {
        let (_, posts) = blog();
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        let active = active_authors(&posts, 30, today);
        assert_eq!(
            vec![
                AuthorCount {
                    author: "A".to_owned(),
                    count: 2,
                },
                AuthorCount {
                    author: "D".to_owned(),
                    count: 1,
                },
                AuthorCount {
                    author: "unknown".to_owned(),
                    count: 1,
                },
            ],
            active
        );
        assert!(active_authors(&[], 30, today).is_empty());
    }

    #[test]
    fn test_active_authors_with_huge_window() {
        let (_, posts) = blog();
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        for days in [1_000_000_000, i64::MAX].iter() {
            let active = active_authors(&posts, *days, today);
            let counts: Vec<(&str, usize)> =
                active.iter().map(|c| (c.author.as_str(), c.count)).collect();
            assert_eq!(
                vec![("A", 2), ("B", 2), ("C", 1), ("D", 1), ("unknown", 1)],
                counts
            );
        }
    }

    #[test]
    fn test_author_rankings_are_idempotent_and_bounded() {
        let weights = Weights::default();
        let filter = TagFilter::default();
        let recommender = Recommender::new(&weights, &filter);
        let (reference, posts) = blog();

        let first = recommender.similar_authors(&reference, &posts, usize::MAX);
        let second = recommender.similar_authors(&reference, &posts, usize::MAX);
        assert_eq!(vec!["b2", "c1", "d1"], ids(&first));
        assert_eq!(first, second);

        let discovered = recommender.discover_authors(&reference, &posts, usize::MAX);
        assert_eq!(3, discovered.len());
    }
}
