//! Tag aggregations over a set of posts: trending tags, tags that co-occur
//! with a given tag, and overall tag statistics. All of them count only
//! meaningful tags (see [`TagFilter`]) on non-draft posts.

use crate::post::Post;
use crate::tag::{TagCount, TagFilter};
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeSet, HashMap};

/// Counts tags in the order they're first seen and then sorts by count
/// (descending) with a stable sort, so equal counts stay in first-seen order.
fn tally<'a, I>(tags: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<TagCount> = Vec::new();
    for tag in tags {
        match index.get(tag.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(tag, counts.len());
                counts.push(TagCount {
                    tag: tag.clone(),
                    count: 1,
                });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// The first day of the `days_back`-day window ending on `today`. `None` when
/// the window reaches past the earliest representable date, in which case
/// every dated post falls inside it.
pub(crate) fn window_start(today: NaiveDate, days_back: i64) -> Option<NaiveDate> {
    Duration::try_days(days_back).and_then(|d| today.checked_sub_signed(d))
}

/// Whether `date` falls inside a window starting at `start` (see
/// [`window_start`]). Undated posts never do.
pub(crate) fn in_window(date: Option<NaiveDate>, start: Option<NaiveDate>) -> bool {
    match (date, start) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(date), Some(start)) => date >= start,
    }
}

/// Returns the `limit` most-used tags among non-draft posts published within
/// `days_back` days before `today` (inclusive). Undated posts are skipped.
pub fn trending_tags(
    tag_filter: &TagFilter,
    posts: &[Post],
    days_back: i64,
    limit: usize,
    today: NaiveDate,
) -> Vec<TagCount> {
    let start = window_start(today, days_back);
    let mut trending = tally(
        posts
            .iter()
            .filter(|p| !p.draft && in_window(p.date, start))
            .flat_map(|p| tag_filter.meaningful_iter(&p.tags)),
    );
    trending.truncate(limit);
    trending
}

/// Returns the `limit` tags that most often appear on the same non-draft
/// posts as `target`. Empty if `target` isn't itself a meaningful tag.
pub fn related_tags(
    tag_filter: &TagFilter,
    posts: &[Post],
    target: &str,
    limit: usize,
) -> Vec<TagCount> {
    if !tag_filter.is_meaningful(target) {
        return Vec::new();
    }
    let mut related = tally(
        posts
            .iter()
            .filter(|p| !p.draft && p.tags.contains(target))
            .flat_map(|p| tag_filter.meaningful_iter(&p.tags))
            .filter(|t| t.as_str() != target),
    );
    related.truncate(limit);
    related
}

/// Counts every meaningful tag across all non-draft posts, most used first.
pub fn tag_stats(tag_filter: &TagFilter, posts: &[Post]) -> Vec<TagCount> {
    tally(
        posts
            .iter()
            .filter(|p| !p.draft)
            .flat_map(|p| tag_filter.meaningful_iter(&p.tags)),
    )
}

/// Returns every meaningful tag used by a non-draft post, sorted.
pub fn all_tags(tag_filter: &TagFilter, posts: &[Post]) -> Vec<String> {
    posts
        .iter()
        .filter(|p| !p.draft)
        .flat_map(|p| tag_filter.meaningful_iter(&p.tags))
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::testutil::*;

    fn counts(counts: &[TagCount]) -> Vec<(&str, usize)> {
        counts.iter().map(|c| (c.tag.as_str(), c.count)).collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn posts() -> Vec<Post> {
        vec![
            post("1", "A", &["posts", "music", "vinyl"], "2024-06-29"),
            post("2", "B", &["posts", "music"], "2024-06-20"),
            post("3", "B", &["books", "music"], "2024-06-01"),
            post("4", "C", &["books", "vinyl"], "2023-01-01"),
            draft("5", "C", &["film", "music"], "2024-06-30"),
            post("6", "C", &["film"], ""),
        ]
    }

    #[test]
    fn test_trending_tags_empty() {
        let filter = TagFilter::default();
        assert!(trending_tags(&filter, &[], 30, 10, today()).is_empty());
    }

    #[test]
    fn test_trending_tags() {
        let filter = TagFilter::default();
        let posts = posts();
        assert_eq!(
            vec![("music", 3), ("vinyl", 1), ("books", 1)],
            counts(&trending_tags(&filter, &posts, 30, 10, today())),
        );
        assert_eq!(
            vec![("music", 2)],
            counts(&trending_tags(&filter, &posts, 10, 1, today())),
        );
        assert!(trending_tags(&filter, &posts, 30, 0, today()).is_empty());
    }

    #[test]
    fn test_trending_tags_with_huge_window() {
        let filter = TagFilter::default();
        let posts = posts();
        // every dated, non-draft post counts; the undated one doesn't
        let want = vec![("music", 3), ("vinyl", 2), ("books", 2)];
        for days in [1_000_000_000, i64::MAX / 86_400 + 1, i64::MAX].iter() {
            assert_eq!(
                want,
                counts(&trending_tags(&filter, &posts, *days, usize::MAX, today())),
            );
        }
    }

    #[test]
    fn test_window_start() {
        assert_eq!(
            NaiveDate::from_ymd_opt(2024, 5, 31),
            window_start(today(), 30)
        );
        assert_eq!(None, window_start(today(), 1_000_000_000));
        assert!(in_window(Some(today()), None));
        assert!(!in_window(None, None));
        assert!(!in_window(
            NaiveDate::from_ymd_opt(2024, 5, 30),
            window_start(today(), 30)
        ));
    }

    #[test]
    fn test_related_tags() {
        let filter = TagFilter::default();
        let posts = posts();
        assert_eq!(
            vec![("vinyl", 1), ("books", 1)],
            counts(&related_tags(&filter, &posts, "music", 5)),
        );
        assert_eq!(
            vec![("music", 1), ("vinyl", 1)],
            counts(&related_tags(&filter, &posts, "books", 5)),
        );
        assert!(related_tags(&filter, &posts, "posts", 5).is_empty());
        assert!(related_tags(&filter, &posts, "unused", 5).is_empty());
    }

    #[test]
    fn test_tag_stats_and_all_tags() {
        let filter = TagFilter::default();
        let posts = posts();
        assert_eq!(
            vec![("music", 3), ("vinyl", 2), ("books", 2), ("film", 1)],
            counts(&tag_stats(&filter, &posts)),
        );
        assert_eq!(
            vec!["books", "film", "music", "vinyl"],
            all_tags(&filter, &posts)
        );
    }
}
