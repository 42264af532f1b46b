//! Cross-author recommendations. Ranks posts by other authors and then walks
//! the ranking greedily, capping how many posts any one author may contribute
//! so a prolific author can't flood the list.

use crate::post::Post;
use crate::rank::{candidate_pool, Recommender};
use std::collections::HashMap;
use tracing::debug;

/// The default per-author cap for a list of `k` posts: half the list, rounded
/// up.
pub fn default_max_per_author(k: usize) -> usize {
    k / 2 + k % 2
}

impl Recommender<'_> {
    /// Returns up to `k` posts by authors other than the reference's author,
    /// best first, with no author contributing more than `max_per_author`
    /// posts (default [`default_max_per_author`]).
    ///
    /// The cap is strict: if the remaining candidates can't fill `k` slots
    /// without exceeding it, fewer than `k` posts are returned. A reference
    /// without an author yields nothing. Candidates without an author are
    /// capped together as a single anonymous author.
    pub fn select_diverse<'p>(
        &self,
        reference: &Post,
        candidates: &'p [Post],
        k: usize,
        max_per_author: Option<usize>,
    ) -> Vec<&'p Post> {
        let author = match &reference.author {
            Some(author) => author,
            None => return Vec::new(),
        };
        let max_per_author = max_per_author.unwrap_or_else(|| default_max_per_author(k));

        let others = candidate_pool(candidates, Some(reference), true)
            .into_iter()
            .filter(|p| p.author.as_ref() != Some(author));
        let ranked = self.scorer().score_and_sort(reference, others);

        let mut selected: Vec<&Post> = Vec::new();
        let mut per_author: HashMap<Option<&str>, usize> = HashMap::new();
        for record in ranked {
            if selected.len() >= k {
                break;
            }
            let count = per_author.entry(record.post.author.as_deref()).or_insert(0);
            if *count < max_per_author {
                *count += 1;
                selected.push(record.post);
            }
        }

        debug!(
            reference = %reference.id,
            k,
            max_per_author,
            selected = selected.len(),
            authors = per_author.len(),
            "selected cross-author posts"
        );
        selected
    }
}
