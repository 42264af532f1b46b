//! The library code for the `kindred` related-post recommender. The
//! architecture can be generally broken down into two distinct steps:
//!
//! 1. Loading posts from source files on disk ([`crate::parser`])
//! 2. Ranking those posts against a reference post ([`crate::rank`])
//!
//! Of the two, the second step is the interesting one. Every ranking starts by
//! filtering the candidate posts (never the reference itself, never drafts),
//! then scores each candidate with [`crate::score::Scorer`]: a weighted sum of
//! shared meaningful tags, a same-author bonus, and a recency bonus that
//! decays linearly with the distance between publish dates. Scores are sorted
//! best first (ties go to the newer post, then to input order) and truncated.
//!
//! On top of that base ranking sit the variations a multi-author blog wants:
//! recommendations that spread across authors ([`crate::diversity`]), authors
//! who write about similar things ([`crate::authors`]), and tag aggregations
//! like trending tags ([`crate::trending`]).
//!
//! The ranking code is pure: it borrows its inputs, holds no state between
//! calls, and degrades to an empty result rather than failing.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod authors;
pub mod config;
pub mod diversity;
pub mod parser;
pub mod post;
pub mod rank;
pub mod sample;
pub mod score;
pub mod tag;
pub mod trending;
