//! Random sampling, for "you might also like" style sections that shouldn't
//! be ranked at all. The random source is always supplied by the caller.

use rand::seq::SliceRandom;
use rand::Rng;

/// Returns `count` items chosen uniformly at random without replacement, in
/// shuffled order. If there are no more than `count` items, all of them are
/// returned in their original order.
pub fn random_sample<'p, T, R>(items: &'p [T], count: usize, rng: &mut R) -> Vec<&'p T>
where
    R: Rng + ?Sized,
{
    let mut sample: Vec<&T> = items.iter().collect();
    if items.len() <= count {
        return sample;
    }
    sample.shuffle(rng);
    sample.truncate(count);
    sample
}
