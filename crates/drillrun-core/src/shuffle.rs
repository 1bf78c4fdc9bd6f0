//! Randomized presentation order.

use rand::seq::SliceRandom;
use rand::Rng;

/// Return a uniformly shuffled copy of `items`, leaving the input untouched.
///
/// Each element is cloned once. Shuffle `Arc`s to keep item identity.
///
/// Sequences of zero or one element come back unchanged.
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut order = items.to_vec();
    if order.len() > 1 {
        order.shuffle(rng);
    }
    order
}
