use rand::Rng;

/// In-place Fisher–Yates shuffle.
///
/// Walks from the last index down to 1, swapping each slot with a uniformly
/// chosen slot in `[0, i]`. Given a uniform `rng` every permutation is equally
/// likely, and a seeded `rng` always produces the same order.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
