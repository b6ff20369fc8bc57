use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::algorithm::AlgorithmKind;

/// Range random division operands are drawn from.
pub const DIVISION_RANGE: (i64, i64) = (10, 100);
/// Range random multiplication operands are drawn from.
pub const MULTIPLICATION_RANGE: (i64, i64) = (-15, 15);

/// Draw a demo operand pair for `kind`. Division never draws a zero divisor.
pub fn random_operands<R: Rng>(kind: AlgorithmKind, rng: &mut R) -> (i64, i64) {
    let (lo, hi) = if kind.is_division() {
        DIVISION_RANGE
    } else {
        MULTIPLICATION_RANGE
    };
    (rng.gen_range(lo..=hi), rng.gen_range(lo..=hi))
}

/// Seeded convenience wrapper around [`random_operands`].
pub fn seeded_operands(kind: AlgorithmKind, seed: u64) -> (i64, i64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    random_operands(kind, &mut rng)
}
