//! Fixed-width binary ALU over [`BitString`].
//!
//! Every operation is pure and width-preserving. Overflow wraps silently
//! modulo `2^width`; there is no overflow flag because none of the
//! simulators consult one.

use crate::bits::{self, BitString};

/// Ripple-carry sum of two equal-width strings, carry out discarded.
pub fn add(a: &BitString, b: &BitString) -> BitString {
    BitString::from_bits(bits::ripple_add(a.bits(), b.bits(), false))
}

/// Invert every bit, then add one.
pub fn twos_complement(a: &BitString) -> BitString {
    BitString::from_bits(bits::negate(a.bits()))
}

/// `a - b`, computed as `a + twos_complement(b)`. Never borrows directly.
pub fn subtract(a: &BitString, b: &BitString) -> BitString {
    add(a, &twos_complement(b))
}

/// Drop the MSB and append a `0`.
pub fn shift_left(a: &BitString) -> BitString {
    let mut out = a.bits().get(1..).unwrap_or_default().to_vec();
    if a.width() > 0 {
        out.push(false);
    }
    BitString::from_bits(out)
}

/// Drop the LSB. An arithmetic shift re-inserts the old MSB at the top, a
/// logical shift inserts `0`.
pub fn shift_right(a: &BitString, arithmetic: bool) -> BitString {
    let width = a.width();
    if width == 0 {
        return a.clone();
    }
    let fill = arithmetic && a.msb();
    let mut out = Vec::with_capacity(width);
    out.push(fill);
    out.extend_from_slice(&a.bits()[..width - 1]);
    BitString::from_bits(out)
}

#[inline]
pub fn is_negative(a: &BitString) -> bool {
    a.msb()
}

/// Shift `hi:lo` left by one as a single combined register.
pub fn shift_left_pair(hi: &mut BitString, lo: &mut BitString) {
    let (new_hi, new_lo) = shift_left(&hi.concat(lo)).split_at(hi.width());
    *hi = new_hi;
    *lo = new_lo;
}

/// Shift `hi:lo` right by one as a single combined register.
pub fn shift_right_pair(hi: &mut BitString, lo: &mut BitString, arithmetic: bool) {
    let (new_hi, new_lo) = shift_right(&hi.concat(lo), arithmetic).split_at(hi.width());
    *hi = new_hi;
    *lo = new_lo;
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::bits::{decode, encode_unsigned};
    use proptest::prelude::*;

    fn operands() -> impl Strategy<Value = (usize, u64, u64)> {
        prop::sample::select(vec![4usize, 8, 16]).prop_flat_map(|w| {
            let limit = 1u64 << w;
            (Just(w), 0..limit, 0..limit)
        })
    }

    proptest! {
        #[test]
        fn add_then_subtract_restores((width, a, b) in operands()) {
            let a_bits = encode_unsigned(a, width).unwrap();
            let b_bits = encode_unsigned(b, width).unwrap();
            let back = subtract(&add(&a_bits, &b_bits), &b_bits);
            prop_assert_eq!(decode(&back, false), a as i128);
        }

        #[test]
        fn add_is_modular((width, a, b) in operands()) {
            let sum = add(&encode_unsigned(a, width).unwrap(), &encode_unsigned(b, width).unwrap());
            prop_assert_eq!(sum.width(), width);
            prop_assert_eq!(decode(&sum, false), ((a + b) % (1u64 << width)) as i128);
        }

        #[test]
        fn shifts_move_one_bit(bits in prop::collection::vec(any::<bool>(), 1..24)) {
            let x = BitString::from_bits(bits.clone());
            let left = shift_left(&x);
            prop_assert_eq!(&left.bits()[..bits.len() - 1], &bits[1..]);
            prop_assert!(!left.lsb());

            let right = shift_right(&x, false);
            prop_assert!(!right.msb());
            prop_assert_eq!(&right.bits()[1..], &bits[..bits.len() - 1]);

            // Logical right after left gives back x with its MSB cleared.
            let round = shift_right(&left, false);
            prop_assert!(!round.msb());
            prop_assert_eq!(&round.bits()[1..], &bits[1..]);
        }
    }
}
