use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::SimError;

/// A fixed-width two's-complement bit string, most-significant bit first.
///
/// The width is decided when the string is built and never changes: every
/// ALU operation returns a string of the same width as its inputs, and the
/// paired-register helpers split a combined register back at the original
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    /// All-zero string of the given width.
    pub fn zeros(width: usize) -> Self {
        Self {
            bits: vec![false; width],
        }
    }

    /// Wrap an explicit bit vector (MSB first).
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Most-significant (sign) bit. An empty string reads as `0`.
    #[inline]
    pub fn msb(&self) -> bool {
        self.bits.first().copied().unwrap_or(false)
    }

    /// Least-significant bit. An empty string reads as `0`.
    #[inline]
    pub fn lsb(&self) -> bool {
        self.bits.last().copied().unwrap_or(false)
    }

    /// Bit at `pos` counted from the least-significant end (`0` is the LSB).
    /// Positions past the MSB read as `0`.
    #[inline]
    pub fn bit_from_lsb(&self, pos: usize) -> bool {
        let width = self.bits.len();
        if pos >= width {
            return false;
        }
        self.bits[width - 1 - pos]
    }

    /// Overwrite the least-significant bit.
    pub fn set_lsb(&mut self, bit: bool) {
        if let Some(last) = self.bits.last_mut() {
            *last = bit;
        }
    }

    /// `self:low` as one combined register of width `self.width() + low.width()`.
    pub fn concat(&self, low: &BitString) -> BitString {
        let mut bits = Vec::with_capacity(self.bits.len() + low.bits.len());
        bits.extend_from_slice(&self.bits);
        bits.extend_from_slice(&low.bits);
        BitString { bits }
    }

    /// Split into the high `mid` bits and the remaining low bits.
    pub fn split_at(&self, mid: usize) -> (BitString, BitString) {
        let (high, low) = self.bits.split_at(mid.min(self.bits.len()));
        (
            BitString::from_bits(high.to_vec()),
            BitString::from_bits(low.to_vec()),
        )
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for BitString {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(SimError::InvalidBit(other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BitString { bits })
    }
}

impl Serialize for BitString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ripple-carry addition of two equal-width bit slices, LSB to MSB.
/// The carry out of the MSB is dropped.
pub(crate) fn ripple_add(a: &[bool], b: &[bool], carry_in: bool) -> Vec<bool> {
    debug_assert_eq!(a.len(), b.len(), "ripple_add operands must share a width");
    let mut out = vec![false; a.len()];
    let mut carry = carry_in;
    for i in (0..a.len()).rev() {
        let (x, y) = (a[i], b[i]);
        out[i] = x ^ y ^ carry;
        carry = (x & y) | (carry & (x ^ y));
    }
    out
}

/// Flip every bit.
pub(crate) fn invert(bits: &[bool]) -> Vec<bool> {
    bits.iter().map(|b| !b).collect()
}

/// Invert then add one through the ripple adder.
pub(crate) fn negate(bits: &[bool]) -> Vec<bool> {
    let zeros = vec![false; bits.len()];
    ripple_add(&invert(bits), &zeros, true)
}

/// Zero-padded binary expansion of `magnitude`, exactly `width` bits.
fn padded_binary(magnitude: u64, width: usize) -> Vec<bool> {
    (0..width)
        .rev()
        .map(|pos| pos < 64 && (magnitude >> pos) & 1 == 1)
        .collect()
}

/// Encode a signed integer in `width`-bit two's complement.
///
/// Non-negative values are zero-padded; negative values are the padded
/// magnitude, inverted, plus one. Values outside
/// `[-2^(width-1), 2^(width-1) - 1]` are rejected rather than aliased.
pub fn encode_signed(value: i64, width: usize) -> Result<BitString, SimError> {
    let fits = match width {
        0 => false,
        w if w >= 64 => true,
        w => {
            let half = 1i128 << (w - 1);
            (-half..half).contains(&(value as i128))
        }
    };
    if !fits {
        return Err(SimError::OperandOutOfRange {
            value: value as i128,
            bits: width,
            signed: true,
        });
    }

    let padded = padded_binary(value.unsigned_abs(), width);
    if value >= 0 {
        Ok(BitString::from_bits(padded))
    } else {
        Ok(BitString::from_bits(negate(&padded)))
    }
}

/// Encode a non-negative integer as a plain `width`-bit binary number.
pub fn encode_unsigned(value: u64, width: usize) -> Result<BitString, SimError> {
    if width < 64 && value >> width != 0 {
        return Err(SimError::OperandOutOfRange {
            value: value as i128,
            bits: width,
            signed: false,
        });
    }
    Ok(BitString::from_bits(padded_binary(value, width)))
}

/// Interpret a bit string as a base-2 number.
///
/// With `signed`, a set MSB means the value is negative: the string is
/// inverted, incremented, read as a magnitude and negated.
pub fn decode(bits: &BitString, signed: bool) -> i128 {
    fn magnitude(bits: &[bool]) -> i128 {
        bits.iter()
            .fold(0i128, |acc, &b| acc.wrapping_shl(1) | b as i128)
    }
    if signed && bits.msb() {
        -magnitude(&negate(bits.bits()))
    } else {
        magnitude(bits.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bs(s: &str) -> BitString {
        s.parse().unwrap()
    }

    #[test]
    fn test_encode_positive_pads() {
        assert_eq!(encode_signed(5, 8).unwrap().to_string(), "00000101");
        assert_eq!(encode_signed(0, 4).unwrap().to_string(), "0000");
    }

    #[test]
    fn test_encode_negative_twos_complement() {
        assert_eq!(encode_signed(-5, 8).unwrap().to_string(), "11111011");
        assert_eq!(encode_signed(-1, 4).unwrap().to_string(), "1111");
    }

    #[test]
    fn test_encode_signed_extremes() {
        assert_eq!(encode_signed(-8, 4).unwrap().to_string(), "1000");
        assert_eq!(encode_signed(7, 4).unwrap().to_string(), "0111");
        assert_eq!(encode_signed(-128, 8).unwrap().to_string(), "10000000");
    }

    #[test]
    fn test_encode_signed_rejects_out_of_range() {
        assert_eq!(
            encode_signed(8, 4),
            Err(SimError::OperandOutOfRange { value: 8, bits: 4, signed: true })
        );
        assert!(encode_signed(-9, 4).is_err());
        assert!(encode_signed(0, 0).is_err());
    }

    #[test]
    fn test_encode_unsigned() {
        assert_eq!(encode_unsigned(255, 8).unwrap().to_string(), "11111111");
        assert_eq!(encode_unsigned(13, 8).unwrap().to_string(), "00001101");
        assert!(encode_unsigned(256, 8).is_err());
    }

    #[test]
    fn test_decode_unsigned() {
        assert_eq!(decode(&bs("00001101"), false), 13);
        assert_eq!(decode(&bs("11111111"), false), 255);
    }

    #[test]
    fn test_decode_signed() {
        assert_eq!(decode(&bs("11111011"), true), -5);
        assert_eq!(decode(&bs("01111111"), true), 127);
        assert_eq!(decode(&bs("10000000"), true), -128);
        assert_eq!(decode(&bs("1111111111110001"), true), -15);
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(&BitString::zeros(0), true), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("01x1".parse::<BitString>(), Err(SimError::InvalidBit('x')));
    }

    #[test]
    fn test_bit_accessors() {
        let b = bs("1001");
        assert!(b.msb());
        assert!(b.lsb());
        assert!(!b.bit_from_lsb(1));
        assert!(b.bit_from_lsb(3));
        assert!(!b.bit_from_lsb(9));
    }

    #[test]
    fn test_set_lsb() {
        let mut b = bs("1000");
        b.set_lsb(true);
        assert_eq!(b.to_string(), "1001");
        b.set_lsb(false);
        assert_eq!(b.to_string(), "1000");
    }

    #[test]
    fn test_concat_and_split() {
        let joined = bs("1100").concat(&bs("0011"));
        assert_eq!(joined.to_string(), "11000011");
        let (hi, lo) = joined.split_at(4);
        assert_eq!(hi, bs("1100"));
        assert_eq!(lo, bs("0011"));
    }

    #[test]
    fn test_ripple_add_discards_carry() {
        let sum = ripple_add(bs("1111").bits(), bs("0001").bits(), false);
        assert_eq!(BitString::from_bits(sum).to_string(), "0000");
    }

    #[test]
    fn test_serialize_as_string() {
        let json = serde_json::to_string(&bs("0101")).unwrap();
        assert_eq!(json, "\"0101\"");
    }
}
