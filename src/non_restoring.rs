use tracing::{debug, trace};

use crate::algorithm::{Algorithm, AlgorithmKind, check_width};
use crate::alu;
use crate::bits::{BitString, decode, encode_unsigned};
use crate::error::SimError;
use crate::step::{Operation, Register, RegisterFile, Step};

/// Non-restoring division on unsigned magnitudes.
///
/// Same registers as restoring division, but a negative partial remainder is
/// never undone. Instead the next iteration adds M back rather than
/// subtracting it, and a single correction after the loop repairs a
/// remainder that ends negative.
///
/// The add/subtract choice follows the sign AC had before the shift, which
/// is the sign that produced the previous quotient bit. The shifted value
/// may overflow the sign bit, but the add or subtract that follows brings AC
/// back into `[-M, M)` modulo `2^bits`.
pub struct NonRestoringDivision;

struct Registers {
    ac: BitString,
    qr: BitString,
    m: BitString,
    count: usize,
}

impl Registers {
    fn snapshot(&self) -> RegisterFile {
        RegisterFile::new()
            .with(Register::Ac, &self.ac)
            .with(Register::Qr, &self.qr)
            .with(Register::M, &self.m)
            .with(Register::Count, self.count)
    }
}

impl Algorithm for NonRestoringDivision {
    const KIND: AlgorithmKind = AlgorithmKind::NonRestoringDivision;

    fn simulate(dividend: i64, divisor: i64, bits: usize) -> Result<Vec<Step>, SimError> {
        if divisor == 0 {
            return Err(SimError::DivisionByZero);
        }
        check_width(bits)?;
        debug!(dividend, divisor, bits, "non-restoring division");

        let dividend = dividend.unsigned_abs();
        let divisor = divisor.unsigned_abs();
        let mut regs = Registers {
            ac: BitString::zeros(bits),
            qr: encode_unsigned(dividend, bits)?,
            m: encode_unsigned(divisor, bits)?,
            count: bits,
        };

        let mut steps = vec![Step::new(
            format!("Initialize: AC = 0, QR = {dividend}, M = {divisor}, Count = {bits}"),
            regs.snapshot(),
            &[Register::Ac, Register::Qr, Register::M],
            Operation::Init,
        )];

        while regs.count > 0 {
            let was_negative = alu::is_negative(&regs.ac);

            alu::shift_left_pair(&mut regs.ac, &mut regs.qr);
            steps.push(Step::new(
                "Shift left AC and QR",
                regs.snapshot(),
                &[Register::Ac, Register::Qr],
                Operation::Shift,
            ));

            if was_negative {
                regs.ac = alu::add(&regs.ac, &regs.m);
                steps.push(Step::new(
                    "AC < 0: Add M to AC",
                    regs.snapshot(),
                    &[Register::Ac],
                    Operation::Add,
                ));
            } else {
                regs.ac = alu::subtract(&regs.ac, &regs.m);
                steps.push(Step::new(
                    "AC ≥ 0: Subtract M from AC",
                    regs.snapshot(),
                    &[Register::Ac],
                    Operation::Subtract,
                ));
            }

            if alu::is_negative(&regs.ac) {
                regs.qr.set_lsb(false);
                steps.push(Step::new(
                    "AC < 0: Set QR₀ = 0",
                    regs.snapshot(),
                    &[Register::Qr],
                    Operation::Shift,
                ));
            } else {
                regs.qr.set_lsb(true);
                steps.push(Step::new(
                    "AC ≥ 0: Set QR₀ = 1",
                    regs.snapshot(),
                    &[Register::Qr],
                    Operation::Add,
                ));
            }
            trace!(count = regs.count, ac = %regs.ac, qr = %regs.qr, "iteration");

            regs.count -= 1;
        }

        if alu::is_negative(&regs.ac) {
            regs.ac = alu::add(&regs.ac, &regs.m);
            steps.push(Step::new(
                "Final correction: AC < 0, so AC = AC + M",
                regs.snapshot(),
                &[Register::Ac],
                Operation::Add,
            ));
        }

        let quotient = decode(&regs.qr, false);
        let remainder = decode(&regs.ac, false);
        debug!(%quotient, %remainder, "non-restoring division complete");
        steps.push(Step::new(
            format!("Complete: Quotient = {quotient}, Remainder = {remainder}"),
            regs.snapshot(),
            &[Register::Qr, Register::Ac],
            Operation::Init,
        ));

        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restoring::RestoringDivision;

    fn quotient_remainder(steps: &[Step]) -> (i128, i128) {
        let last = &steps.last().unwrap().registers;
        let qr: BitString = last.get(Register::Qr).unwrap().parse().unwrap();
        let ac: BitString = last.get(Register::Ac).unwrap().parse().unwrap();
        (decode(&qr, false), decode(&ac, false))
    }

    fn has_final_correction(steps: &[Step]) -> bool {
        steps.iter().any(|s| s.description.starts_with("Final correction"))
    }

    #[test]
    fn test_thirteen_by_four() {
        let steps = NonRestoringDivision::simulate(13, 4, 8).unwrap();
        assert_eq!(quotient_remainder(&steps), (3, 1));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            NonRestoringDivision::simulate(10, 0, 8),
            Err(SimError::DivisionByZero)
        );
    }

    #[test]
    fn test_final_correction_when_remainder_negative() {
        // 7 / 3 ends with AC = -2 before correction.
        let steps = NonRestoringDivision::simulate(7, 3, 8).unwrap();
        assert!(has_final_correction(&steps));
        assert_eq!(steps.len(), 1 + 3 * 8 + 1 + 1);
        assert_eq!(quotient_remainder(&steps), (2, 1));
    }

    #[test]
    fn test_no_correction_for_exact_division() {
        let steps = NonRestoringDivision::simulate(12, 4, 8).unwrap();
        assert!(!has_final_correction(&steps));
        assert_eq!(steps.len(), 1 + 3 * 8 + 1);
        assert_eq!(quotient_remainder(&steps), (3, 0));
    }

    #[test]
    fn test_add_follows_negative_partial_remainder() {
        // 1 / 2 at 4 bits: first subtract leaves AC negative, so the second
        // iteration adds.
        let steps = NonRestoringDivision::simulate(1, 2, 4).unwrap();
        assert_eq!(steps[2].operation, Operation::Subtract);
        assert_eq!(steps[2].registers.get(Register::Ac), Some("1110"));
        assert_eq!(steps[5].operation, Operation::Add);
        assert_eq!(steps[5].description, "AC < 0: Add M to AC");
    }

    #[test]
    fn test_large_divisor() {
        // Divisors above 2^(bits-2) overflow the sign bit after the shift.
        let steps = NonRestoringDivision::simulate(200, 100, 8).unwrap();
        assert_eq!(quotient_remainder(&steps), (2, 0));
        let steps = NonRestoringDivision::simulate(255, 128, 8).unwrap();
        assert_eq!(quotient_remainder(&steps), (1, 127));
    }

    #[test]
    fn test_agrees_with_restoring_exhaustive_4_bit() {
        for dividend in 0..16 {
            for divisor in 1..=8 {
                let a = quotient_remainder(&NonRestoringDivision::simulate(dividend, divisor, 4).unwrap());
                let b = quotient_remainder(&RestoringDivision::simulate(dividend, divisor, 4).unwrap());
                assert_eq!(a, b, "{dividend} / {divisor}");
                assert_eq!(a, ((dividend / divisor) as i128, (dividend % divisor) as i128));
            }
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn matches_native_division(dividend in 0i64..256, divisor in 1i64..=100) {
            let steps = NonRestoringDivision::simulate(dividend, divisor, 8).unwrap();
            let last = &steps.last().unwrap().registers;
            let qr: BitString = last.get(Register::Qr).unwrap().parse().unwrap();
            let ac: BitString = last.get(Register::Ac).unwrap().parse().unwrap();
            prop_assert_eq!(decode(&qr, false), (dividend / divisor) as i128);
            prop_assert_eq!(decode(&ac, false), (dividend % divisor) as i128);
        }

        #[test]
        fn sixteen_bit_division(dividend in 0i64..65536, divisor in 1i64..=32768) {
            let steps = NonRestoringDivision::simulate(dividend, divisor, 16).unwrap();
            let last = &steps.last().unwrap().registers;
            let qr: BitString = last.get(Register::Qr).unwrap().parse().unwrap();
            prop_assert_eq!(decode(&qr, false), (dividend / divisor) as i128);
        }
    }
}
