use tracing::{debug, trace};

use crate::algorithm::{Algorithm, AlgorithmKind, check_width};
use crate::alu;
use crate::bits::{BitString, decode, encode_unsigned};
use crate::error::SimError;
use crate::step::{Operation, Register, RegisterFile, Step};

/// Restoring division on unsigned magnitudes.
///
/// Registers:
/// - `AC`: partial remainder, starts at 0
/// - `QR`: dividend, shifted out one bit per iteration while quotient bits
///   shift in from the right
/// - `M`: divisor
///
/// Each iteration shifts AC:QR left, subtracts M from AC, and either keeps
/// the difference (`QR₀ = 1`) or restores AC to its previous value
/// (`QR₀ = 0`). After `bits` iterations QR holds the quotient and AC the
/// remainder.
pub struct RestoringDivision;

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

impl Algorithm for RestoringDivision {
    const KIND: AlgorithmKind = AlgorithmKind::RestoringDivision;

    fn simulate(dividend: i64, divisor: i64, bits: usize) -> Result<Vec<Step>, SimError> {
        if divisor == 0 {
            return Err(SimError::DivisionByZero);
        }
        check_width(bits)?;
        debug!(dividend, divisor, bits, "restoring division");

        let dividend = dividend.unsigned_abs();
        let divisor = divisor.unsigned_abs();
        let mut regs = Registers {
            ac: BitString::zeros(bits),
            qr: encode_unsigned(dividend, bits)?,
            m: encode_unsigned(divisor, bits)?,
            count: bits,
        };

        let mut steps = vec![Step::new(
            format!(
                "Initialize: AC = 0, QR = {dividend} (dividend), M = {divisor} (divisor), Count = {bits}"
            ),
            regs.snapshot(),
            &[Register::Ac, Register::Qr, Register::M],
            Operation::Init,
        )];

        while regs.count > 0 {
            alu::shift_left_pair(&mut regs.ac, &mut regs.qr);
            steps.push(Step::new(
                "Shift left AC and QR",
                regs.snapshot(),
                &[Register::Ac, Register::Qr],
                Operation::Shift,
            ));

            let previous = regs.ac.clone();
            regs.ac = alu::subtract(&regs.ac, &regs.m);
            steps.push(Step::new(
                "Subtract M from AC: AC = AC - M",
                regs.snapshot(),
                &[Register::Ac],
                Operation::Subtract,
            ));

            if alu::is_negative(&regs.ac) {
                regs.ac = previous;
                regs.qr.set_lsb(false);
                trace!(count = regs.count, ac = %regs.ac, qr = %regs.qr, "restored");
                steps.push(Step::new(
                    "AC < 0: Restore AC, set QR₀ = 0",
                    regs.snapshot(),
                    &[Register::Ac, Register::Qr],
                    Operation::Restore,
                ));
            } else {
                regs.qr.set_lsb(true);
                trace!(count = regs.count, ac = %regs.ac, qr = %regs.qr, "kept");
                steps.push(Step::new(
                    "AC ≥ 0: Keep AC, set QR₀ = 1",
                    regs.snapshot(),
                    &[Register::Qr],
                    Operation::Add,
                ));
            }

            regs.count -= 1;
        }

        let quotient = decode(&regs.qr, false);
        let remainder = decode(&regs.ac, false);
        debug!(%quotient, %remainder, "restoring division complete");
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
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn matches_native_division(dividend in 0i64..256, divisor in 1i64..=100) {
            let steps = RestoringDivision::simulate(dividend, divisor, 8).unwrap();
            let last = &steps.last().unwrap().registers;
            let qr: BitString = last.get(Register::Qr).unwrap().parse().unwrap();
            let ac: BitString = last.get(Register::Ac).unwrap().parse().unwrap();
            prop_assert_eq!(decode(&qr, false), (dividend / divisor) as i128);
            prop_assert_eq!(decode(&ac, false), (dividend % divisor) as i128);
        }

        #[test]
        fn every_register_keeps_its_width(dividend in 0i64..16, divisor in 1i64..=8) {
            let steps = RestoringDivision::simulate(dividend, divisor, 4).unwrap();
            for step in &steps {
                for reg in [Register::Ac, Register::Qr, Register::M] {
                    prop_assert_eq!(step.registers.get(reg).unwrap().len(), 4);
                }
            }
        }
    }
}
