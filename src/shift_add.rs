use tracing::{debug, trace};

use crate::algorithm::{Algorithm, AlgorithmKind, check_width};
use crate::alu;
use crate::bits::{BitString, decode, encode_unsigned};
use crate::error::SimError;
use crate::step::{Operation, Register, RegisterFile, Step};

/// Unsigned shift-and-add multiplication.
///
/// Operands are taken by magnitude. Each iteration adds M into AC when the
/// multiplier's current LSB is 1, then shifts AC:MQ right logically, so
/// after `bits` iterations AC:MQ holds the double-width product.
///
/// AC has no carry flip-flop: an add whose carry leaves AC is truncated, so
/// the product is exact only while the multiplicand is at most `2^(bits-1)`.
pub struct ShiftAdd;

struct Registers {
    ac: BitString,
    mq: BitString,
    m: BitString,
    count: usize,
}

impl Registers {
    fn snapshot(&self) -> RegisterFile {
        RegisterFile::new()
            .with(Register::Ac, &self.ac)
            .with(Register::Mq, &self.mq)
            .with(Register::M, &self.m)
            .with(Register::Count, self.count)
    }
}

impl Algorithm for ShiftAdd {
    const KIND: AlgorithmKind = AlgorithmKind::ShiftAddMultiplication;

    fn simulate(multiplicand: i64, multiplier: i64, bits: usize) -> Result<Vec<Step>, SimError> {
        check_width(bits)?;
        debug!(multiplicand, multiplier, bits, "shift-add multiplication");

        let multiplicand = multiplicand.unsigned_abs();
        let multiplier = multiplier.unsigned_abs();
        let mut regs = Registers {
            ac: BitString::zeros(bits),
            mq: encode_unsigned(multiplier, bits)?,
            m: encode_unsigned(multiplicand, bits)?,
            count: bits,
        };

        let mut steps = vec![Step::new(
            format!(
                "Initialize: AC = 0, MQ = {multiplier} (multiplier), M = {multiplicand} (multiplicand), Count = {bits}"
            ),
            regs.snapshot(),
            &[Register::Ac, Register::Mq, Register::M],
            Operation::Init,
        )];

        while regs.count > 0 {
            let mq0 = regs.mq.lsb();
            if mq0 {
                regs.ac = alu::add(&regs.ac, &regs.m);
                steps.push(Step::new(
                    "MQ₀ = 1: Add M to AC",
                    regs.snapshot().with(Register::Mq0, "1"),
                    &[Register::Ac, Register::Mq],
                    Operation::Add,
                ));
            } else {
                steps.push(Step::new(
                    "MQ₀ = 0: No addition",
                    regs.snapshot().with(Register::Mq0, "0"),
                    &[Register::Mq],
                    Operation::Shift,
                ));
            }

            alu::shift_right_pair(&mut regs.ac, &mut regs.mq, false);
            trace!(count = regs.count, ac = %regs.ac, mq = %regs.mq, "shifted");
            steps.push(Step::new(
                "Shift right AC and MQ",
                regs.snapshot(),
                &[Register::Ac, Register::Mq],
                Operation::Shift,
            ));

            regs.count -= 1;
        }

        let product_bits = regs.ac.concat(&regs.mq);
        let product = decode(&product_bits, false);
        debug!(%product, "shift-add multiplication complete");
        steps.push(Step::new(
            format!("Complete: Product = {product} (AC:MQ = {}:{})", regs.ac, regs.mq),
            regs.snapshot(),
            &[Register::Ac, Register::Mq],
            Operation::Init,
        ));

        Ok(steps)
    }
}
