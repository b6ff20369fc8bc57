use tracing::{debug, trace};

use crate::algorithm::{Algorithm, AlgorithmKind, check_width};
use crate::alu;
use crate::bits::{BitString, decode, encode_signed};
use crate::error::SimError;
use crate::step::{Operation, Register, RegisterFile, Step};

/// Radix-4 (bit-pair) Booth recoding.
///
/// Consumes two multiplier bits per iteration by inspecting the group
/// `(MQ₁, MQ₀, Q₋₁)` and adding a multiple of M from `{0, ±M, ±2M}`, then
/// shifting AC:MQ right arithmetically by two. Runs `bits / 2` iterations,
/// so the width must be even.
///
/// `2M` is formed in a `bits`-wide register, so the product is exact only
/// for multiplicands in `[-(2^(bits-2)) + 1, 2^(bits-2)]`; outside that
/// range AC wraps.
pub struct FastBooth;

/// The multiple of M selected by one recoding group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recode {
    Zero,
    PlusM,
    PlusTwoM,
    MinusTwoM,
    MinusM,
}

impl Recode {
    fn from_group(mq1: bool, mq0: bool, q_minus_1: bool) -> Self {
        match (mq1, mq0, q_minus_1) {
            (false, false, false) | (true, true, true) => Recode::Zero,
            (false, false, true) | (false, true, false) => Recode::PlusM,
            (false, true, true) => Recode::PlusTwoM,
            (true, false, false) => Recode::MinusTwoM,
            (true, false, true) | (true, true, false) => Recode::MinusM,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Recode::Zero => "No operation (0)",
            Recode::PlusM => "Add M (+1)",
            Recode::PlusTwoM => "Add 2M (+2)",
            Recode::MinusTwoM => "Subtract 2M (-2)",
            Recode::MinusM => "Subtract M (-1)",
        }
    }

    fn operation(self) -> Operation {
        match self {
            Recode::Zero => Operation::Booth,
            Recode::PlusM | Recode::PlusTwoM => Operation::Add,
            Recode::MinusTwoM | Recode::MinusM => Operation::Subtract,
        }
    }
}

struct Registers {
    ac: BitString,
    mq: BitString,
    m: BitString,
    q_minus_1: bool,
    count: usize,
}

impl Registers {
    fn snapshot(&self) -> RegisterFile {
        RegisterFile::new()
            .with(Register::Ac, &self.ac)
            .with(Register::Mq, &self.mq)
            .with(Register::M, &self.m)
            .with(Register::QMinus1, bit_char(self.q_minus_1))
            .with(Register::Count, self.count)
    }
}

fn bit_char(bit: bool) -> char {
    if bit { '1' } else { '0' }
}

impl Algorithm for FastBooth {
    const KIND: AlgorithmKind = AlgorithmKind::FastBoothMultiplication;

    fn simulate(multiplicand: i64, multiplier: i64, bits: usize) -> Result<Vec<Step>, SimError> {
        check_width(bits)?;
        if bits % 2 != 0 {
            return Err(SimError::OddWidth { bits });
        }
        debug!(multiplicand, multiplier, bits, "fast booth multiplication");

        let iterations = bits / 2;
        let mut regs = Registers {
            ac: BitString::zeros(bits),
            mq: encode_signed(multiplier, bits)?,
            m: encode_signed(multiplicand, bits)?,
            q_minus_1: false,
            count: iterations,
        };

        let zero = BitString::zeros(bits);
        let neg_m = alu::subtract(&zero, &regs.m);
        let two_m = alu::add(&regs.m, &regs.m);
        let neg_two_m = alu::subtract(&zero, &two_m);
        trace!(neg_m = %neg_m, two_m = %two_m, neg_two_m = %neg_two_m, "multiples");

        let mut steps = vec![Step::new(
            format!(
                "Initialize: AC = 0, MQ = {multiplier}, M = {multiplicand}, Q₋₁ = 0. Fast Booth uses 2-bit grouping."
            ),
            regs.snapshot()
                .with(Register::NegM, &neg_m)
                .with(Register::TwoM, &two_m),
            &[Register::Ac, Register::Mq, Register::M],
            Operation::Init,
        )];

        while regs.count > 0 {
            let mq1 = regs.mq.bit_from_lsb(1);
            let mq0 = regs.mq.lsb();
            let group = format!(
                "{}{}{}",
                bit_char(mq1),
                bit_char(mq0),
                bit_char(regs.q_minus_1)
            );

            let recode = Recode::from_group(mq1, mq0, regs.q_minus_1);
            match recode {
                Recode::Zero => {}
                Recode::PlusM => regs.ac = alu::add(&regs.ac, &regs.m),
                Recode::PlusTwoM => regs.ac = alu::add(&regs.ac, &two_m),
                Recode::MinusTwoM => regs.ac = alu::subtract(&regs.ac, &two_m),
                Recode::MinusM => regs.ac = alu::subtract(&regs.ac, &regs.m),
            }
            steps.push(Step::new(
                format!("Booth Recode ({group}): {}", recode.describe()),
                regs.snapshot().with(Register::Group, &group),
                &[Register::Ac],
                recode.operation(),
            ));

            regs.q_minus_1 = mq1;
            alu::shift_right_pair(&mut regs.ac, &mut regs.mq, true);
            alu::shift_right_pair(&mut regs.ac, &mut regs.mq, true);
            regs.count -= 1;
            trace!(count = regs.count, %group, ac = %regs.ac, mq = %regs.mq, "shifted");
            steps.push(Step::new(
                "Arithmetic shift right by 2 positions",
                regs.snapshot(),
                &[Register::Ac, Register::Mq],
                Operation::Shift,
            ));
        }

        let product = decode(&regs.ac.concat(&regs.mq), true);
        debug!(%product, iterations, "fast booth multiplication complete");
        steps.push(Step::new(
            format!(
                "Complete: Product = {product} after {iterations} recoding steps, half of radix-2 Booth"
            ),
            regs.snapshot(),
            &[Register::Ac, Register::Mq],
            Operation::Init,
        ));

        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booth::Booth;

    fn product(steps: &[Step]) -> i128 {
        let last = &steps.last().unwrap().registers;
        let ac: BitString = last.get(Register::Ac).unwrap().parse().unwrap();
        let mq: BitString = last.get(Register::Mq).unwrap().parse().unwrap();
        decode(&ac.concat(&mq), true)
    }

    fn recode_steps(steps: &[Step]) -> Vec<&Step> {
        steps
            .iter()
            .filter(|s| s.registers.get(Register::Group).is_some())
            .collect()
    }

    #[test]
    fn test_negative_five_times_three() {
        let steps = FastBooth::simulate(-5, 3, 8).unwrap();
        assert_eq!(product(&steps), -15);
        assert_eq!(recode_steps(&steps).len(), 4);
        assert!(steps.last().unwrap().description.starts_with("Complete: Product = -15"));
    }

    #[test]
    fn test_recode_table() {
        use Recode::*;
        let table = [
            ((false, false, false), Zero),
            ((false, false, true), PlusM),
            ((false, true, false), PlusM),
            ((false, true, true), PlusTwoM),
            ((true, false, false), MinusTwoM),
            ((true, false, true), MinusM),
            ((true, true, false), MinusM),
            ((true, true, true), Zero),
        ];
        for ((a, b, c), expected) in table {
            assert_eq!(Recode::from_group(a, b, c), expected);
        }
    }

    #[test]
    fn test_init_shows_multiples() {
        let steps = FastBooth::simulate(3, 1, 8).unwrap();
        let init = &steps[0].registers;
        assert_eq!(init.get(Register::NegM), Some("11111101"));
        assert_eq!(init.get(Register::TwoM), Some("00000110"));
        assert_eq!(init.get(Register::Count), Some("4"));
    }

    #[test]
    fn test_groups_for_known_multiplier() {
        // MQ = 0110 1011 (107): groups 110, 101, 101, 011 from the right.
        let steps = FastBooth::simulate(1, 107, 8).unwrap();
        let groups: Vec<_> = recode_steps(&steps)
            .iter()
            .map(|s| s.registers.get(Register::Group).unwrap().to_string())
            .collect();
        assert_eq!(groups, ["110", "101", "101", "011"]);
        assert_eq!(product(&steps), 107);
    }

    #[test]
    fn test_count_decrements_per_pair() {
        let steps = FastBooth::simulate(2, 5, 4).unwrap();
        let counts: Vec<_> = steps
            .iter()
            .map(|s| s.registers.get(Register::Count).unwrap().to_string())
            .collect();
        assert_eq!(counts, ["2", "2", "1", "1", "0", "0"]);
    }

    #[test]
    fn test_half_the_iterations_of_booth() {
        let fast = FastBooth::simulate(-5, 3, 16).unwrap();
        let slow = Booth::simulate(-5, 3, 16).unwrap();
        assert_eq!(recode_steps(&fast).len(), 8);
        assert_eq!(
            slow.iter().filter(|s| s.registers.get(Register::BitPair).is_some()).count(),
            16
        );
        assert_eq!(product(&fast), product(&slow));
    }

    #[test]
    fn test_odd_width_rejected() {
        assert_eq!(FastBooth::simulate(1, 1, 5), Err(SimError::OddWidth { bits: 5 }));
    }

    #[test]
    fn test_zero_width_rejected_first() {
        assert_eq!(
            FastBooth::simulate(1, 1, 0),
            Err(SimError::UnsupportedWidth { bits: 0 })
        );
    }

    #[test]
    fn test_two_m_overflow_wraps() {
        // 2 * 7 does not fit in a 4-bit register.
        let steps = FastBooth::simulate(7, 5, 4).unwrap();
        assert_ne!(product(&steps), 35);
    }
}
