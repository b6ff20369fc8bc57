use tracing::{debug, trace};

use crate::algorithm::{Algorithm, AlgorithmKind, check_width};
use crate::alu;
use crate::bits::{BitString, decode, encode_signed};
use crate::error::SimError;
use crate::step::{Operation, Register, RegisterFile, Step};

/// Booth's radix-2 signed multiplication.
///
/// State:
/// - `AC`: accumulator, starts at 0
/// - `MQ`: multiplier (two's complement)
/// - `M`: multiplicand (two's complement)
/// - `Q₋₁`: the bit shifted out of MQ on the previous iteration, starts at 0
///
/// The pair `(MQ₀, Q₋₁)` selects the action: `10` subtracts M, `01` adds M,
/// `00` and `11` leave AC alone. AC:MQ:Q₋₁ is then shifted right
/// arithmetically. AC is `bits` wide, so subtracting M wraps when the
/// multiplicand is `-2^(bits-1)`.
pub struct Booth;

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

impl Algorithm for Booth {
    const KIND: AlgorithmKind = AlgorithmKind::BoothMultiplication;

    fn simulate(multiplicand: i64, multiplier: i64, bits: usize) -> Result<Vec<Step>, SimError> {
        check_width(bits)?;
        debug!(multiplicand, multiplier, bits, "booth multiplication");

        let mut regs = Registers {
            ac: BitString::zeros(bits),
            mq: encode_signed(multiplier, bits)?,
            m: encode_signed(multiplicand, bits)?,
            q_minus_1: false,
            count: bits,
        };

        let mut steps = vec![Step::new(
            format!(
                "Initialize: AC = 0, MQ = {multiplier}, M = {multiplicand}, Q₋₁ = 0, Count = {bits}"
            ),
            regs.snapshot(),
            &[Register::Ac, Register::Mq, Register::M],
            Operation::Init,
        )];

        while regs.count > 0 {
            let mq0 = regs.mq.lsb();
            let pair = format!("{}{}", bit_char(mq0), bit_char(regs.q_minus_1));

            match (mq0, regs.q_minus_1) {
                (true, false) => {
                    regs.ac = alu::subtract(&regs.ac, &regs.m);
                    steps.push(Step::new(
                        "(MQ₀, Q₋₁) = (1,0): Subtract M from AC",
                        regs.snapshot().with(Register::BitPair, &pair),
                        &[Register::Ac],
                        Operation::Subtract,
                    ));
                }
                (false, true) => {
                    regs.ac = alu::add(&regs.ac, &regs.m);
                    steps.push(Step::new(
                        "(MQ₀, Q₋₁) = (0,1): Add M to AC",
                        regs.snapshot().with(Register::BitPair, &pair),
                        &[Register::Ac],
                        Operation::Add,
                    ));
                }
                _ => {
                    steps.push(Step::new(
                        format!("(MQ₀, Q₋₁) = ({pair}): No operation"),
                        regs.snapshot().with(Register::BitPair, &pair),
                        &[Register::Mq],
                        Operation::Booth,
                    ));
                }
            }

            regs.q_minus_1 = mq0;
            alu::shift_right_pair(&mut regs.ac, &mut regs.mq, true);
            trace!(count = regs.count, %pair, ac = %regs.ac, mq = %regs.mq, "shifted");
            steps.push(Step::new(
                "Arithmetic shift right AC, MQ, Q₋₁",
                regs.snapshot(),
                &[Register::Ac, Register::Mq, Register::QMinus1],
                Operation::Shift,
            ));

            regs.count -= 1;
        }

        let product = decode(&regs.ac.concat(&regs.mq), true);
        debug!(%product, "booth multiplication complete");
        steps.push(Step::new(
            format!("Complete: Product = {product} (AC:MQ = {}:{})", regs.ac, regs.mq),
            regs.snapshot(),
            &[Register::Ac, Register::Mq],
            Operation::Init,
        ));

        Ok(steps)
    }
}
