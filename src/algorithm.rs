use clap::ValueEnum;
use serde::Serialize;

use crate::booth::Booth;
use crate::error::SimError;
use crate::fast_booth::FastBooth;
use crate::non_restoring::NonRestoringDivision;
use crate::restoring::RestoringDivision;
use crate::shift_add::ShiftAdd;
use crate::step::Step;

/// Register width used when the caller has no preference.
pub const DEFAULT_BITS: usize = 8;

/// Widest register a simulator accepts. AC:MQ is twice this wide and still
/// decodes into an `i128` without loss.
pub const MAX_WIDTH: usize = 32;

/// An arithmetic algorithm that can be replayed step by step.
///
/// Each simulator implements this trait. Callers that know the algorithm at
/// compile time can be generic over `Algorithm`; callers that pick it at run
/// time go through [`AlgorithmKind::simulate`].
pub trait Algorithm {
    const KIND: AlgorithmKind;

    /// Run the algorithm to completion on `bits`-wide registers.
    ///
    /// The returned trace is never empty: it opens with an `Init` step and
    /// closes with a summary step whose description carries the decoded
    /// result.
    fn simulate(operand1: i64, operand2: i64, bits: usize) -> Result<Vec<Step>, SimError>;
}

/// The algorithm catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmKind {
    RestoringDivision,
    NonRestoringDivision,
    ShiftAddMultiplication,
    BoothMultiplication,
    FastBoothMultiplication,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 5] = [
        AlgorithmKind::RestoringDivision,
        AlgorithmKind::NonRestoringDivision,
        AlgorithmKind::ShiftAddMultiplication,
        AlgorithmKind::BoothMultiplication,
        AlgorithmKind::FastBoothMultiplication,
    ];

    pub fn simulate(self, operand1: i64, operand2: i64, bits: usize) -> Result<Vec<Step>, SimError> {
        match self {
            AlgorithmKind::RestoringDivision => RestoringDivision::simulate(operand1, operand2, bits),
            AlgorithmKind::NonRestoringDivision => {
                NonRestoringDivision::simulate(operand1, operand2, bits)
            }
            AlgorithmKind::ShiftAddMultiplication => ShiftAdd::simulate(operand1, operand2, bits),
            AlgorithmKind::BoothMultiplication => Booth::simulate(operand1, operand2, bits),
            AlgorithmKind::FastBoothMultiplication => FastBooth::simulate(operand1, operand2, bits),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::RestoringDivision => "Restoring Division",
            AlgorithmKind::NonRestoringDivision => "Non-Restoring Division",
            AlgorithmKind::ShiftAddMultiplication => "Unsigned Multiplication (Shift-and-Add)",
            AlgorithmKind::BoothMultiplication => "Booth's Algorithm (Signed)",
            AlgorithmKind::FastBoothMultiplication => "Fast Booth Recoding",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AlgorithmKind::RestoringDivision => {
                "Classic division that restores the accumulator when a trial subtraction goes negative."
            }
            AlgorithmKind::NonRestoringDivision => {
                "Division that skips restoration by alternating between addition and subtraction on the sign of AC."
            }
            AlgorithmKind::ShiftAddMultiplication => {
                "Adds the multiplicand whenever the multiplier bit is 1, then shifts right."
            }
            AlgorithmKind::BoothMultiplication => {
                "Signed multiplication driven by the bit pair (MQ₀, Q₋₁), handling negative operands."
            }
            AlgorithmKind::FastBoothMultiplication => {
                "Radix-4 Booth recoding: two multiplier bits per iteration, half the iterations."
            }
        }
    }

    /// Labels for `(operand1, operand2)`.
    pub fn operand_labels(self) -> (&'static str, &'static str) {
        if self.is_division() {
            ("Dividend", "Divisor")
        } else {
            ("Multiplicand", "Multiplier")
        }
    }

    pub fn is_division(self) -> bool {
        matches!(
            self,
            AlgorithmKind::RestoringDivision | AlgorithmKind::NonRestoringDivision
        )
    }

    /// Whether the final AC:MQ is read as a two's-complement number.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            AlgorithmKind::BoothMultiplication | AlgorithmKind::FastBoothMultiplication
        )
    }
}

/// Reject widths no simulator can run with.
pub(crate) fn check_width(bits: usize) -> Result<(), SimError> {
    if bits == 0 || bits > MAX_WIDTH {
        return Err(SimError::UnsupportedWidth { bits });
    }
    Ok(())
}
