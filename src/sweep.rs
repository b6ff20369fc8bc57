use std::fmt;

use rayon::prelude::*;

use crate::algorithm::{AlgorithmKind, check_width};
use crate::error::SimError;
use crate::summary::Outcome;

/// Most operand values tried per axis. Wider axes are sampled with an even
/// stride that keeps both endpoints.
pub const SWEEP_LIMIT: usize = 256;

/// What a run should have produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Product(i128),
    Division { quotient: i128, remainder: i128 },
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Product(p) => write!(f, "{p}"),
            Answer::Division { quotient, remainder } => write!(f, "q={quotient} r={remainder}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub operand1: i64,
    pub operand2: i64,
    pub expected: Answer,
    pub actual: Result<Answer, SimError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub kind: AlgorithmKind,
    pub bits: usize,
    pub checked: usize,
    pub mismatches: Vec<Mismatch>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// The operand ranges over which `kind` is exact at `bits` wide registers.
///
/// Outside these ranges the registers wrap; see each simulator's docs.
pub fn domain(kind: AlgorithmKind, bits: usize) -> ((i64, i64), (i64, i64)) {
    let full = (1i64 << bits) - 1;
    let half = 1i64 << (bits - 1);
    let quarter = half / 2;
    match kind {
        AlgorithmKind::RestoringDivision | AlgorithmKind::NonRestoringDivision => {
            ((0, full), (1, half))
        }
        AlgorithmKind::ShiftAddMultiplication => ((0, half), (0, full)),
        AlgorithmKind::BoothMultiplication => ((-half + 1, half - 1), (-half, half - 1)),
        AlgorithmKind::FastBoothMultiplication => ((-quarter + 1, quarter), (-half, half - 1)),
    }
}

/// Native-arithmetic reference for one operand pair.
pub fn expected(kind: AlgorithmKind, operand1: i64, operand2: i64) -> Answer {
    let (a, b) = (operand1 as i128, operand2 as i128);
    if kind.is_division() {
        let (a, b) = (a.abs(), b.abs());
        Answer::Division {
            quotient: a / b,
            remainder: a % b,
        }
    } else if kind.is_signed() {
        Answer::Product(a * b)
    } else {
        Answer::Product(a.abs() * b.abs())
    }
}

fn actual(kind: AlgorithmKind, operand1: i64, operand2: i64, bits: usize) -> Result<Answer, SimError> {
    let steps = kind.simulate(operand1, operand2, bits)?;
    let outcome = Outcome::from_steps(kind, &steps)
        .expect("every simulator ends on a step carrying its result registers");
    Ok(match (outcome.quotient, outcome.remainder) {
        (Some(quotient), Some(remainder)) => Answer::Division { quotient, remainder },
        _ => Answer::Product(outcome.decimal),
    })
}

/// Evenly spaced values from `lo` to `hi` inclusive, at most `SWEEP_LIMIT`.
fn axis((lo, hi): (i64, i64)) -> Vec<i64> {
    let len = (hi - lo + 1) as usize;
    let stride = len.div_ceil(SWEEP_LIMIT).max(1);
    let mut values: Vec<i64> = (lo..=hi).step_by(stride).collect();
    if values.last() != Some(&hi) {
        values.push(hi);
    }
    values
}

/// Run `kind` over its exact domain at `bits` and compare every result with
/// native arithmetic. Runs are independent and spread over the rayon pool.
pub fn sweep(kind: AlgorithmKind, bits: usize) -> Result<SweepReport, SimError> {
    check_width(bits)?;
    if kind == AlgorithmKind::FastBoothMultiplication && bits % 2 != 0 {
        return Err(SimError::OddWidth { bits });
    }

    let (first, second) = domain(kind, bits);
    let first = axis(first);
    let second = axis(second);
    tracing::info!(?kind, bits, pairs = first.len() * second.len(), "sweeping");

    let mut mismatches: Vec<Mismatch> = first
        .par_iter()
        .flat_map_iter(|&operand1| {
            second.iter().filter_map(move |&operand2| {
                let expected = expected(kind, operand1, operand2);
                let actual = actual(kind, operand1, operand2, bits);
                (actual != Ok(expected)).then_some(Mismatch {
                    operand1,
                    operand2,
                    expected,
                    actual,
                })
            })
        })
        .collect();
    mismatches.sort_by_key(|m| (m.operand1, m.operand2));

    Ok(SweepReport {
        kind,
        bits,
        checked: first.len() * second.len(),
        mismatches,
    })
}
