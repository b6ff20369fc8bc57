use thiserror::Error;

/// Everything that can stop a simulation before it produces a trace.
///
/// Arithmetic overflow inside a register is not in this list: adds and
/// subtracts wrap modulo `2^width` exactly like a fixed-width hardware
/// register would.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// A division simulator was handed a zero divisor. Raised before any
    /// register is initialized.
    #[error("division by zero is undefined")]
    DivisionByZero,

    /// The requested register width is zero or wider than [`crate::algorithm::MAX_WIDTH`].
    #[error("unsupported register width {bits} (expected 1..={max})", max = crate::algorithm::MAX_WIDTH)]
    UnsupportedWidth { bits: usize },

    /// Radix-4 recoding consumes two multiplier bits per iteration.
    #[error("fast Booth recoding needs an even register width, got {bits}")]
    OddWidth { bits: usize },

    /// An operand cannot be represented in a register of the requested width.
    #[error("{value} does not fit in a {bits}-bit {} register", signedness(.signed))]
    OperandOutOfRange { value: i128, bits: usize, signed: bool },

    /// A bit string contained something other than `0` or `1`.
    #[error("invalid bit character {0:?}")]
    InvalidBit(char),
}

fn signedness(signed: &bool) -> &'static str {
    if *signed { "signed" } else { "unsigned" }
}
