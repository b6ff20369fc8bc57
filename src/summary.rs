use serde::Serialize;

use crate::algorithm::AlgorithmKind;
use crate::bits::{BitString, decode};
use crate::step::{Register, Step};

/// The result panel of a finished run, read back out of the trace's last
/// step.
///
/// Division reports `QR:AC` as the binary form with quotient and remainder;
/// multiplication reports `AC:MQ` and its decimal value (signed for the
/// Booth variants).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub binary: String,
    pub decimal: i128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quotient: Option<i128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remainder: Option<i128>,
}

impl Outcome {
    /// Extract the outcome from a trace produced by `kind`.
    ///
    /// Returns `None` if the trace is empty or its last step lacks the
    /// registers `kind` reports through.
    pub fn from_steps(kind: AlgorithmKind, steps: &[Step]) -> Option<Self> {
        let last = &steps.last()?.registers;
        let register = |reg: Register| last.get(reg)?.parse::<BitString>().ok();
        let ac = register(Register::Ac)?;

        if kind.is_division() {
            let qr = register(Register::Qr)?;
            Some(Outcome {
                binary: format!("{qr}:{ac}"),
                decimal: 0,
                quotient: Some(decode(&qr, false)),
                remainder: Some(decode(&ac, false)),
            })
        } else {
            let mq = register(Register::Mq)?;
            let product = ac.concat(&mq);
            Some(Outcome {
                binary: product.to_string(),
                decimal: decode(&product, kind.is_signed()),
                quotient: None,
                remainder: None,
            })
        }
    }

    /// Pretty-printed JSON, the payload of an exported result file.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
