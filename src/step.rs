use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// What a step did to the registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Init,
    Add,
    Subtract,
    Shift,
    /// A Booth decision that left AC untouched.
    Booth,
    Restore,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Init,
        Operation::Add,
        Operation::Subtract,
        Operation::Shift,
        Operation::Booth,
        Operation::Restore,
    ];

    /// Position in [`Operation::ALL`]; used as a histogram bucket.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Shift => "shift",
            Operation::Booth => "booth",
            Operation::Restore => "restore",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every register or decision display a step can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Accumulator.
    Ac,
    /// Multiplier register (multiplication).
    Mq,
    /// Quotient register (division).
    Qr,
    /// Multiplicand or divisor.
    M,
    /// Booth's extra bit to the right of MQ.
    QMinus1,
    Count,
    /// MQ's LSB as inspected by shift-add.
    Mq0,
    /// `(MQ₀, Q₋₁)` as inspected by Booth.
    BitPair,
    /// `(MQ₁, MQ₀, Q₋₁)` as inspected by fast Booth.
    Group,
    NegM,
    TwoM,
}

impl Register {
    pub fn name(self) -> &'static str {
        match self {
            Register::Ac => "AC",
            Register::Mq => "MQ",
            Register::Qr => "QR",
            Register::M => "M",
            Register::QMinus1 => "Q₋₁",
            Register::Count => "Count",
            Register::Mq0 => "MQ0",
            Register::BitPair => "Bit Pair",
            Register::Group => "Group",
            Register::NegM => "-M",
            Register::TwoM => "2M",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Register {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Display values of the registers at one step, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFile {
    entries: Vec<(Register, String)>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`RegisterFile::set`].
    pub fn with(mut self, reg: Register, value: impl ToString) -> Self {
        self.set(reg, value);
        self
    }

    /// Set `reg`, replacing an earlier value in place.
    pub fn set(&mut self, reg: Register, value: impl ToString) {
        let value = value.to_string();
        match self.entries.iter_mut().find(|(r, _)| *r == reg) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((reg, value)),
        }
    }

    pub fn get(&self, reg: Register) -> Option<&str> {
        self.entries
            .iter()
            .find(|(r, _)| *r == reg)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Register, &str)> {
        self.entries.iter().map(|(r, v)| (*r, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RegisterFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (reg, value) in &self.entries {
            map.serialize_entry(reg.name(), value)?;
        }
        map.end()
    }
}

/// One micro-operation of a simulation, frozen once it is pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub description: String,
    pub registers: RegisterFile,
    pub highlighted: Vec<Register>,
    pub operation: Operation,
}

impl Step {
    pub fn new(
        description: impl Into<String>,
        registers: RegisterFile,
        highlighted: &[Register],
        operation: Operation,
    ) -> Self {
        Self {
            description: description.into(),
            registers,
            highlighted: highlighted.to_vec(),
            operation,
        }
    }

    pub fn is_highlighted(&self, reg: Register) -> bool {
        self.highlighted.contains(&reg)
    }

    /// Human-readable register table, highlighted registers marked with `*`.
    pub fn render(&self) -> String {
        use std::fmt::Write;
        let mut out = String::new();
        let _ = writeln!(out, "[{}] {}", self.operation, self.description);
        for (reg, value) in self.registers.iter() {
            let mark = if self.is_highlighted(reg) { '*' } else { ' ' };
            let _ = writeln!(out, "  {mark} {:<8} {value}", reg.name());
        }
        out
    }
}
