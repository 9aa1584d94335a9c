//! Transaction view consumed by the inspector.

use serde::Serialize;

/// One input as far as the inspector cares.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InputInfo {
    /// Spent amount in satoshis, when the previous output is known.
    pub amount: Option<u64>,
    /// Whether the input carries at least one signature.
    pub signed: bool,
}

/// One output as far as the inspector cares.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutputInfo {
    /// Destination address, `None` for scripts without one.
    pub address: Option<String>,
    /// Amount in satoshis.
    pub amount: u64,
}

/// Signing progress across all inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SignatureStatus {
    Unsigned,
    PartiallySigned,
    FullySigned,
}

impl SignatureStatus {
    /// Classify `signed` inputs out of `total`.
    #[must_use]
    pub const fn from_counts(signed: usize, total: usize) -> Self {
        if total == 0 || signed == 0 {
            Self::Unsigned
        } else if signed == total {
            Self::FullySigned
        } else {
            Self::PartiallySigned
        }
    }
}

impl std::fmt::Display for SignatureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unsigned => "Unsigned",
            Self::PartiallySigned => "PartiallySigned",
            Self::FullySigned => "FullySigned",
        })
    }
}

/// A transaction reduced to the fields the inspector formats.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParsedTransaction {
    /// Inputs in transaction order.
    pub inputs: Vec<InputInfo>,
    /// Outputs in transaction order.
    pub outputs: Vec<OutputInfo>,
}

impl ParsedTransaction {
    /// Construct from inputs and outputs.
    #[must_use]
    pub fn new(inputs: Vec<InputInfo>, outputs: Vec<OutputInfo>) -> Self { Self { inputs, outputs } }

    /// Sum of all input amounts, `None` if any is unknown.
    #[must_use]
    pub fn total_input(&self) -> Option<u64> {
        self.inputs
            .iter()
            .try_fold(0_u64, |acc, input| acc.checked_add(input.amount?))
    }

    /// Sum of all output amounts, saturating.
    #[must_use]
    pub fn total_output(&self) -> u64 {
        self.outputs
            .iter()
            .fold(0_u64, |acc, output| acc.saturating_add(output.amount))
    }

    /// Inputs minus outputs, `None` when unknown or negative.
    #[must_use]
    pub fn fee(&self) -> Option<u64> { self.total_input()?.checked_sub(self.total_output()) }

    /// Derived signing status.
    #[must_use]
    pub fn signature_status(&self) -> SignatureStatus {
        let signed = self.inputs.iter().filter(|input| input.signed).count();
        SignatureStatus::from_counts(signed, self.inputs.len())
    }

    /// Indices of inputs still lacking a signature.
    #[must_use]
    pub fn unsigned_inputs(&self) -> Vec<usize> {
        self.inputs
            .iter()
            .enumerate()
            .filter(|(_, input)| !input.signed)
            .map(|(index, _)| index)
            .collect()
    }
}
