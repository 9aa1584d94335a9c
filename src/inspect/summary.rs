//! Display summary derived from a [`ParsedTransaction`].

use serde::Serialize;

use super::{ParsedTransaction, SignatureStatus, format_btc};

/// Guessed purpose of an output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum OutputRole {
    /// Paid to someone else.
    Recipient,
    /// Returned to the sender; the last output of a multi-output
    /// transaction.
    Change,
}

/// Overall layout of the outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TransactionShape {
    /// Zero or one output, e.g. a sweep.
    SingleOutput,
    /// A recipient plus change.
    Payment,
    /// Several recipients plus change.
    MultiOutput,
}

impl TransactionShape {
    fn from_output_count(count: usize) -> Self {
        match count {
            0 | 1 => Self::SingleOutput,
            2 => Self::Payment,
            _ => Self::MultiOutput,
        }
    }
}

/// One formatted output line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutputSummary {
    /// Destination address, `None` for scripts without one.
    pub address: Option<String>,
    /// Amount in satoshis.
    pub amount: u64,
    /// Amount rendered by [`format_btc`].
    pub amount_formatted: String,
    /// Recipient or change.
    pub role: OutputRole,
}

/// Everything a user needs to review before signing or broadcasting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    pub status: SignatureStatus,
    pub shape: TransactionShape,
    pub outputs: Vec<OutputSummary>,
    /// `None` when an input amount is unknown.
    pub fee_formatted: Option<String>,
    /// Outputs plus fee; `None` when the fee is unknown.
    pub total_formatted: Option<String>,
    /// `None` when an input amount is unknown.
    pub total_input_formatted: Option<String>,
    pub input_count: usize,
    pub unsigned_inputs: Vec<usize>,
}

/// Build the display summary for `tx`.
#[must_use]
pub fn summarize(tx: &ParsedTransaction) -> TransactionSummary {
    let last = tx.outputs.len().saturating_sub(1);
    let multi = tx.outputs.len() > 1;
    let outputs = tx
        .outputs
        .iter()
        .enumerate()
        .map(|(index, output)| OutputSummary {
            address: output.address.clone(),
            amount: output.amount,
            amount_formatted: format_btc(output.amount),
            role: if multi && index == last {
                OutputRole::Change
            } else {
                OutputRole::Recipient
            },
        })
        .collect();

    let fee = tx.fee();
    TransactionSummary {
        status: tx.signature_status(),
        shape: TransactionShape::from_output_count(tx.outputs.len()),
        outputs,
        fee_formatted: fee.map(format_btc),
        total_formatted: fee.map(|fee| format_btc(tx.total_output().saturating_add(fee))),
        total_input_formatted: tx.total_input().map(format_btc),
        input_count: tx.inputs.len(),
        unsigned_inputs: tx.unsigned_inputs(),
    }
}

/// Whether every input is signed.
#[must_use]
pub fn can_finalize(tx: &ParsedTransaction) -> bool {
    tx.signature_status() == SignatureStatus::FullySigned
}
