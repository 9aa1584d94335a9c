//! Step machine for the air-gapped signing round trip.
//!
//! Import an unsigned PSBT, show it as animated codes, scan the signed PSBT
//! back, finalize, and hand over the broadcastable transaction.

use bitcoin::{Network, psbt::Psbt};
use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use crate::{
    fragment::{BbqrCodec, Encoding, FileType, FragmentCodec, Split, SplitError, SplitOptions},
    inspect::{TransactionSummary, summarize},
    psbt::{
        FinalizeError,
        FinalizedTransaction,
        PsbtError,
        decode_psbt_text,
        finalize_psbt,
        parse_psbt,
        psbt_view,
    },
    reassembly::ReassembledPayload,
};

/// Fewest parts the signing round trip animates.
pub const WORKFLOW_MIN_SPLIT: u16 = 3;
/// Most parts the signing round trip animates.
pub const WORKFLOW_MAX_SPLIT: u16 = 50;

/// Position in the signing round trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Step {
    Import,
    ShowCodes,
    ScanSigned,
    Finalize,
    Ready,
}

impl Step {
    /// Every step in order.
    pub const ALL: [Step; 5] = [
        Step::Import,
        Step::ShowCodes,
        Step::ScanSigned,
        Step::Finalize,
        Step::Ready,
    ];

    /// One-based position of the step.
    #[must_use]
    pub const fn number(self) -> usize {
        match self {
            Step::Import => 1,
            Step::ShowCodes => 2,
            Step::ScanSigned => 3,
            Step::Finalize => 4,
            Step::Ready => 5,
        }
    }

    /// Short description for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Step::Import => "import unsigned PSBT",
            Step::ShowCodes => "show codes to signer",
            Step::ScanSigned => "scan signed PSBT",
            Step::Finalize => "finalize",
            Step::Ready => "ready to broadcast",
        }
    }
}

/// "n of 5" position indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub current: usize,
    pub total: usize,
}

impl std::fmt::Display for StepProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {}", self.current, self.total)
    }
}

/// Errors raised by [`SigningWorkflow`] operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The operation belongs to another step.
    #[error("operation requires step {expected:?}, workflow is at {actual:?}")]
    WrongStep { expected: Step, actual: Step },
    /// No unsigned PSBT has been imported.
    #[error("no PSBT imported")]
    NothingImported,
    /// The scanned payload is not a PSBT.
    #[error("scanned payload is {0:?}, expected a PSBT")]
    NotPsbt(FileType),
    #[error(transparent)]
    Psbt(#[from] PsbtError),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Finalize(#[from] FinalizeError),
}

/// Drives the import → show → scan → finalize → ready round trip.
///
/// Every operation checks the current step first and leaves the workflow
/// untouched when it fails.
#[derive(Debug)]
pub struct SigningWorkflow<C = BbqrCodec> {
    codec: C,
    network: Network,
    step: Step,
    unsigned: Option<Psbt>,
    codes: Option<Split>,
    signed: Option<Psbt>,
    finalized: Option<FinalizedTransaction>,
}

impl SigningWorkflow<BbqrCodec> {
    /// Workflow using the BBQr codec.
    #[must_use]
    pub fn new(network: Network) -> Self { Self::with_codec(BbqrCodec, network) }
}

impl<C: FragmentCodec> SigningWorkflow<C> {
    /// Workflow splitting codes with `codec`.
    #[must_use]
    pub fn with_codec(codec: C, network: Network) -> Self {
        Self {
            codec,
            network,
            step: Step::Import,
            unsigned: None,
            codes: None,
            signed: None,
            finalized: None,
        }
    }

    fn expect_step(&self, expected: Step) -> Result<(), WorkflowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WorkflowError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    fn summary_of(&self, psbt: &Psbt) -> TransactionSummary { summarize(&psbt_view(psbt, self.network)) }

    /// Import an unsigned PSBT given as binary.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::WrongStep`] outside [`Step::Import`] and
    /// [`WorkflowError::Psbt`] for invalid data.
    pub fn import(&mut self, bytes: &[u8]) -> Result<TransactionSummary, WorkflowError> {
        self.expect_step(Step::Import)?;
        let psbt = parse_psbt(bytes)?;
        let summary = self.summary_of(&psbt);
        self.unsigned = Some(psbt);
        self.codes = None;
        info!("imported PSBT: {} outputs, {}", summary.outputs.len(), summary.status);
        Ok(summary)
    }

    /// Import an unsigned PSBT given as base64 or hex text.
    ///
    /// # Errors
    ///
    /// As [`import`](Self::import), plus text decoding failures.
    pub fn import_text(&mut self, text: &str) -> Result<TransactionSummary, WorkflowError> {
        self.expect_step(Step::Import)?;
        let bytes = decode_psbt_text(text)?;
        self.import(&bytes)
    }

    /// Split the imported PSBT into codes and move to
    /// [`Step::ShowCodes`].
    ///
    /// Payloads too small for [`WORKFLOW_MIN_SPLIT`] parts are shown in
    /// fewer.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NothingImported`] before an import and
    /// [`WorkflowError::Split`] when the PSBT does not fit.
    pub fn generate_codes(&mut self) -> Result<&Split, WorkflowError> {
        self.expect_step(Step::Import)?;
        let bytes = self
            .unsigned
            .as_ref()
            .ok_or(WorkflowError::NothingImported)?
            .serialize();
        let options = SplitOptions::default()
            .with_encoding(Encoding::Zlib)
            .with_split_range(WORKFLOW_MIN_SPLIT, WORKFLOW_MAX_SPLIT);
        let split = match self.codec.split(&bytes, FileType::Psbt, &options) {
            Err(SplitError::NoFit { .. }) => {
                debug!("PSBT too small for {WORKFLOW_MIN_SPLIT} parts; allowing fewer");
                self.codec
                    .split(&bytes, FileType::Psbt, &options.with_split_range(1, WORKFLOW_MAX_SPLIT))?
            }
            other => other?,
        };
        info!("generated {} codes at version {}", split.len(), split.version());
        self.step = Step::ShowCodes;
        Ok(self.codes.insert(split))
    }

    /// Move from [`Step::ShowCodes`] to [`Step::ScanSigned`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::WrongStep`] from any other step.
    pub fn begin_scan(&mut self) -> Result<(), WorkflowError> {
        self.expect_step(Step::ShowCodes)?;
        self.step = Step::ScanSigned;
        Ok(())
    }

    /// Jump straight to scanning when the signer already holds the PSBT.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::WrongStep`] once scanning has begun.
    pub fn skip_to_scan(&mut self) -> Result<(), WorkflowError> {
        match self.step {
            Step::Import | Step::ShowCodes => {
                self.step = Step::ScanSigned;
                Ok(())
            }
            actual => Err(WorkflowError::WrongStep {
                expected: Step::Import,
                actual,
            }),
        }
    }

    /// Accept the reassembled signed PSBT and move to
    /// [`Step::Finalize`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotPsbt`] for other payload types and
    /// [`WorkflowError::Psbt`] for invalid data.
    pub fn accept_signed(
        &mut self,
        payload: &ReassembledPayload,
    ) -> Result<TransactionSummary, WorkflowError> {
        self.expect_step(Step::ScanSigned)?;
        if payload.file_type() != FileType::Psbt {
            return Err(WorkflowError::NotPsbt(payload.file_type()));
        }
        let psbt = parse_psbt(payload.data())?;
        let summary = self.summary_of(&psbt);
        self.signed = Some(psbt);
        self.step = Step::Finalize;
        info!("accepted signed PSBT: {}", summary.status);
        Ok(summary)
    }

    /// Finalize the signed PSBT and move to [`Step::Ready`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Finalize`] when inputs lack signatures or
    /// use unsupported scripts; the workflow stays at
    /// [`Step::Finalize`].
    pub fn finalize(&mut self) -> Result<&FinalizedTransaction, WorkflowError> {
        self.expect_step(Step::Finalize)?;
        let signed = self.signed.clone().ok_or(WorkflowError::WrongStep {
            expected: Step::ScanSigned,
            actual: self.step,
        })?;
        let finalized = finalize_psbt(signed)?;
        self.step = Step::Ready;
        Ok(self.finalized.insert(finalized))
    }

    /// Return to the previous step, discarding that step's result.
    pub fn back(&mut self) {
        self.step = match self.step {
            Step::Import | Step::ShowCodes => {
                self.codes = None;
                Step::Import
            }
            Step::ScanSigned if self.codes.is_some() => Step::ShowCodes,
            Step::ScanSigned => Step::Import,
            Step::Finalize => {
                self.signed = None;
                Step::ScanSigned
            }
            Step::Ready => {
                self.finalized = None;
                Step::Finalize
            }
        };
        debug!("workflow back to {:?}", self.step);
    }

    /// Discard everything and return to [`Step::Import`].
    pub fn restart(&mut self) {
        self.step = Step::Import;
        self.unsigned = None;
        self.codes = None;
        self.signed = None;
        self.finalized = None;
        debug!("workflow restarted");
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> Step { self.step }

    /// "n of 5" indicator for the current step.
    #[must_use]
    pub const fn progress(&self) -> StepProgress {
        StepProgress {
            current: self.step.number(),
            total: Step::ALL.len(),
        }
    }

    /// Codes generated for the unsigned PSBT.
    #[must_use]
    pub fn codes(&self) -> Option<&Split> { self.codes.as_ref() }

    /// Imported unsigned PSBT.
    #[must_use]
    pub fn unsigned(&self) -> Option<&Psbt> { self.unsigned.as_ref() }

    /// Scanned signed PSBT.
    #[must_use]
    pub fn signed(&self) -> Option<&Psbt> { self.signed.as_ref() }

    /// Finalized transaction, once ready.
    #[must_use]
    pub fn finalized(&self) -> Option<&FinalizedTransaction> { self.finalized.as_ref() }
}
