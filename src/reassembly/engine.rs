//! The reassembly engine: fragment deduplication, completion detection and
//! session lifecycle.

use log::{debug, info, warn};

use super::{
    DropReason,
    IngestOutcome,
    Progress,
    ReassembledPayload,
    ReassemblyError,
    ReassemblyState,
    SessionId,
    SessionStatus,
};
use crate::{
    config::CaptureConfig,
    fragment::{FragmentCodec, JoinError, Joined},
    metrics::{self, Disposition},
};

/// Collects fragments for one capture session at a time.
///
/// Ingestion never blocks and never fails on recoverable input: duplicates,
/// out-of-order parts and corrupt reads are reported through
/// [`IngestOutcome`]. A rejected read only ever evicts the fragment the
/// codec blames, so one bad frame cannot stall a session. Completion is idempotent; after a session finishes
/// every further fragment yields [`IngestOutcome::Closed`] until
/// [`reset`](Self::reset) or [`start`](Self::start).
///
/// # Examples
///
/// ```
/// use bbqrflow::{fragment::BbqrCodec, reassembly::ReassemblyEngine};
///
/// let mut engine = ReassemblyEngine::new(BbqrCodec);
/// let outcome = engine.ingest("B$HU0100616263").expect("ingest");
/// assert!(outcome.is_complete());
/// assert_eq!(engine.payload().map(|p| p.data().to_vec()), Some(b"abc".to_vec()));
/// ```
#[derive(Debug)]
pub struct ReassemblyEngine<C> {
    codec: C,
    config: CaptureConfig,
    state: ReassemblyState,
    next_session: u64,
}

impl<C: FragmentCodec> ReassemblyEngine<C> {
    /// Create an engine accepting any payload type.
    #[must_use]
    pub fn new(codec: C) -> Self { Self::with_config(codec, CaptureConfig::default()) }

    /// Create an engine applying `config` to each session.
    #[must_use]
    pub fn with_config(codec: C, config: CaptureConfig) -> Self {
        Self {
            codec,
            config,
            state: ReassemblyState::new(SessionId::new(0)),
            next_session: 1,
        }
    }

    /// Begin a fresh capture session, discarding any previous one.
    pub fn start(&mut self) {
        self.begin();
        info!("capture session {} started", self.state.id());
    }

    /// Discard all collected fragments and clear any completed payload.
    pub fn reset(&mut self) {
        let previous = self.state.id();
        self.begin();
        debug!(
            "capture session {previous} reset; now session {}",
            self.state.id()
        );
    }

    fn begin(&mut self) {
        self.state = ReassemblyState::new(SessionId::new(self.next_session));
        self.next_session += 1;
    }

    /// Feed one decoded fragment into the current session.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::TypeMismatch`] when the completed payload
    /// does not carry the configured type. The session is then `Failed`
    /// and keeps its fragments for diagnostics.
    pub fn ingest(&mut self, fragment: &str) -> Result<IngestOutcome, ReassemblyError> {
        if self.state.is_terminal() {
            debug!(
                "capture session {} is {:?}; ignoring fragment",
                self.state.id(),
                self.state.status()
            );
            return Ok(IngestOutcome::Closed);
        }
        if fragment.is_empty() {
            metrics::inc_fragments(Disposition::Dropped);
            return Ok(IngestOutcome::Dropped {
                progress: self.progress(),
                reason: DropReason::Blank,
            });
        }
        if self.state.contains(fragment) {
            metrics::inc_fragments(Disposition::Duplicate);
            return Ok(IngestOutcome::Duplicate(self.progress()));
        }

        self.state.push(fragment);
        let mut rejection = None;
        loop {
            match self.codec.reassemble(self.state.fragments()) {
                Ok(joined) => {
                    metrics::inc_fragments(Disposition::Accepted);
                    return self.complete(joined);
                }
                Err(err) if err.is_incomplete() => {
                    self.estimate_total(err.expected_total());
                    break;
                }
                Err(err) => {
                    let Some(evicted) = self.evict(&err) else {
                        rejection = rejection.or(Some(err));
                        break;
                    };
                    if evicted == fragment {
                        rejection = rejection.or(Some(err));
                    }
                    if self.state.fragments().is_empty() {
                        break;
                    }
                }
            }
        }

        let progress = self.progress();
        if self.state.contains(fragment) {
            metrics::inc_fragments(Disposition::Accepted);
            debug!(
                "capture session {} collected fragment ({progress})",
                self.state.id()
            );
            return Ok(IngestOutcome::Accepted(progress));
        }
        metrics::inc_fragments(Disposition::Dropped);
        let reason = rejection.unwrap_or(JoinError::Empty);
        warn!(
            "capture session {} dropped fragment: {reason}",
            self.state.id()
        );
        Ok(IngestOutcome::Dropped {
            progress,
            reason: DropReason::Corrupt(reason),
        })
    }

    /// Remove the fragment `err` blames, returning its text.
    ///
    /// Conflicts evict the earlier claimant so a re-read replaces a bad
    /// read. Fragments of another series wait on standby and take over once
    /// they outnumber the fragments being collected. Anything else blames
    /// the newest fragment.
    fn evict(&mut self, err: &JoinError) -> Option<String> {
        let position = match *err {
            JoinError::Header { position, .. } | JoinError::Body { position, .. } => position,
            JoinError::Conflict { existing, .. } => existing,
            JoinError::Inconsistent { position, .. } => return self.divert(position),
            _ => self.state.fragments().len().checked_sub(1)?,
        };
        let evicted = self.state.remove(position)?;
        debug!(
            "capture session {} evicted fragment at {position}: {err}",
            self.state.id()
        );
        Some(evicted)
    }

    fn divert(&mut self, position: usize) -> Option<String> {
        let rival = self.state.remove(position)?;
        let Some(key) = self.codec.series_key(&rival) else {
            return Some(rival);
        };
        let waiting = self.state.stash(key, rival.clone());
        if waiting > self.state.fragments().len() {
            info!(
                "capture session {} switching to a series seen {waiting} times",
                self.state.id()
            );
            let current = self
                .state
                .fragments()
                .first()
                .and_then(|lead| self.codec.series_key(lead));
            self.state.promote_standby(current);
        }
        Some(rival)
    }

    fn estimate_total(&mut self, reported: Option<usize>) {
        if let Some(total) = reported {
            self.state.set_total(total);
        } else if self.state.total().is_none()
            && let Some(first) = self.state.fragments().first()
            && let Some(total) = self.codec.expected_total(first)
        {
            self.state.set_total(total);
        }
    }

    fn complete(&mut self, joined: Joined) -> Result<IngestOutcome, ReassemblyError> {
        let found = joined.file_type();
        if let Some(expected) = self.config.expected_type()
            && expected != found
        {
            self.state.fail();
            metrics::inc_sessions_failed();
            warn!(
                "capture session {} completed with {found:?}, expected {expected:?}",
                self.state.id()
            );
            return Err(ReassemblyError::TypeMismatch { expected, found });
        }

        let payload = ReassembledPayload::new(found, joined.into_payload());
        info!(
            "capture session {} complete: {} bytes of {}",
            self.state.id(),
            payload.len(),
            found.label()
        );
        self.state.complete(payload);
        metrics::inc_sessions_completed();
        Ok(IngestOutcome::Complete(self.progress()))
    }

    /// Fragments collected so far and the estimated total.
    #[must_use]
    pub fn progress(&self) -> Progress { self.state.progress() }

    /// Whether the current session recovered its payload.
    #[must_use]
    pub fn is_complete(&self) -> bool { self.state.status() == SessionStatus::Complete }

    /// Lifecycle position of the current session.
    #[must_use]
    pub fn status(&self) -> SessionStatus { self.state.status() }

    /// Payload of the current session, once complete.
    #[must_use]
    pub fn payload(&self) -> Option<&ReassembledPayload> { self.state.payload() }

    /// Fragments of the current session in arrival order.
    #[must_use]
    pub fn fragments(&self) -> &[String] { self.state.fragments() }

    /// Identifier of the current session.
    #[must_use]
    pub fn session_id(&self) -> SessionId { self.state.id() }

    /// Borrow the current session state.
    #[must_use]
    pub fn state(&self) -> &ReassemblyState { &self.state }

    /// Configuration applied to each session.
    #[must_use]
    pub const fn config(&self) -> &CaptureConfig { &self.config }
}
