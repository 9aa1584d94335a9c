//! The capture session task and its control handle.

use tokio::{runtime::Handle, select, sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{CaptureError, FrameEvent, FrameSource};
use crate::{
    fragment::FragmentCodec,
    reassembly::{
        Progress,
        ReassembledPayload,
        ReassemblyEngine,
        SessionId,
        SessionStatus,
    },
};

/// Snapshot published after every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureStatus {
    /// Session being captured.
    pub session: SessionId,
    /// Fragments collected and estimated total.
    pub progress: Progress,
    /// Lifecycle position of the session.
    pub state: SessionStatus,
    /// Frames delivered by the source, readable or not.
    pub frames: u64,
}

/// What a session had collected when it ended without a payload.
///
/// Callers can persist the fragments and feed them to a fresh engine
/// later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureReport {
    /// Session that ended.
    pub session: SessionId,
    /// Lifecycle position of the session when it ended.
    pub state: SessionStatus,
    /// Fragments collected and estimated total.
    pub progress: Progress,
    /// Collected fragments in arrival order.
    pub fragments: Vec<String>,
}

impl CaptureReport {
    fn of<C: FragmentCodec>(engine: &ReassemblyEngine<C>) -> Self {
        Self {
            session: engine.session_id(),
            state: engine.status(),
            progress: engine.progress(),
            fragments: engine.fragments().to_vec(),
        }
    }
}

/// How a capture session ended without error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The payload was recovered.
    Complete(ReassembledPayload),
    /// The source closed first.
    Exhausted(CaptureReport),
    /// The session was stopped or shut down first.
    Cancelled(CaptureReport),
}

impl CaptureOutcome {
    /// Collected state of a session that ended without its payload.
    #[must_use]
    pub const fn report(&self) -> Option<&CaptureReport> {
        match self {
            Self::Complete(_) => None,
            Self::Exhausted(report) | Self::Cancelled(report) => Some(report),
        }
    }
}

/// Spawns capture sessions.
pub struct CaptureSession;

impl CaptureSession {
    /// Start a fresh session on `engine`, fed by `source`.
    ///
    /// Cancelling `shutdown` ends the session with
    /// [`CaptureOutcome::Cancelled`], as does [`CaptureHandle::stop`].
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::NoRuntime`] outside a Tokio runtime.
    pub fn spawn<C, S>(
        mut engine: ReassemblyEngine<C>,
        source: S,
        shutdown: &CancellationToken,
    ) -> Result<CaptureHandle, CaptureError>
    where
        C: FragmentCodec + Send + 'static,
        S: FrameSource + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| CaptureError::NoRuntime)?;
        engine.start();
        let (status_tx, status_rx) = watch::channel(CaptureStatus {
            session: engine.session_id(),
            progress: engine.progress(),
            state: engine.status(),
            frames: 0,
        });
        let token = shutdown.child_token();
        let task = runtime.spawn(run(engine, source, token.clone(), status_tx));
        Ok(CaptureHandle {
            token,
            status: status_rx,
            task,
        })
    }
}

async fn run<C, S>(
    mut engine: ReassemblyEngine<C>,
    mut source: S,
    token: CancellationToken,
    status: watch::Sender<CaptureStatus>,
) -> Result<CaptureOutcome, CaptureError>
where
    C: FragmentCodec,
    S: FrameSource,
{
    let session = engine.session_id();
    loop {
        let event = select! {
            biased;
            () = token.cancelled() => {
                info!(%session, progress = %engine.progress(), "capture cancelled");
                return Ok(CaptureOutcome::Cancelled(CaptureReport::of(&engine)));
            }
            event = source.next_frame() => event,
        };
        let Some(event) = event else {
            info!(%session, progress = %engine.progress(), "frame source closed");
            return Ok(CaptureOutcome::Exhausted(CaptureReport::of(&engine)));
        };
        if token.is_cancelled() {
            info!(%session, progress = %engine.progress(), "capture cancelled");
            return Ok(CaptureOutcome::Cancelled(CaptureReport::of(&engine)));
        }

        let result = match event {
            FrameEvent::Decoded(text) => engine.ingest(&text).map(Some),
            FrameEvent::Nothing => Ok(None),
        };
        status.send_modify(|current| {
            current.progress = engine.progress();
            current.state = engine.status();
            current.frames += 1;
        });

        match result {
            Ok(Some(outcome)) => debug!(%session, ?outcome, "frame ingested"),
            Ok(None) => {}
            Err(source) => {
                return Err(CaptureError::Reassembly {
                    source,
                    report: CaptureReport::of(&engine),
                });
            }
        }
        if let Some(payload) = engine.payload() {
            return Ok(CaptureOutcome::Complete(payload.clone()));
        }
    }
}

/// Control handle for a running capture session.
#[derive(Debug)]
pub struct CaptureHandle {
    token: CancellationToken,
    status: watch::Receiver<CaptureStatus>,
    task: JoinHandle<Result<CaptureOutcome, CaptureError>>,
}

impl CaptureHandle {
    /// Receiver of per-frame status snapshots.
    #[must_use]
    pub fn status(&self) -> watch::Receiver<CaptureStatus> { self.status.clone() }

    /// Latest published progress.
    #[must_use]
    pub fn progress(&self) -> Progress { self.status.borrow().progress }

    /// Ask the session to end. Safe to call repeatedly.
    ///
    /// The task checks for cancellation before ingesting each frame, so a
    /// frame already pulled from the source when this is called is
    /// discarded. A frame whose ingestion is under way finishes first.
    pub fn stop(&self) { self.token.cancel(); }

    /// Whether [`stop`](Self::stop) or the shutdown token ended the
    /// session.
    #[must_use]
    pub fn is_stopped(&self) -> bool { self.token.is_cancelled() }

    /// Whether the session task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool { self.task.is_finished() }

    /// Wait for the session to end.
    ///
    /// A session ended by [`stop`](Self::stop) reports
    /// [`CaptureOutcome::Cancelled`] with everything it collected.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Reassembly`] for a terminal reassembly error
    /// and [`CaptureError::Task`] if the task panicked or its runtime shut
    /// down.
    pub async fn join(self) -> Result<CaptureOutcome, CaptureError> {
        self.task
            .await
            .map_err(|err| CaptureError::Task(err.to_string()))?
    }
}
