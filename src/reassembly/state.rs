//! Session state owned by the reassembly engine.

use std::collections::HashSet;

use derive_more::{Display, From};

use super::{Progress, ReassembledPayload};

/// Identifier of one capture session, unique per engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, From)]
#[display("{_0}")]
pub struct SessionId(u64);

impl SessionId {
    /// Create a new identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self { Self(value) }

    /// Return the inner numeric identifier.
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

/// Lifecycle position of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// Accepting fragments.
    Collecting,
    /// Payload recovered; immutable until reset.
    Complete,
    /// Ended by a terminal error; immutable until reset.
    Failed,
}

/// Fragments of a series other than the one being collected.
#[derive(Debug, Default)]
struct Standby {
    key: String,
    fragments: Vec<String>,
}

/// Fragments and outcome of one capture session.
///
/// Fragments keep arrival order for display while a set provides exact
/// text deduplication. Fragments of one rival series wait on standby.
#[derive(Debug)]
pub struct ReassemblyState {
    id: SessionId,
    fragments: Vec<String>,
    seen: HashSet<String>,
    standby: Standby,
    total: Option<usize>,
    status: SessionStatus,
    payload: Option<ReassembledPayload>,
}

impl ReassemblyState {
    /// Create an empty collecting session.
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            fragments: Vec::new(),
            seen: HashSet::new(),
            standby: Standby::default(),
            total: None,
            status: SessionStatus::Collecting,
            payload: None,
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId { self.id }

    /// Fragments in arrival order.
    #[must_use]
    pub fn fragments(&self) -> &[String] { self.fragments.as_slice() }

    /// Current lifecycle position.
    #[must_use]
    pub const fn status(&self) -> SessionStatus { self.status }

    /// Recovered payload, once complete.
    #[must_use]
    pub fn payload(&self) -> Option<&ReassembledPayload> { self.payload.as_ref() }

    /// Whether the session accepts no further fragments.
    #[must_use]
    pub fn is_terminal(&self) -> bool { self.status != SessionStatus::Collecting }

    /// Snapshot of collected count and estimated total.
    #[must_use]
    pub fn progress(&self) -> Progress { Progress::new(self.fragments.len(), self.total) }

    pub(super) fn contains(&self, fragment: &str) -> bool { self.seen.contains(fragment) }

    pub(super) fn push(&mut self, fragment: &str) {
        self.seen.insert(fragment.to_owned());
        self.fragments.push(fragment.to_owned());
    }

    /// Remove the most recent fragment, returning it.
    pub(super) fn pop(&mut self) -> Option<String> {
        let fragment = self.fragments.pop()?;
        self.seen.remove(&fragment);
        Some(fragment)
    }

    /// Remove the fragment at `position`, returning it.
    pub(super) fn remove(&mut self, position: usize) -> Option<String> {
        if position >= self.fragments.len() {
            return None;
        }
        let fragment = self.fragments.remove(position);
        self.seen.remove(&fragment);
        Some(fragment)
    }

    /// Park `fragment` with its series, replacing a standby series with
    /// another key. Returns how many fragments the standby series holds.
    pub(super) fn stash(&mut self, key: String, fragment: String) -> usize {
        if self.standby.key != key {
            self.standby = Standby {
                key,
                fragments: Vec::new(),
            };
        }
        if !self.standby.fragments.contains(&fragment) {
            self.standby.fragments.push(fragment);
        }
        self.standby.fragments.len()
    }

    /// Swap the standby series with the one being collected. The current
    /// fragments go on standby under `key`, or are discarded without one.
    pub(super) fn promote_standby(&mut self, key: Option<String>) {
        let standby = std::mem::take(&mut self.standby);
        let demoted = std::mem::replace(&mut self.fragments, standby.fragments);
        if let Some(key) = key {
            self.standby = Standby {
                key,
                fragments: demoted,
            };
        }
        self.seen = self.fragments.iter().cloned().collect();
        self.total = None;
    }

    pub(super) fn total(&self) -> Option<usize> { self.total }

    pub(super) fn set_total(&mut self, total: usize) { self.total = Some(total); }

    pub(super) fn complete(&mut self, payload: ReassembledPayload) {
        self.total = Some(self.fragments.len());
        self.payload = Some(payload);
        self.status = SessionStatus::Complete;
    }

    pub(super) fn fail(&mut self) { self.status = SessionStatus::Failed; }
}
