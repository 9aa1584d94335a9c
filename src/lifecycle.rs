//! Visibility-driven suspension of timers and capture tasks.
//!
//! When the display goes away every active playback timer and capture
//! session is torn down. Nothing resumes on its own; callers restart
//! explicitly once visible again.

use log::info;

use crate::{
    capture::CaptureHandle,
    playback::{CodeRenderer, PlaybackEngine},
};

/// Whether the hosting display is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    /// Map a "hidden" flag as reported by a display toolkit.
    #[must_use]
    pub const fn from_hidden(hidden: bool) -> Self {
        if hidden { Self::Hidden } else { Self::Visible }
    }
}

/// Something holding a timer or task that must stop while hidden.
pub trait Suspend {
    /// Tear down timers and callbacks. Must be idempotent.
    fn suspend(&mut self);

    /// Whether anything is still running.
    fn is_active(&self) -> bool;
}

impl<R: CodeRenderer> Suspend for PlaybackEngine<R> {
    fn suspend(&mut self) { self.stop(); }

    fn is_active(&self) -> bool { self.is_running() }
}

impl Suspend for CaptureHandle {
    fn suspend(&mut self) { self.stop(); }

    fn is_active(&self) -> bool { !self.is_stopped() && !self.is_finished() }
}

/// Tracks visibility and suspends registered work when it is lost.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lifecycle {
    visibility: Visibility,
}

impl Lifecycle {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            visibility: Visibility::Visible,
        }
    }

    /// Last recorded visibility.
    #[must_use]
    pub const fn visibility(&self) -> Visibility { self.visibility }

    /// Record `visibility`, suspending every target when hidden.
    ///
    /// Returns how many targets were active and have been suspended.
    /// Becoming visible suspends nothing and resumes nothing.
    pub fn apply(&mut self, visibility: Visibility, targets: &mut [&mut dyn Suspend]) -> usize {
        self.visibility = visibility;
        if visibility == Visibility::Visible {
            return 0;
        }
        let mut suspended = 0;
        for target in targets.iter_mut() {
            if target.is_active() {
                suspended += 1;
            }
            target.suspend();
        }
        if suspended > 0 {
            info!("display hidden; suspended {suspended} active task(s)");
        }
        suspended
    }
}

#[cfg(test)]
mod tests;
