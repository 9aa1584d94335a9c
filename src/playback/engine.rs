//! Index and timer logic for cycling through pre-rendered fragments.

use std::{sync::Arc, time::Duration};

use log::{debug, warn};
use tokio::{
    runtime::Handle,
    select,
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tokio_util::sync::CancellationToken;

use super::{CodeRenderer, PlaybackError};
use crate::{config::PlaybackConfig, metrics};

/// One fragment together with its rendered code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame<T> {
    fragment: String,
    code: T,
    placeholder: bool,
}

impl<T> Frame<T> {
    /// Fragment text encoded by this frame.
    #[must_use]
    pub fn fragment(&self) -> &str { &self.fragment }

    /// Rendered code, or the renderer's placeholder.
    #[must_use]
    pub const fn code(&self) -> &T { &self.code }

    /// Whether rendering failed and the code is a placeholder.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool { self.placeholder }
}

struct Timer {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Cycles through a fixed sequence of fragments at a constant cadence.
///
/// The current index lives in a [`watch`] channel so display tasks can
/// [`subscribe`](Self::subscribe) and redraw on change. Only one timer task
/// runs at a time and dropping the engine cancels it.
pub struct PlaybackEngine<R: CodeRenderer> {
    renderer: R,
    frames: Vec<Frame<R::Output>>,
    position: Arc<watch::Sender<usize>>,
    timer: Option<Timer>,
}

impl<R: CodeRenderer> PlaybackEngine<R> {
    /// Create an idle engine with nothing loaded.
    #[must_use]
    pub fn new(renderer: R) -> Self {
        let (position, _) = watch::channel(0);
        Self {
            renderer,
            frames: Vec::new(),
            position: Arc::new(position),
            timer: None,
        }
    }

    /// Store and pre-render `fragments`, resetting the index to zero.
    ///
    /// Any running timer is stopped. Fragments that fail to render are
    /// replaced by the renderer's placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Empty`] when `fragments` is empty; the
    /// previously loaded sequence is kept.
    pub fn load(&mut self, fragments: Vec<String>) -> Result<(), PlaybackError> {
        if fragments.is_empty() {
            return Err(PlaybackError::Empty);
        }
        self.stop();
        self.frames = fragments
            .into_iter()
            .enumerate()
            .map(|(index, fragment)| self.prerender(index, fragment))
            .collect();
        self.position.send_replace(0);
        debug!("loaded {} fragments for playback", self.frames.len());
        Ok(())
    }

    fn prerender(&self, index: usize, fragment: String) -> Frame<R::Output> {
        match self.renderer.render(&fragment) {
            Ok(code) => Frame {
                fragment,
                code,
                placeholder: false,
            },
            Err(err) => {
                warn!("fragment {index} failed to render: {err}");
                metrics::inc_render_failures();
                let code = self.renderer.placeholder(&fragment, &err);
                Frame {
                    fragment,
                    code,
                    placeholder: true,
                }
            }
        }
    }

    /// Advance the index once per configured interval.
    ///
    /// The first advance happens one interval after the call. Calling
    /// `start` while running replaces the timer.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Empty`] before a successful
    /// [`load`](Self::load) and [`PlaybackError::NoRuntime`] outside a
    /// Tokio runtime.
    pub fn start(&mut self, config: PlaybackConfig) -> Result<(), PlaybackError> {
        let len = self.frames.len();
        if len == 0 {
            return Err(PlaybackError::Empty);
        }
        let runtime = Handle::try_current().map_err(|_| PlaybackError::NoRuntime)?;
        self.stop();

        let token = CancellationToken::new();
        let handle = runtime.spawn(advance(
            Arc::clone(&self.position),
            len,
            config.interval(),
            token.clone(),
        ));
        self.timer = Some(Timer { token, handle });
        debug!(
            "playback started: {len} frames every {}ms",
            config.interval().as_millis()
        );
        Ok(())
    }

    /// Halt advancement. Calling `stop` when idle does nothing.
    pub fn stop(&mut self) {
        if let Some(Timer { token, handle }) = self.timer.take() {
            token.cancel();
            handle.abort();
            debug!("playback stopped at frame {}", self.current_index());
        }
    }

    /// Jump to frame `index`. Out-of-range indices are ignored.
    ///
    /// Returns whether `index` was in range.
    pub fn show_index(&self, index: usize) -> bool {
        if index >= self.frames.len() {
            return false;
        }
        self.position.send_replace(index);
        true
    }

    /// Index of the frame currently shown.
    #[must_use]
    pub fn current_index(&self) -> usize { *self.position.borrow() }

    /// Fragment currently shown, if anything is loaded.
    #[must_use]
    pub fn current_fragment(&self) -> Option<&str> { self.current_frame().map(Frame::fragment) }

    /// Frame currently shown, if anything is loaded.
    #[must_use]
    pub fn current_frame(&self) -> Option<&Frame<R::Output>> {
        self.frames.get(self.current_index())
    }

    /// All loaded frames in playback order.
    #[must_use]
    pub fn frames(&self) -> &[Frame<R::Output>] { &self.frames }

    /// Number of loaded frames.
    #[must_use]
    pub fn len(&self) -> usize { self.frames.len() }

    /// Whether nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }

    /// Whether a timer task is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|timer| !timer.handle.is_finished())
    }

    /// Receive the current index whenever it changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<usize> { self.position.subscribe() }
}

impl<R: CodeRenderer> Drop for PlaybackEngine<R> {
    fn drop(&mut self) { self.stop(); }
}

async fn advance(
    position: Arc<watch::Sender<usize>>,
    len: usize,
    period: Duration,
    token: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        select! {
            biased;
            () = token.cancelled() => break,
            _ = ticker.tick() => {
                position.send_modify(|index| *index = (*index + 1) % len);
                metrics::inc_playback_ticks();
            }
        }
    }
}
