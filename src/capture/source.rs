//! Frame sources: where decoded QR text comes from.

use std::{collections::VecDeque, path::PathBuf};

use async_trait::async_trait;
use log::warn;
use tokio::{
    fs,
    io::{AsyncBufRead, AsyncBufReadExt, Lines},
    sync::mpsc,
};

/// One delivered frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameEvent {
    /// A code was found and decoded to text.
    Decoded(String),
    /// The frame held no readable code.
    Nothing,
}

impl FrameEvent {
    /// Classify raw decoder output, treating blank text as no code.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Self::Nothing
        } else {
            Self::Decoded(text.to_owned())
        }
    }
}

/// Asynchronous producer of decoded frames.
///
/// Implementations must be cancellation-safe: dropping a pending
/// `next_frame()` future must not lose a frame that was already decoded.
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next frame; `None` once the source is closed.
    async fn next_frame(&mut self) -> Option<FrameEvent>;
}

#[async_trait]
impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    async fn next_frame(&mut self) -> Option<FrameEvent> { (**self).next_frame().await }
}

/// Frames pushed through an mpsc channel by a camera integration.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<FrameEvent>,
}

impl ChannelSource {
    /// Wrap an existing receiver.
    #[must_use]
    pub fn new(rx: mpsc::Receiver<FrameEvent>) -> Self { Self { rx } }

    /// Create a bounded channel and the source reading from it.
    #[must_use]
    pub fn channel(capacity: usize) -> (mpsc::Sender<FrameEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl FrameSource for ChannelSource {
    async fn next_frame(&mut self) -> Option<FrameEvent> { self.rx.recv().await }
}

/// One frame per line of text, e.g. a QR scanner piped to stdin.
#[derive(Debug)]
pub struct LineSource<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> LineSource<R> {
    /// Read frames from `reader`.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> FrameSource for LineSource<R> {
    async fn next_frame(&mut self) -> Option<FrameEvent> {
        match self.lines.next_line().await {
            Ok(line) => line.map(|line| FrameEvent::from_text(&line)),
            Err(err) => {
                warn!("frame source read failed: {err}");
                None
            }
        }
    }
}

/// Text files read in order, one frame per file.
///
/// Unreadable files yield [`FrameEvent::Nothing`] so a bad capture does not
/// end the sequence.
#[derive(Debug, Default)]
pub struct FileSequence {
    paths: VecDeque<PathBuf>,
}

impl FileSequence {
    /// Read `paths` in the given order.
    #[must_use]
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Files not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize { self.paths.len() }
}

#[async_trait]
impl FrameSource for FileSequence {
    async fn next_frame(&mut self) -> Option<FrameEvent> {
        let path = self.paths.front()?.clone();
        let read = fs::read_to_string(&path).await;
        self.paths.pop_front();
        match read {
            Ok(text) => Some(FrameEvent::from_text(&text)),
            Err(err) => {
                warn!("skipping unreadable frame {}: {err}", path.display());
                Some(FrameEvent::Nothing)
            }
        }
    }
}
