//! Runtime configuration for capture and playback.
//!
//! Both types are small `Copy` values built with chained setters; the
//! CLI maps its flags onto them.

use std::time::Duration;

use crate::fragment::FileType;

/// Default delay between playback frames, in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
/// Shortest accepted playback interval, in milliseconds.
pub const MIN_INTERVAL_MS: u64 = 50;
/// Longest accepted playback interval, in milliseconds.
pub const MAX_INTERVAL_MS: u64 = 60_000;

/// Options applied to every capture session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaptureConfig {
    expected_type: Option<FileType>,
}

impl CaptureConfig {
    /// Configuration accepting any payload type.
    #[must_use]
    pub const fn new() -> Self { Self { expected_type: None } }

    /// Require completed payloads to carry `file_type`.
    #[must_use]
    pub const fn expect_type(mut self, file_type: FileType) -> Self {
        self.expected_type = Some(file_type);
        self
    }

    /// Required payload type, if any.
    #[must_use]
    pub const fn expected_type(&self) -> Option<FileType> { self.expected_type }
}

/// Timing for animated playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackConfig {
    interval: Duration,
}

impl PlaybackConfig {
    /// Build a configuration advancing every `millis` milliseconds.
    ///
    /// Values are clamped to [`MIN_INTERVAL_MS`]..=[`MAX_INTERVAL_MS`].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use bbqrflow::config::PlaybackConfig;
    /// assert_eq!(PlaybackConfig::from_millis(0).interval(), Duration::from_millis(50));
    /// ```
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        let clamped = millis.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS);
        if clamped != millis {
            log::debug!("playback interval {millis}ms clamped to {clamped}ms");
        }
        Self {
            interval: Duration::from_millis(clamped),
        }
    }

    /// Delay between frames.
    #[must_use]
    pub const fn interval(&self) -> Duration { self.interval }
}

impl Default for PlaybackConfig {
    fn default() -> Self { Self::from_millis(DEFAULT_INTERVAL_MS) }
}
