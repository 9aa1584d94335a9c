//! Renderer seam between the playback engine and a visual code generator.

use qrcode::{EcLevel, QrCode, render::unicode::Dense1x2, types::QrError};
use thiserror::Error;

/// A fragment could not be turned into a visual code.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The QR encoder rejected the data.
    #[error("QR encoding failed: {0}")]
    Qr(#[from] QrError),
    /// A custom renderer refused the fragment.
    #[error("renderer rejected fragment: {reason}")]
    Rejected { reason: String },
}

/// Turns one fragment into a displayable code.
pub trait CodeRenderer {
    /// Rendered representation, shared with display tasks.
    type Output: Clone + Send + Sync + 'static;

    /// Render `fragment`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the fragment cannot be encoded.
    fn render(&self, fragment: &str) -> Result<Self::Output, RenderError>;

    /// Visibly distinct stand-in shown when [`render`](Self::render) fails.
    fn placeholder(&self, fragment: &str, error: &RenderError) -> Self::Output;
}

/// Renders fragments as QR codes drawn with Unicode half blocks.
#[derive(Clone, Copy, Debug)]
pub struct QrTextRenderer {
    ec_level: EcLevel,
    quiet_zone: bool,
}

impl QrTextRenderer {
    /// Renderer using error correction level L with a quiet zone.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ec_level: EcLevel::L,
            quiet_zone: true,
        }
    }

    /// Use a different error correction level.
    #[must_use]
    pub const fn with_ec_level(mut self, ec_level: EcLevel) -> Self {
        self.ec_level = ec_level;
        self
    }

    /// Toggle the blank border around each code.
    #[must_use]
    pub const fn with_quiet_zone(mut self, quiet_zone: bool) -> Self {
        self.quiet_zone = quiet_zone;
        self
    }
}

impl Default for QrTextRenderer {
    fn default() -> Self { Self::new() }
}

impl CodeRenderer for QrTextRenderer {
    type Output = String;

    fn render(&self, fragment: &str) -> Result<String, RenderError> {
        let code = QrCode::with_error_correction_level(fragment.as_bytes(), self.ec_level)?;
        Ok(code
            .render::<Dense1x2>()
            .quiet_zone(self.quiet_zone)
            .build())
    }

    fn placeholder(&self, fragment: &str, error: &RenderError) -> String {
        let head: String = fragment.chars().take(8).collect();
        format!("##### UNRENDERABLE {head} #####\n{error}")
    }
}
