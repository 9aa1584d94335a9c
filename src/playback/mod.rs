//! Animated playback of outbound fragments.
//!
//! [`PlaybackEngine`] pre-renders every fragment once at load time and then
//! only moves an index on a timer. Rendering is delegated to a
//! [`CodeRenderer`]; [`QrTextRenderer`] draws QR codes as terminal text.

mod engine;
mod error;
mod render;

pub use engine::{Frame, PlaybackEngine};
pub use error::PlaybackError;
pub use render::{CodeRenderer, QrTextRenderer, RenderError};

#[cfg(test)]
mod tests;
