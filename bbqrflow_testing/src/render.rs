//! Stub renderers for playback tests.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use bbqrflow::playback::{CodeRenderer, RenderError};

/// Renders each fragment as itself and counts render calls.
#[derive(Clone, Debug, Default)]
pub struct EchoRenderer {
    calls: Arc<AtomicUsize>,
}

impl EchoRenderer {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Number of `render` calls so far, across clones.
    #[must_use]
    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl CodeRenderer for EchoRenderer {
    type Output = String;

    fn render(&self, fragment: &str) -> Result<String, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(fragment.to_owned())
    }

    fn placeholder(&self, _fragment: &str, _error: &RenderError) -> String { "<placeholder>".into() }
}

/// Fails to render the configured fragments.
#[derive(Clone, Debug, Default)]
pub struct FlakyRenderer {
    failing: Vec<String>,
}

impl FlakyRenderer {
    /// Fail whenever the fragment equals one of `failing`.
    #[must_use]
    pub fn failing_on<I, S>(failing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failing: failing.into_iter().map(Into::into).collect(),
        }
    }
}

impl CodeRenderer for FlakyRenderer {
    type Output = String;

    fn render(&self, fragment: &str) -> Result<String, RenderError> {
        if self.failing.iter().any(|bad| bad == fragment) {
            return Err(RenderError::Rejected {
                reason: format!("refusing {fragment}"),
            });
        }
        Ok(fragment.to_owned())
    }

    fn placeholder(&self, _fragment: &str, error: &RenderError) -> String {
        format!("<failed: {error}>")
    }
}
