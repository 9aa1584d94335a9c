//! A frame source replaying a fixed script.

use std::{collections::VecDeque, time::Duration};

use async_trait::async_trait;
use bbqrflow::capture::{FrameEvent, FrameSource};

/// One scripted step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Deliver a decoded fragment.
    Frame(String),
    /// Deliver a frame without a readable code.
    Blank,
    /// Wait before the next step.
    Pause(Duration),
    /// Never deliver anything again, without closing.
    Hang,
}

/// Replays [`Step`]s, then reports the source closed.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    /// One [`Step::Frame`] per fragment, in the given order.
    #[must_use]
    pub fn frames<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(fragments.into_iter().map(|f| Step::Frame(f.into())))
    }

    /// Append `step` to the script.
    #[must_use]
    pub fn then(mut self, step: Step) -> Self {
        self.steps.push_back(step);
        self
    }
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn next_frame(&mut self) -> Option<FrameEvent> {
        loop {
            match self.steps.front()? {
                Step::Pause(delay) => {
                    tokio::time::sleep(*delay).await;
                    self.steps.pop_front();
                }
                Step::Hang => std::future::pending::<()>().await,
                Step::Frame(_) | Step::Blank => {
                    return match self.steps.pop_front()? {
                        Step::Frame(text) => Some(FrameEvent::Decoded(text)),
                        _ => Some(FrameEvent::Nothing),
                    };
                }
            }
        }
    }
}
