//! Status indicator seam.
//!
//! The controller reports progress through a [`FeedbackSink`] but never
//! depends on it: every call returns a `Result`, failures are logged and
//! counted, and transmission carries on. Indicator I/O happens between
//! enqueues, so it can delay the producer but never the sequencer clock.

/// Indicator pattern held through the cooldown window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdlePattern {
    /// Activity LED off, nothing else.
    #[default]
    SolidOff,
    /// Blink the idle indicator `count` times.
    Blink { count: u8, on_ms: u32, off_ms: u32 },
}

impl IdlePattern {
    /// Time the pattern itself takes, excluding indicator latency.
    pub const fn duration_ms(&self) -> u32 {
        match *self {
            IdlePattern::SolidOff => 0,
            IdlePattern::Blink { count, on_ms, off_ms } => count as u32 * (on_ms + off_ms),
        }
    }
}

/// Status indicator driven by the transmission controller.
pub trait FeedbackSink {
    type Error: core::fmt::Debug;

    /// One pass of the word stream was queued (usually: toggle the LED).
    fn pass_complete(&mut self) -> Result<(), Self::Error>;

    /// Force the activity indicator on or off.
    fn set_activity(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Drive the cooldown indicator. Sinks without one ignore it.
    fn set_idle(&mut self, _on: bool) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Sink for boards without an indicator.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFeedback;

impl FeedbackSink for NoFeedback {
    type Error = core::convert::Infallible;

    fn pass_complete(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_activity(&mut self, _on: bool) -> Result<(), Self::Error> {
        Ok(())
    }
}
