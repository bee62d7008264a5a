//! Termination state machine for the capture loop.
//!
//! One poll cycle walks `Scrolling → AwaitingData → IdleCheck`, and the idle
//! check either finishes the capture or starts the next cycle.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// Scroll command pending.
    Scrolling,
    /// Scroll issued; exchanges not yet inspected.
    AwaitingData,
    /// Exchanges ingested; deciding whether the feed is exhausted.
    IdleCheck,
    Done,
}

/// What the last cycle saw, evaluated in `IdleCheck`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSignals {
    /// A new matching response decoded successfully this cycle.
    pub new_data: bool,
    /// Page height differs from the previous cycle.
    pub height_changed: bool,
    /// Time since the last newly observed matching URL exceeds the idle timeout.
    pub idle_exceeded: bool,
}

impl CycleSignals {
    pub fn evaluate(
        new_data: bool,
        height_changed: bool,
        since_last_observation: Duration,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            new_data,
            height_changed,
            idle_exceeded: since_last_observation > idle_timeout,
        }
    }

    fn exhausted(&self) -> bool {
        !self.height_changed && !self.new_data && self.idle_exceeded
    }
}

impl CapturePhase {
    pub fn advance(self, signals: CycleSignals) -> CapturePhase {
        match self {
            CapturePhase::Scrolling => CapturePhase::AwaitingData,
            CapturePhase::AwaitingData => CapturePhase::IdleCheck,
            CapturePhase::IdleCheck if signals.exhausted() => CapturePhase::Done,
            CapturePhase::IdleCheck => CapturePhase::Scrolling,
            CapturePhase::Done => CapturePhase::Done,
        }
    }
}
