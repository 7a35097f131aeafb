use std::time::Instant;

use crate::common::Frame;

#[derive(Debug, Clone)]
pub struct InFlight {
    pub frame: Frame,
    pub submitted_at: Instant,
}

/// Single classification slot. A frame is only submitted from `Idle`.
#[derive(Debug, Clone, Default)]
pub enum LoopState {
    #[default]
    Idle,
    Classifying(InFlight),
}

impl LoopState {
    pub fn is_idle(&self) -> bool {
        matches!(self, LoopState::Idle)
    }

    /// Idle -> Classifying. Returns false if a frame is already in flight.
    pub fn begin(&mut self, frame: Frame, now: Instant) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = LoopState::Classifying(InFlight {
            frame,
            submitted_at: now,
        });
        true
    }

    /// Back to Idle whatever the outcome, handing back the in-flight frame.
    pub fn finish(&mut self) -> Option<InFlight> {
        match std::mem::take(self) {
            LoopState::Idle => None,
            LoopState::Classifying(in_flight) => Some(in_flight),
        }
    }
}
