use std::time::{Duration, Instant};

/// Freezes the video for a while after a sort so the photo stays on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VideoPause {
    paused_until: Option<Instant>,
}

impl VideoPause {
    /// A pause already running keeps its deadline.
    pub fn pause(&mut self, now: Instant, duration: Duration) -> bool {
        if self.is_paused(now) {
            return false;
        }
        self.paused_until = Some(now + duration);
        true
    }

    pub fn is_paused(&self, now: Instant) -> bool {
        matches!(self.paused_until, Some(until) if now < until)
    }

    /// Clears an expired pause. Returns true when playback resumes.
    pub fn resume_if_due(&mut self, now: Instant) -> bool {
        match self.paused_until {
            Some(until) if now >= until => {
                self.paused_until = None;
                true
            }
            _ => false,
        }
    }
}
