use egui::{Pos2, Rect, Vec2};
use std::time::{Duration, Instant};

use crate::config::SplashSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplashTiming {
    pub delay: Duration,
    pub duration: Duration,
    pub steps: u32,
    pub size_step: f32,
}

impl From<&SplashSettings> for SplashTiming {
    fn from(settings: &SplashSettings) -> Self {
        Self {
            delay: settings.delay(),
            duration: settings.duration(),
            steps: settings.steps.max(1),
            size_step: settings.size_step,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Explosion {
    index: u32,
    triggered_at: Instant,
    last_step_at: Instant,
}

/// Outward pulse drawn around a label when its class fires.
#[derive(Debug, Clone, PartialEq)]
pub struct Splash {
    center: Pos2,
    size: Vec2,
    timing: SplashTiming,
    explosion: Option<Explosion>,
}

impl Splash {
    pub fn new(center: Pos2, size: Vec2, timing: SplashTiming) -> Self {
        Self {
            center,
            size,
            timing,
            explosion: None,
        }
    }

    /// Start the pulse. Returns false, and changes nothing, while one is running.
    pub fn trigger(&mut self, now: Instant) -> bool {
        if self.explosion.is_some() {
            return false;
        }
        self.explosion = Some(Explosion {
            index: 0,
            triggered_at: now,
            last_step_at: now,
        });
        true
    }

    pub fn advance(&mut self, now: Instant) {
        let Some(explosion) = self.explosion.as_mut() else {
            return;
        };
        if now.saturating_duration_since(explosion.triggered_at) > self.timing.duration {
            self.explosion = None;
            return;
        }
        let delay = self.timing.delay;
        if delay.is_zero() {
            return;
        }
        let elapsed = now.saturating_duration_since(explosion.last_step_at);
        let steps = (elapsed.as_nanos() / delay.as_nanos()) as u32;
        if steps > 0 {
            explosion.index = (explosion.index + steps) % self.timing.steps;
            explosion.last_step_at += delay * steps;
        }
    }

    pub fn is_exploding(&self) -> bool {
        self.explosion.is_some()
    }

    pub fn index(&self) -> u32 {
        self.explosion.map(|e| e.index).unwrap_or(0)
    }

    pub fn corner_radius(&self) -> f32 {
        self.timing.size_step
    }

    /// Outline for the current step, if the pulse is running.
    pub fn outline(&self) -> Option<Rect> {
        self.explosion.map(|e| {
            let grow = self.timing.size_step * e.index as f32;
            Rect::from_center_size(self.center, self.size + Vec2::splat(grow))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn splash() -> Splash {
        Splash::new(
            pos2(100.0, 100.0),
            vec2(200.0, 48.0),
            SplashTiming::from(&SplashSettings::default()),
        )
    }

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn grows_one_step_per_delay() {
        let start = Instant::now();
        let mut splash = splash();
        assert!(splash.trigger(start));
        assert_eq!(splash.outline().unwrap().size(), vec2(200.0, 48.0));

        splash.advance(start + 80 * MS);
        assert_eq!(splash.index(), 1);
        splash.advance(start + 160 * MS);
        assert_eq!(splash.index(), 2);
        assert_eq!(splash.outline().unwrap().size(), vec2(220.0, 68.0));
    }

    #[test]
    fn retrigger_while_running_is_ignored() {
        let start = Instant::now();
        let mut splash = splash();
        splash.trigger(start);
        splash.advance(start + 160 * MS);
        assert!(!splash.trigger(start + 170 * MS));
        assert_eq!(splash.index(), 2);
    }

    #[test]
    fn ends_after_duration_and_can_fire_again() {
        let start = Instant::now();
        let mut splash = splash();
        splash.trigger(start);
        splash.advance(start + 300 * MS);
        assert!(splash.is_exploding());
        splash.advance(start + 301 * MS);
        assert!(!splash.is_exploding());
        assert!(splash.outline().is_none());
        assert!(splash.trigger(start + 302 * MS));
    }

    #[test]
    fn index_wraps_and_stays_in_range() {
        let start = Instant::now();
        let timing = SplashTiming {
            duration: Duration::from_secs(10),
            ..SplashTiming::from(&SplashSettings::default())
        };
        let mut splash = Splash::new(pos2(0.0, 0.0), vec2(10.0, 10.0), timing);
        splash.trigger(start);
        for ms in (0..3000).step_by(7) {
            splash.advance(start + ms * MS);
            assert!(splash.index() < timing.steps);
        }
        splash.advance(start + 375 * MS + 3000 * MS);
        assert!(splash.index() < timing.steps);
    }

    #[test]
    fn slow_render_skips_steps_without_drifting() {
        let start = Instant::now();
        let mut splash = splash();
        splash.trigger(start);
        splash.advance(start + 230 * MS);
        assert_eq!(splash.index(), 3);
        splash.advance(start + 240 * MS);
        assert_eq!(splash.index(), 3);
    }
}
