use egui::{Pos2, Rect, Vec2};

use crate::app::components::splash::{Splash, SplashTiming};
use crate::pipeline::types::SortSide;

/// Label box for one side, with the splash that pulses around it.
#[derive(Debug, Clone)]
pub struct ClassificationLabel {
    center: Pos2,
    size: Vec2,
    radius: f32,
    side: SortSide,
    text: String,
    visible: bool,
    splash: Splash,
}

impl ClassificationLabel {
    pub fn new(center: Pos2, size: Vec2, radius: f32, side: SortSide, timing: SplashTiming) -> Self {
        Self {
            center,
            size,
            radius,
            side,
            text: String::new(),
            visible: false,
            splash: Splash::new(center, size, timing),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn side(&self) -> SortSide {
        self.side
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.center, self.size)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn splash(&self) -> &Splash {
        &self.splash
    }

    pub fn splash_mut(&mut self) -> &mut Splash {
        &mut self.splash
    }
}
