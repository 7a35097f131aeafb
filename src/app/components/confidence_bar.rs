use egui::{vec2, Pos2, Rect, Vec2};

/// Split bar showing how sure the model is about each side's class.
/// Each side fills outward from the centre divider towards its label.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBar {
    center: Pos2,
    size: Vec2,
    radius: f32,
    left_width: f32,
    right_width: f32,
}

impl ConfidenceBar {
    pub fn new(center: Pos2, size: Vec2, radius: f32) -> Self {
        Self {
            center,
            size,
            radius,
            left_width: 0.0,
            right_width: 0.0,
        }
    }

    fn max_fill(&self) -> f32 {
        self.size.x / 2.0
    }

    pub fn set_left(&mut self, confidence: f32) {
        self.left_width = confidence.clamp(0.0, 1.0) * self.max_fill();
    }

    pub fn set_right(&mut self, confidence: f32) {
        self.right_width = confidence.clamp(0.0, 1.0) * self.max_fill();
    }

    pub fn left_width(&self) -> f32 {
        self.left_width
    }

    pub fn right_width(&self) -> f32 {
        self.right_width
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn background(&self) -> Rect {
        Rect::from_center_size(self.center, self.size)
    }

    pub fn left_fill(&self) -> Rect {
        Rect::from_min_max(
            self.center - vec2(self.left_width, self.size.y / 2.0),
            self.center + vec2(0.0, self.size.y / 2.0),
        )
    }

    pub fn right_fill(&self) -> Rect {
        Rect::from_min_max(
            self.center - vec2(0.0, self.size.y / 2.0),
            self.center + vec2(self.right_width, self.size.y / 2.0),
        )
    }

    pub fn divider(&self) -> [Pos2; 2] {
        let half = vec2(0.0, self.size.y / 2.0);
        [self.center - half, self.center + half]
    }
}
