use egui::{Color32, Stroke, StrokeKind};

use crate::app::components::ConfidenceBar;
use crate::app::views::{ACCENT, BAR_BACKGROUND, View};

pub struct ConfidenceBarView<'a> {
    bar: &'a ConfidenceBar,
}

impl<'a> ConfidenceBarView<'a> {
    pub fn new(bar: &'a ConfidenceBar) -> Self {
        Self { bar }
    }
}

impl View for ConfidenceBarView<'_> {
    fn draw(&mut self, ui: &mut egui::Ui) {
        let painter = ui.painter();
        let radius = self.bar.radius();
        let background = self.bar.background();

        painter.rect_filled(background, radius, BAR_BACKGROUND);
        painter.rect_stroke(
            background,
            radius,
            Stroke::new(1.0, Color32::WHITE),
            StrokeKind::Inside,
        );
        if self.bar.left_width() > 0.0 {
            painter.rect_filled(self.bar.left_fill(), radius, ACCENT);
        }
        if self.bar.right_width() > 0.0 {
            painter.rect_filled(self.bar.right_fill(), radius, ACCENT);
        }
        painter.line_segment(self.bar.divider(), Stroke::new(1.0, Color32::BLACK));
    }
}
