use egui::{pos2, Align2, Color32, FontId, Stroke, StrokeKind};

use crate::app::components::ClassificationLabel;
use crate::app::views::{ACCENT, SPLASH, View};
use crate::pipeline::types::SortSide;

const TEXT_SIZE: f32 = 24.0;
const LEFT_INSET: f32 = 10.0;
const RIGHT_INSET: f32 = 13.0;
const SPLASH_WIDTH: f32 = 3.0;

/// Label box plus its splash outline.
pub struct LabelView<'a> {
    label: &'a ClassificationLabel,
}

impl<'a> LabelView<'a> {
    pub fn new(label: &'a ClassificationLabel) -> Self {
        Self { label }
    }
}

impl View for LabelView<'_> {
    fn draw(&mut self, ui: &mut egui::Ui) {
        let painter = ui.painter();
        let splash = self.label.splash();
        if let Some(outline) = splash.outline() {
            painter.rect_stroke(
                outline,
                splash.corner_radius(),
                Stroke::new(SPLASH_WIDTH, SPLASH),
                StrokeKind::Outside,
            );
        }

        if !self.label.is_visible() {
            return;
        }
        let rect = self.label.rect();
        painter.rect_filled(rect, self.label.radius(), Color32::WHITE);

        let (anchor, align) = match self.label.side() {
            SortSide::Left => (pos2(rect.left() + LEFT_INSET, rect.center().y), Align2::LEFT_CENTER),
            SortSide::Right => (
                pos2(rect.right() - RIGHT_INSET, rect.center().y),
                Align2::RIGHT_CENTER,
            ),
        };
        painter.text(
            anchor,
            align,
            self.label.text(),
            FontId::proportional(TEXT_SIZE),
            ACCENT,
        );
    }
}
