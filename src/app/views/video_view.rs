use egui::{pos2, Align2, Color32, FontId, Pos2, Rect, Stroke, StrokeKind, Vec2};

use crate::app::views::{TextureCache, View};
use crate::common::Frame;

const BORDER: f32 = 3.0;
const HINT_SIZE: f32 = 14.0;

/// The live (or frozen) camera frame, cropped to a centred square.
pub struct VideoView<'a> {
    frame: Option<&'a Frame>,
    center: Pos2,
    size: f32,
    textures: &'a mut TextureCache,
}

impl<'a> VideoView<'a> {
    pub fn new(
        frame: Option<&'a Frame>,
        center: Pos2,
        size: f32,
        textures: &'a mut TextureCache,
    ) -> Self {
        Self {
            frame,
            center,
            size,
            textures,
        }
    }
}

impl View for VideoView<'_> {
    fn draw(&mut self, ui: &mut egui::Ui) {
        let rect = Rect::from_center_size(self.center, Vec2::splat(self.size));
        let Some(frame) = self.frame else {
            ui.painter().text(
                self.center,
                Align2::CENTER_CENTER,
                "enable webcam access\nand restart to use",
                FontId::proportional(HINT_SIZE),
                Color32::GRAY,
            );
            return;
        };

        let texture = self.textures.texture_for(ui.ctx(), frame);
        let painter = ui.painter();
        painter.image(
            texture,
            rect,
            center_square_uv(frame.width(), frame.height()),
            Color32::WHITE,
        );
        painter.rect_stroke(
            rect,
            0.0,
            Stroke::new(BORDER, Color32::WHITE),
            StrokeKind::Outside,
        );
    }
}

/// Texture coordinates of the largest centred square in a `width`x`height` image.
pub fn center_square_uv(width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 {
        return Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
    }
    let (w, h) = (width as f32, height as f32);
    if w >= h {
        let inset = (w - h) / 2.0 / w;
        Rect::from_min_max(pos2(inset, 0.0), pos2(1.0 - inset, 1.0))
    } else {
        let inset = (h - w) / 2.0 / h;
        Rect::from_min_max(pos2(0.0, inset), pos2(1.0, 1.0 - inset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_frames_crop_the_sides() {
        let uv = center_square_uv(640, 480);
        assert!((uv.min.x - 0.125).abs() < 1e-6);
        assert!((uv.max.x - 0.875).abs() < 1e-6);
        assert_eq!(uv.min.y, 0.0);
        assert_eq!(uv.max.y, 1.0);
    }

    #[test]
    fn portrait_frames_crop_top_and_bottom() {
        let uv = center_square_uv(100, 200);
        assert_eq!(uv.min.x, 0.0);
        assert!((uv.min.y - 0.25).abs() < 1e-6);
        assert!((uv.max.y - 0.75).abs() < 1e-6);
    }
}
