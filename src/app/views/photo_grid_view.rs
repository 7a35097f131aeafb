use egui::{pos2, Color32, Rect};

use crate::app::components::PhotoGrid;
use crate::app::views::{TextureCache, View};

const CARD_RADIUS: f32 = 3.0;

pub struct PhotoGridView<'a> {
    grid: &'a PhotoGrid,
    textures: &'a mut TextureCache,
}

impl<'a> PhotoGridView<'a> {
    pub fn new(grid: &'a PhotoGrid, textures: &'a mut TextureCache) -> Self {
        Self { grid, textures }
    }
}

impl View for PhotoGridView<'_> {
    fn draw(&mut self, ui: &mut egui::Ui) {
        let full_uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
        for cell in self.grid.cells() {
            let texture = self.textures.texture_for(ui.ctx(), cell.frame);
            let painter = ui.painter();
            painter.rect_filled(cell.card, CARD_RADIUS, Color32::WHITE);
            painter.image(texture, cell.image, full_uv, Color32::WHITE);
        }
    }
}
