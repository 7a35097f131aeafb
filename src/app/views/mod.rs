pub mod confidence_bar_view;
pub mod label_view;
pub mod photo_grid_view;
pub mod texture_cache;
pub mod video_view;

pub use confidence_bar_view::ConfidenceBarView;
pub use label_view::LabelView;
pub use photo_grid_view::PhotoGridView;
pub use texture_cache::TextureCache;
pub use video_view::VideoView;

use egui::Color32;

pub const ACCENT: Color32 = Color32::from_rgb(0x19, 0x67, 0xd2);
pub const SPLASH: Color32 = Color32::from_rgb(22, 79, 200);
// rgba(174, 203, 250, 0.4), premultiplied.
pub const BAR_BACKGROUND: Color32 = Color32::from_rgba_premultiplied(70, 81, 100, 102);

pub trait View {
    fn draw(&mut self, ui: &mut egui::Ui);
}
