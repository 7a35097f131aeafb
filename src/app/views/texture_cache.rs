use std::collections::{HashMap, HashSet};

use egui::{ColorImage, TextureHandle, TextureId, TextureOptions};
use uuid::Uuid;

use crate::common::Frame;

/// GPU textures keyed by frame id.
///
/// Textures not requested since the last [`TextureCache::prune`] are freed,
/// so sorted photos stay uploaded while stale video frames are dropped.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<Uuid, TextureHandle>,
    used: HashSet<Uuid>,
}

impl TextureCache {
    pub fn texture_for(&mut self, ctx: &egui::Context, frame: &Frame) -> TextureId {
        self.used.insert(frame.id());
        self.textures
            .entry(frame.id())
            .or_insert_with(|| {
                ctx.load_texture(
                    format!("frame-{}", frame.id()),
                    to_color_image(frame),
                    TextureOptions::LINEAR,
                )
            })
            .id()
    }

    pub fn prune(&mut self) {
        let used = std::mem::take(&mut self.used);
        self.textures.retain(|id, _| used.contains(id));
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

pub fn to_color_image(frame: &Frame) -> ColorImage {
    let image = frame.image().to_rgb8();
    ColorImage::from_rgb(
        [image.width() as usize, image.height() as usize],
        image.as_raw().as_slice(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgb};

    fn frame() -> Frame {
        Frame::capture(DynamicImage::ImageRgb8(
            ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(6, 2, Rgb([1, 2, 3])),
        ))
    }

    #[test]
    fn color_image_keeps_dimensions_and_pixels() {
        let color = to_color_image(&frame());
        assert_eq!(color.size, [6, 2]);
        assert_eq!(color.pixels[0], egui::Color32::from_rgb(1, 2, 3));
    }

    #[test]
    fn unused_textures_are_pruned() {
        let ctx = egui::Context::default();
        let mut cache = TextureCache::default();
        let (kept, dropped) = (frame(), frame());

        cache.texture_for(&ctx, &kept);
        cache.texture_for(&ctx, &dropped);
        cache.prune();
        assert_eq!(cache.len(), 2);

        let id = cache.texture_for(&ctx, &kept);
        cache.prune();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.texture_for(&ctx, &kept), id);
    }
}
