use egui::{vec2, Pos2, Rect, Vec2};
use std::collections::VecDeque;

use crate::common::Frame;
use crate::config::GridSettings;

const IMAGE_INSET: f32 = 5.0;

/// One occupied grid cell: the white backing card and the photo inside it.
#[derive(Debug, Clone)]
pub struct GridCell<'a> {
    pub card: Rect,
    pub image: Rect,
    pub frame: &'a Frame,
}

/// Fixed-capacity FIFO of recently sorted photos, laid out row-major.
#[derive(Debug, Clone)]
pub struct PhotoGrid {
    images: VecDeque<Frame>,
    origin: Pos2,
    rows: usize,
    cols: usize,
    cell_size: f32,
    padding: f32,
}

impl PhotoGrid {
    pub fn new(origin: Pos2, settings: &GridSettings) -> Self {
        Self {
            images: VecDeque::with_capacity(settings.capacity()),
            origin,
            rows: settings.rows,
            cols: settings.cols,
            cell_size: settings.cell_size,
            padding: settings.padding,
        }
    }

    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn add_image(&mut self, frame: Frame) {
        self.images.push_back(frame);
        while self.images.len() > self.capacity() {
            self.images.pop_front();
        }
    }

    pub fn images(&self) -> impl Iterator<Item = &Frame> {
        self.images.iter()
    }

    pub fn set_origin(&mut self, origin: Pos2) {
        self.origin = origin;
    }

    pub fn origin(&self) -> Pos2 {
        self.origin
    }

    pub fn cells(&self) -> Vec<GridCell<'_>> {
        let stride = self.cell_size + self.padding;
        let card_size = Vec2::splat(self.cell_size);
        self.images
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                let (row, col) = (i / self.cols, i % self.cols);
                let min = self.origin + vec2(stride * col as f32, stride * row as f32);
                let card = Rect::from_min_size(min, card_size);
                GridCell {
                    card,
                    image: card.shrink(IMAGE_INSET),
                    frame,
                }
            })
            .collect()
    }
}
