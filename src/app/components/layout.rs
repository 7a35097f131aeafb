use egui::{pos2, vec2, Pos2, Vec2};

use crate::pipeline::types::SortSide;

/// Below this width the sorter UI does not fit and a notice is shown instead.
pub const MIN_WIDTH: f32 = 700.0;

const LABEL_OFFSET_X: f32 = 314.0;
const LABEL_SIZE: Vec2 = vec2(200.0, 48.0);
const LABEL_RADIUS: f32 = 9.0;
const BAR_MAX_WIDTH: f32 = 341.0;
const BAR_HEIGHT: f32 = 28.0;
const BAR_RADIUS: f32 = 5.0;
const LEFT_GRID_OFFSET_X: f32 = -480.0;
const RIGHT_GRID_OFFSET_X: f32 = 300.0;
const VIDEO_SIZE: f32 = 250.0;

/// Positions of every screen component for one window size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub size: Vec2,
    pub bar_center: Pos2,
    pub bar_size: Vec2,
    pub bar_radius: f32,
    pub label_size: Vec2,
    pub label_radius: f32,
    left_label_center: Pos2,
    right_label_center: Pos2,
    left_grid_origin: Pos2,
    right_grid_origin: Pos2,
    pub video_center: Pos2,
    pub video_size: f32,
}

impl Layout {
    pub fn new(size: Vec2) -> Self {
        let center_x = size.x / 2.0;
        let label_y = size.y / 3.3;
        let grid_y = size.y / 2.5;
        Self {
            size,
            bar_center: pos2(center_x, label_y),
            bar_size: vec2((size.x / 4.0).min(BAR_MAX_WIDTH), BAR_HEIGHT),
            bar_radius: BAR_RADIUS,
            label_size: LABEL_SIZE,
            label_radius: LABEL_RADIUS,
            left_label_center: pos2(center_x - LABEL_OFFSET_X, label_y),
            right_label_center: pos2(center_x + LABEL_OFFSET_X, label_y),
            left_grid_origin: pos2(center_x + LEFT_GRID_OFFSET_X, grid_y),
            right_grid_origin: pos2(center_x + RIGHT_GRID_OFFSET_X, grid_y),
            video_center: pos2(center_x, size.y / 1.6),
            video_size: VIDEO_SIZE,
        }
    }

    pub fn label_center(&self, side: SortSide) -> Pos2 {
        match side {
            SortSide::Left => self.left_label_center,
            SortSide::Right => self.right_label_center,
        }
    }

    pub fn grid_origin(&self, side: SortSide) -> Pos2 {
        match side {
            SortSide::Left => self.left_grid_origin,
            SortSide::Right => self.right_grid_origin,
        }
    }

    pub fn is_too_narrow(&self) -> bool {
        self.size.x <= MIN_WIDTH
    }
}
