use chrono::{DateTime, Utc};
use image::DynamicImage;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct Frame {
    frame_id: Uuid,
    image: Arc<DynamicImage>,
    captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(image: DynamicImage, captured_at: DateTime<Utc>) -> Self {
        Self {
            frame_id: Uuid::new_v4(),
            image: Arc::new(image),
            captured_at,
        }
    }

    pub fn capture(image: DynamicImage) -> Self {
        Self::new(image, Utc::now())
    }

    pub fn id(&self) -> Uuid {
        self.frame_id
    }

    pub fn image(&self) -> &Arc<DynamicImage> {
        &self.image
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Square crop centred on the frame, kept for the photo grids.
    pub fn snapshot(&self) -> Frame {
        let side = self.width().min(self.height());
        let x = (self.width() - side) / 2;
        let y = (self.height() - side) / 2;
        Frame::new(self.image.crop_imm(x, y, side, side), self.captured_at)
    }
}
