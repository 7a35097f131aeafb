use async_trait::async_trait;
use image::DynamicImage;
use std::sync::Arc;

use crate::error::AppError;
use crate::pipeline::types::Prediction;

/// An image classification model: one confidence per known label.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    async fn classify(&self, image: Arc<DynamicImage>) -> Result<Vec<Prediction>, AppError>;
}
