use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

use crate::common::Frame;
use crate::error::AppError;
use crate::pipeline::services::classifier::ImageClassifier;
use crate::pipeline::types::ClassificationResult;

/// Classifies one frame per call.
#[derive(Clone)]
pub struct ClassificationService {
    classifier: Arc<dyn ImageClassifier>,
}

impl ClassificationService {
    pub fn new(classifier: Arc<dyn ImageClassifier>) -> Self {
        Self { classifier }
    }
}

impl Service<Frame> for ClassificationService {
    type Response = ClassificationResult;
    type Error = AppError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, frame: Frame) -> Self::Future {
        let classifier = self.classifier.clone();
        Box::pin(async move {
            let predictions = classifier.classify(frame.image().clone()).await?;
            Ok(ClassificationResult::new(frame.id(), predictions))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::Prediction;
    use async_trait::async_trait;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use tower::ServiceExt;

    struct FixedClassifier;

    #[async_trait]
    impl ImageClassifier for FixedClassifier {
        async fn classify(&self, _image: Arc<DynamicImage>) -> Result<Vec<Prediction>, AppError> {
            Ok(vec![
                Prediction::new("dog", 0.3),
                Prediction::new("cat", 0.7),
            ])
        }
    }

    struct BrokenClassifier;

    #[async_trait]
    impl ImageClassifier for BrokenClassifier {
        async fn classify(&self, _image: Arc<DynamicImage>) -> Result<Vec<Prediction>, AppError> {
            Err(AppError::Classifier("model exploded".to_string()))
        }
    }

    fn frame() -> Frame {
        Frame::capture(DynamicImage::ImageRgb8(
            ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(8, 8, Rgb([0, 0, 0])),
        ))
    }

    #[tokio::test]
    async fn result_is_tagged_with_the_frame_id() {
        let frame = frame();
        let result = ClassificationService::new(Arc::new(FixedClassifier))
            .oneshot(frame.clone())
            .await
            .unwrap();
        assert_eq!(result.frame_id, frame.id());
        assert_eq!(result.top().unwrap().label, "cat");
    }

    #[tokio::test]
    async fn classifier_errors_are_passed_through() {
        let result = ClassificationService::new(Arc::new(BrokenClassifier))
            .oneshot(frame())
            .await;
        assert!(matches!(result, Err(AppError::Classifier(_))));
    }
}
