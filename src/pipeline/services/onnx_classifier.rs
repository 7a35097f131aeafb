use async_trait::async_trait;
use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::pipeline::services::classifier::ImageClassifier;
use crate::pipeline::types::Prediction;

const PROBABILITY_TOLERANCE: f32 = 1e-3;

/// Image classifier exported from Teachable Machine as ONNX.
///
/// Input is a single NHWC float tensor scaled to [-1, 1]; output is one score
/// per label in metadata order.
pub struct OnnxClassifier {
    session: Arc<Mutex<Session>>,
    labels: Arc<Vec<String>>,
    input_size: u32,
}

impl OnnxClassifier {
    pub fn from_bytes(
        model_bytes: &[u8],
        labels: Vec<String>,
        input_size: u32,
    ) -> Result<Self, AppError> {
        let session = Session::builder()
            .map_err(|e| AppError::Classifier(format!("Failed to create session builder: {}", e)))?
            .with_intra_threads(2)
            .map_err(|e| AppError::Classifier(format!("Failed to set intra threads: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| AppError::Classifier(format!("Failed to load ONNX model: {}", e)))?;

        tracing::info!(
            "ONNX classifier ready: {} labels, {}x{} input",
            labels.len(),
            input_size,
            input_size
        );
        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            labels: Arc::new(labels),
            input_size,
        })
    }
}

#[async_trait]
impl ImageClassifier for OnnxClassifier {
    async fn classify(&self, image: Arc<DynamicImage>) -> Result<Vec<Prediction>, AppError> {
        let session = self.session.clone();
        let labels = self.labels.clone();
        let input_size = self.input_size;

        tokio::task::spawn_blocking(move || -> Result<Vec<Prediction>, AppError> {
            let input = preprocess(&image, input_size)?;
            let input_tensor = Value::from_array(input).map_err(|e| {
                AppError::Classifier(format!("Failed to create tensor value: {}", e))
            })?;

            let scores: Vec<f32> = {
                let mut session = session
                    .lock()
                    .map_err(|_| AppError::Classifier("Session lock poisoned".to_string()))?;
                let outputs = session
                    .run(ort::inputs![input_tensor])
                    .map_err(|e| AppError::Classifier(format!("Inference failed: {}", e)))?;
                let (_, data) = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
                    AppError::Classifier(format!("Failed to extract output tensor: {}", e))
                })?;
                data.to_vec()
            };

            to_predictions(&labels, &scores)
        })
        .await
        .map_err(|e| AppError::Classifier(format!("Classification task failed: {}", e)))?
    }
}

/// Resize to the model input and scale pixels to [-1, 1], NHWC.
pub fn preprocess(image: &DynamicImage, input_size: u32) -> Result<Array4<f32>, AppError> {
    let rgb = image
        .resize_exact(input_size, input_size, FilterType::Triangle)
        .to_rgb8();
    let data: Vec<f32> = rgb
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 127.5 - 1.0)
        .collect();
    let side = input_size as usize;
    Array4::from_shape_vec((1, side, side, 3), data)
        .map_err(|e| AppError::Classifier(format!("Failed to create tensor: {}", e)))
}

fn to_predictions(labels: &[String], scores: &[f32]) -> Result<Vec<Prediction>, AppError> {
    if scores.len() != labels.len() {
        return Err(AppError::Classifier(format!(
            "Model produced {} scores for {} labels",
            scores.len(),
            labels.len()
        )));
    }
    Ok(labels
        .iter()
        .zip(normalize_scores(scores))
        .map(|(label, confidence)| Prediction::new(label.clone(), confidence))
        .collect())
}

/// Scores that already form a distribution pass through, anything else is softmaxed.
pub fn normalize_scores(scores: &[f32]) -> Vec<f32> {
    let in_range = scores.iter().all(|s| (0.0..=1.0).contains(s));
    let sum: f32 = scores.iter().sum();
    if in_range && (sum - 1.0).abs() <= PROBABILITY_TOLERANCE {
        return scores.to_vec();
    }

    let max = scores.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exp: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let exp_sum: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / exp_sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn probabilities_pass_through_unchanged() {
        assert_eq!(normalize_scores(&[0.7, 0.2, 0.1]), vec![0.7, 0.2, 0.1]);
    }

    #[test]
    fn logits_are_softmaxed() {
        let normalized = normalize_scores(&[2.0, 1.0, -1.0]);
        let sum: f32 = normalized.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(normalized[0] > normalized[1] && normalized[1] > normalized[2]);
    }

    #[test]
    fn preprocess_scales_to_signed_unit_range() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(
            32,
            16,
            Rgb([255, 0, 255]),
        ));
        let tensor = preprocess(&image, 8).unwrap();
        assert_eq!(tensor.shape(), &[1, 8, 8, 3]);
        assert!((tensor[[0, 3, 3, 0]] - 1.0).abs() < 1e-5);
        assert!((tensor[[0, 3, 3, 1]] + 1.0).abs() < 1e-5);
    }

    #[test]
    fn score_count_must_match_labels() {
        let labels = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(to_predictions(&labels, &[0.5, 0.5]).is_err());
        let predictions = to_predictions(&labels, &[0.1, 0.2, 0.7]).unwrap();
        assert_eq!(predictions[2], Prediction::new("c", 0.7));
    }
}
