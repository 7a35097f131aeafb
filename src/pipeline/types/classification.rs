use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Per-label confidences for one classified frame, highest confidence first.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub frame_id: Uuid,
    predictions: Vec<Prediction>,
}

impl ClassificationResult {
    pub fn new(frame_id: Uuid, predictions: Vec<Prediction>) -> Self {
        let mut predictions: Vec<Prediction> = predictions
            .into_iter()
            .map(|p| Prediction {
                confidence: if p.confidence.is_nan() {
                    0.0
                } else {
                    p.confidence.clamp(0.0, 1.0)
                },
                label: p.label,
            })
            .collect();
        predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Self {
            frame_id,
            predictions,
        }
    }

    pub fn confidence_of(&self, label: &str) -> Option<f32> {
        self.predictions
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.confidence)
    }

    pub fn top(&self) -> Option<&Prediction> {
        self.predictions.first()
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predictions_are_sorted_and_clamped() {
        let result = ClassificationResult::new(
            Uuid::new_v4(),
            vec![
                Prediction::new("empty", 0.02),
                Prediction::new("cat", 1.3),
                Prediction::new("dog", f32::NAN),
            ],
        );
        assert_eq!(result.top().unwrap().label, "cat");
        assert_eq!(result.confidence_of("cat"), Some(1.0));
        assert_eq!(result.confidence_of("dog"), Some(0.0));
        assert_eq!(result.confidence_of("bird"), None);
    }
}
