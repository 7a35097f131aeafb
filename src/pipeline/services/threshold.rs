use crate::error::AppError;
use crate::pipeline::types::{ClassificationResult, ModelLabels, SortClass};

/// Confidences of the two sort classes read from one result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceReading {
    pub first: f32,
    pub second: f32,
}

impl ConfidenceReading {
    pub fn of(&self, class: SortClass) -> f32 {
        match class {
            SortClass::First => self.first,
            SortClass::Second => self.second,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub reading: ConfidenceReading,
    /// Class whose confidence is strictly above the threshold. The first
    /// class wins when both are.
    pub fired: Option<SortClass>,
}

pub fn evaluate(
    result: &ClassificationResult,
    labels: &ModelLabels,
    threshold: f32,
) -> Result<Decision, AppError> {
    let confidence = |class: SortClass| {
        let label = labels.label(class);
        result
            .confidence_of(label)
            .ok_or_else(|| AppError::MissingLabel(label.to_string()))
    };
    let reading = ConfidenceReading {
        first: confidence(SortClass::First)?,
        second: confidence(SortClass::Second)?,
    };

    let fired = if reading.first > threshold {
        Some(SortClass::First)
    } else if reading.second > threshold {
        Some(SortClass::Second)
    } else {
        None
    };

    Ok(Decision { reading, fired })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::Prediction;
    use uuid::Uuid;

    fn labels() -> ModelLabels {
        ModelLabels::new(vec!["cat".into(), "dog".into(), "empty".into()]).unwrap()
    }

    fn result(cat: f32, dog: f32, empty: f32) -> ClassificationResult {
        ClassificationResult::new(
            Uuid::new_v4(),
            vec![
                Prediction::new("cat", cat),
                Prediction::new("dog", dog),
                Prediction::new("empty", empty),
            ],
        )
    }

    #[test]
    fn confident_first_class_fires() {
        let decision = evaluate(&result(0.95, 0.03, 0.02), &labels(), 0.9).unwrap();
        assert_eq!(decision.fired, Some(SortClass::First));
        assert_eq!(decision.reading.of(SortClass::Second), 0.03);
    }

    #[test]
    fn threshold_is_exclusive() {
        let decision = evaluate(&result(0.9, 0.05, 0.05), &labels(), 0.9).unwrap();
        assert_eq!(decision.fired, None);
        let decision = evaluate(&result(0.05, 0.91, 0.04), &labels(), 0.9).unwrap();
        assert_eq!(decision.fired, Some(SortClass::Second));
    }

    #[test]
    fn empty_class_never_fires() {
        let decision = evaluate(&result(0.01, 0.01, 0.98), &labels(), 0.9).unwrap();
        assert_eq!(decision.fired, None);
    }

    #[test]
    fn missing_label_is_an_error() {
        let partial = ClassificationResult::new(Uuid::new_v4(), vec![Prediction::new("cat", 0.99)]);
        let err = evaluate(&partial, &labels(), 0.9).unwrap_err();
        assert!(matches!(err, AppError::MissingLabel(label) if label == "dog"));
    }
}
