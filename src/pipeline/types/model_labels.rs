use crate::error::AppError;
use crate::pipeline::types::SortClass;

/// At least two sort classes plus one "empty sorter" class.
pub const MIN_LABELS: usize = 3;

/// Class labels of the loaded model, in model output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLabels {
    labels: Vec<String>,
}

impl ModelLabels {
    pub fn new(labels: Vec<String>) -> Result<Self, AppError> {
        if labels.len() < MIN_LABELS {
            return Err(AppError::InsufficientLabels(labels.len()));
        }
        Ok(Self { labels })
    }

    pub fn label(&self, class: SortClass) -> &str {
        &self.labels[class.index()]
    }

    pub fn all(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
