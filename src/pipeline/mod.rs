pub mod services;
pub mod types;

pub use services::{ClassificationService, ImageClassifier, ModelLoader};
pub use types::{ClassificationResult, ModelLabels, Prediction, SortClass, SortSide};
