pub mod classification_service;
pub mod classifier;
pub mod model_loader;
pub mod onnx_classifier;
pub mod threshold;

pub use classification_service::ClassificationService;
pub use classifier::ImageClassifier;
pub use model_loader::{LoadedModel, ModelLoader, ModelMetadata, ModelSource};
pub use onnx_classifier::OnnxClassifier;
pub use threshold::{evaluate, ConfidenceReading, Decision};
