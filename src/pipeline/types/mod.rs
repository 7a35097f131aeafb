mod classification;
mod model_labels;
mod sort_class;

pub use classification::{ClassificationResult, Prediction};
pub use model_labels::{MIN_LABELS, ModelLabels};
pub use sort_class::{SideMapping, SortClass, SortSide};
