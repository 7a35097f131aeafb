use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid model URL '{url}': {reason}")]
    InvalidModelUrl { url: String, reason: String },
    #[error("Model has {0} classes, at least three are required")]
    InsufficientLabels(usize),
    #[error("Label '{0}' is missing from the classification result")]
    MissingLabel(String),
    #[error("Classifier error: {0}")]
    Classifier(String),
    #[error("Camera error: {0}")]
    Camera(String),
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("No serial port matches the configured USB filters")]
    NoMatchingPort,
    #[error("The sorter link is not open")]
    LinkClosed,
    #[error("The sorter link is still writing earlier commands")]
    LinkBusy,
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("UI error: {0}")]
    Ui(String),
}

impl AppError {
    /// Text shown to the user in the alert window, if the error warrants one.
    pub fn alert_message(&self) -> Option<String> {
        match self {
            AppError::InsufficientLabels(_) => Some(
                "Train a model with at least three classes: one for each type of object you want to sort, and one for the empty sorter"
                    .to_string(),
            ),
            AppError::InvalidModelUrl { url, .. } => Some(format!("Invalid model URL: {}", url)),
            _ => None,
        }
    }
}
