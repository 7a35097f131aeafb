use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ModelSettings;
use crate::error::AppError;
use crate::pipeline::services::classifier::ImageClassifier;
use crate::pipeline::services::onnx_classifier::OnnxClassifier;
use crate::pipeline::types::ModelLabels;

const METADATA_FILE: &str = "metadata.json";

/// `metadata.json` as exported by Teachable Machine.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelMetadata {
    pub labels: Vec<String>,
    #[serde(rename = "imageSize", default)]
    pub image_size: Option<u32>,
}

/// Where a model lives: a base URL or a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Remote(String),
    Local(PathBuf),
}

impl ModelSource {
    pub fn parse(url: &str) -> Result<Self, AppError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::InvalidModelUrl {
                url: url.to_string(),
                reason: "no model URL entered".to_string(),
            });
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            let base = if url.ends_with('/') {
                url.to_string()
            } else {
                format!("{}/", url)
            };
            return Ok(ModelSource::Remote(base));
        }
        let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
        Ok(ModelSource::Local(path))
    }

    pub fn describe(&self) -> String {
        match self {
            ModelSource::Remote(base) => base.clone(),
            ModelSource::Local(path) => path.display().to_string(),
        }
    }

    async fn read(&self, file: &str) -> Result<Vec<u8>, AppError> {
        match self {
            ModelSource::Remote(base) => {
                let url = format!("{}{}", base, file);
                tracing::debug!("Fetching {}", url);
                let response = reqwest::get(&url).await?.error_for_status()?;
                Ok(response.bytes().await?.to_vec())
            }
            ModelSource::Local(dir) => Ok(tokio::fs::read(dir.join(file)).await?),
        }
    }

    pub async fn fetch_metadata(&self) -> Result<ModelMetadata, AppError> {
        let bytes = self.read(METADATA_FILE).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

pub struct LoadedModel {
    pub source: ModelSource,
    pub labels: ModelLabels,
    pub classifier: Arc<dyn ImageClassifier>,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("source", &self.source)
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct ModelLoader {
    settings: ModelSettings,
}

impl ModelLoader {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }

    /// Fetch metadata, validate the labels, then build the classifier.
    pub async fn load(&self, url: &str) -> Result<LoadedModel, AppError> {
        let source = ModelSource::parse(url)?;
        let invalid = |e: AppError| AppError::InvalidModelUrl {
            url: source.describe(),
            reason: e.to_string(),
        };

        let metadata = source.fetch_metadata().await.map_err(invalid)?;
        let labels = ModelLabels::new(metadata.labels)?;
        tracing::info!(
            "Model metadata from {}: labels {:?}",
            source.describe(),
            labels.all()
        );

        let model_bytes = source
            .read(&self.settings.model_file)
            .await
            .map_err(invalid)?;
        let input_size = metadata.image_size.unwrap_or(self.settings.input_size);
        let label_list = labels.all().to_vec();
        let classifier = tokio::task::spawn_blocking(move || {
            OnnxClassifier::from_bytes(&model_bytes, label_list, input_size)
        })
        .await
        .map_err(|e| AppError::Classifier(format!("Model loading task failed: {}", e)))??;

        Ok(LoadedModel {
            source,
            labels,
            classifier: Arc::new(classifier),
        })
    }
}
