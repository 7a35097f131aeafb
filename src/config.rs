use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

const CONFIG_FILE: &str = "TinySorter";
const ENV_PREFIX: &str = "TINY_SORTER";

/// Application settings. Defaults, then `TinySorter.toml`, then
/// `TINY_SORTER__<SECTION>__<KEY>` environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: ModelSettings,
    pub classifier: ClassifierSettings,
    pub camera: CameraSettings,
    pub serial: SerialSettings,
    pub grid: GridSettings,
    pub splash: SplashSettings,
    pub sides: SideSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub url: String,
    pub test_url: String,
    pub input_size: u32,
    pub model_file: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            test_url: "https://teachablemachine.withgoogle.com/models/eGyhdtfG9/".to_string(),
            input_size: 224,
            model_file: "model.onnx".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub interval_ms: u64,
    pub threshold: f32,
    pub pause_ms: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            threshold: 0.9,
            pause_ms: 2000,
        }
    }
}

impl ClassifierSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub device: String,
    pub width: u32,
    pub height: u32,
    pub fourcc: String,
    /// Serve this image instead of opening a capture device.
    pub still_image: Option<PathBuf>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            fourcc: "MJPG".to_string(),
            still_image: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UsbFilter {
    pub vendor_id: u16,
    pub product_id: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Explicit port name; skips USB filter matching when set.
    pub port: Option<String>,
    pub baud_rate: u32,
    pub auto_connect: bool,
    /// Use an in-process sorter model instead of real hardware.
    pub simulate: bool,
    pub filters: Vec<UsbFilter>,
}

impl Default for SerialSettings {
    fn default() -> Self {
        let arduino = |product_id| UsbFilter {
            vendor_id: 0x2341,
            product_id,
        };
        Self {
            port: None,
            baud_rate: 9600,
            auto_connect: true,
            simulate: false,
            filters: vec![
                arduino(0x8036),
                arduino(0x8037),
                arduino(0x804d),
                arduino(0x804e),
                arduino(0x804f),
                arduino(0x8050),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: f32,
    pub padding: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 2,
            cell_size: 120.0,
            padding: 20.0,
        }
    }
}

impl GridSettings {
    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SplashSettings {
    pub delay_ms: u64,
    pub steps: u32,
    pub size_step: f32,
    /// Defaults to `delay_ms * steps` when unset.
    pub duration_ms: Option<u64>,
}

impl Default for SplashSettings {
    fn default() -> Self {
        Self {
            delay_ms: 75,
            steps: 4,
            size_step: 10.0,
            duration_ms: None,
        }
    }
}

impl SplashSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(
            self.duration_ms
                .unwrap_or(self.delay_ms * u64::from(self.steps)),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SideSettings {
    /// Show the first class on the right and the second on the left.
    pub swap: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub test_mode: bool,
    pub width: f32,
    pub height: f32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            test_mode: false,
            width: 1280.0,
            height: 800.0,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, AppError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), AppError> {
        let threshold = self.classifier.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AppError::InvalidSetting(format!(
                "classifier.threshold must be between 0.0 and 1.0, got {}",
                threshold
            )));
        }
        if self.classifier.interval_ms == 0 {
            return Err(AppError::InvalidSetting(
                "classifier.interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.grid.capacity() == 0 {
            return Err(AppError::InvalidSetting(
                "grid.rows and grid.cols must be greater than 0".to_string(),
            ));
        }
        if self.splash.steps == 0 || self.splash.delay_ms == 0 {
            return Err(AppError::InvalidSetting(
                "splash.steps and splash.delay_ms must be greater than 0".to_string(),
            ));
        }
        if self.model.input_size == 0 {
            return Err(AppError::InvalidSetting(
                "model.input_size must be greater than 0".to_string(),
            ));
        }
        if self.serial.port.is_none() && self.serial.filters.is_empty() {
            return Err(AppError::InvalidSetting(
                "serial.filters must not be empty when no serial.port is set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<Settings, AppError> {
        Settings::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn defaults_match_the_classroom_setup() {
        let settings = from_toml("").unwrap();
        assert_eq!(settings.classifier.interval(), Duration::from_millis(100));
        assert_eq!(settings.classifier.threshold, 0.9);
        assert_eq!(settings.grid.capacity(), 6);
        assert_eq!(settings.splash.duration(), Duration::from_millis(300));
        assert_eq!(settings.serial.baud_rate, 9600);
        assert_eq!(settings.serial.filters.len(), 6);
        assert!(!settings.sides.swap);
    }

    #[test]
    fn file_values_override_defaults() {
        let settings = from_toml(
            r#"
            [classifier]
            threshold = 0.75

            [grid]
            rows = 2
            cols = 2

            [[serial.filters]]
            vendor_id = 1234
            product_id = 5678
            "#,
        )
        .unwrap();
        assert_eq!(settings.classifier.threshold, 0.75);
        assert_eq!(settings.classifier.pause_ms, 2000);
        assert_eq!(settings.grid.capacity(), 4);
        assert_eq!(
            settings.serial.filters,
            vec![UsbFilter {
                vendor_id: 1234,
                product_id: 5678
            }]
        );
    }

    #[test]
    fn threshold_outside_unit_range_is_rejected() {
        let result = from_toml("[classifier]\nthreshold = 1.5\n");
        assert!(matches!(result, Err(AppError::InvalidSetting(_))));
    }

    #[test]
    fn empty_grid_is_rejected() {
        let result = from_toml("[grid]\nrows = 0\n");
        assert!(matches!(result, Err(AppError::InvalidSetting(_))));
    }
}
