use image::DynamicImage;
use std::path::Path;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::common::Frame;
use crate::config::CameraSettings;
use crate::error::AppError;

/// Owns the capture thread and exposes the most recent frame.
pub struct CameraClient {
    cancel_token: CancellationToken,
    capture_thread: Option<std::thread::JoinHandle<()>>,
    frame_rx: watch::Receiver<Option<Frame>>,
}

impl CameraClient {
    pub fn open(settings: &CameraSettings) -> Result<Self, AppError> {
        match &settings.still_image {
            Some(path) => Self::still(path),
            None => Self::capture(settings),
        }
    }

    /// Serve a single image file as the camera feed.
    pub fn still(path: &Path) -> Result<Self, AppError> {
        tracing::info!("Camera serving still image {}", path.display());
        Ok(Self::from_image(image::open(path)?))
    }

    pub fn from_image(image: DynamicImage) -> Self {
        let (_frame_tx, frame_rx) = watch::channel(Some(Frame::capture(image)));
        Self {
            cancel_token: CancellationToken::new(),
            capture_thread: None,
            frame_rx,
        }
    }

    #[cfg(target_os = "linux")]
    fn capture(settings: &CameraSettings) -> Result<Self, AppError> {
        let (frame_tx, frame_rx) = watch::channel(None);
        let cancel_token = CancellationToken::new();
        let thread_token = cancel_token.clone();
        let settings = settings.clone();
        let capture_thread = std::thread::Builder::new()
            .name("camera".to_string())
            .spawn(move || crate::camera::v4l2_capture::run(settings, frame_tx, thread_token))?;
        Ok(Self {
            cancel_token,
            capture_thread: Some(capture_thread),
            frame_rx,
        })
    }

    #[cfg(not(target_os = "linux"))]
    fn capture(_settings: &CameraSettings) -> Result<Self, AppError> {
        Err(AppError::Camera(
            "No capture backend on this platform, set camera.still_image".to_string(),
        ))
    }

    pub fn latest(&self) -> Option<Frame> {
        self.frame_rx.borrow().clone()
    }

    pub fn stop(&mut self) {
        self.cancel_token.cancel();
        if let Some(thread) = self.capture_thread.take() {
            if thread.join().is_err() {
                tracing::error!("Camera thread panicked");
            }
        }
    }
}

impl Drop for CameraClient {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn still_camera_always_returns_the_same_frame() {
        let camera = CameraClient::from_image(DynamicImage::ImageRgb8(
            ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(4, 4, Rgb([9, 9, 9])),
        ));
        let first = camera.latest().unwrap();
        let second = camera.latest().unwrap();
        assert_eq!(first.id(), second.id());
    }
}
