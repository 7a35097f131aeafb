use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use crate::camera::pixel_format;
use crate::common::Frame;
use crate::config::CameraSettings;
use crate::error::AppError;

const BUFFER_COUNT: u32 = 4;

/// Capture loop for one V4L2 device. Publishes every decoded frame until
/// cancelled or the device fails.
pub fn run(
    settings: CameraSettings,
    frame_tx: watch::Sender<Option<Frame>>,
    cancel_token: CancellationToken,
) {
    tracing::info!("Camera starting on {}", settings.device);
    if let Err(e) = capture(&settings, &frame_tx, &cancel_token) {
        tracing::error!("Camera {} stopped: {}", settings.device, e);
    }
    tracing::info!("Camera stopped on {}", settings.device);
}

fn capture(
    settings: &CameraSettings,
    frame_tx: &watch::Sender<Option<Frame>>,
    cancel_token: &CancellationToken,
) -> Result<(), AppError> {
    let device = Device::with_path(&settings.device)?;

    let fourcc: [u8; 4] = settings
        .fourcc
        .as_bytes()
        .try_into()
        .map_err(|_| AppError::Camera(format!("FourCC '{}' must be 4 characters", settings.fourcc)))?;
    let mut format = device.format()?;
    format.fourcc = FourCC::new(&fourcc);
    format.width = settings.width;
    format.height = settings.height;
    // The driver may settle on the closest supported mode.
    let format = device.set_format(&format)?;
    let fourcc = format
        .fourcc
        .str()
        .map_err(|e| AppError::Camera(format!("Invalid FourCC from driver: {}", e)))?
        .to_string();
    tracing::info!(
        "Camera opened: {}x{} [{}]",
        format.width,
        format.height,
        fourcc
    );

    let mut stream = Stream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)?;
    while !cancel_token.is_cancelled() {
        let (data, _) = stream.next()?;
        match pixel_format::decode(&fourcc, data, format.width, format.height) {
            Ok(rgb) => {
                frame_tx.send_replace(Some(Frame::capture(image::DynamicImage::ImageRgb8(rgb))));
            }
            Err(e) => {
                // A torn MJPG buffer now and then is normal.
                tracing::warn!("Dropping frame: {}", e);
            }
        }
    }
    Ok(())
}
