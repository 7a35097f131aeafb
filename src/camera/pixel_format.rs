use image::{ImageFormat, RgbImage};

use crate::error::AppError;

/// Decode one captured buffer into RGB.
pub fn decode(fourcc: &str, data: &[u8], width: u32, height: u32) -> Result<RgbImage, AppError> {
    match fourcc {
        "MJPG" => Ok(image::load_from_memory_with_format(data, ImageFormat::Jpeg)?.to_rgb8()),
        "YUYV" => yuyv_to_rgb(data, width, height),
        other => Err(AppError::Camera(format!("Unsupported pixel format {}", other))),
    }
}

/// YUV 4:2:2 packed as `[Y0, U, Y1, V]`, two pixels per chunk, BT.601.
pub fn yuyv_to_rgb(data: &[u8], width: u32, height: u32) -> Result<RgbImage, AppError> {
    let expected = (width * height * 2) as usize;
    if data.len() < expected {
        return Err(AppError::Camera(format!(
            "YUYV buffer holds {} bytes, {}x{} needs {}",
            data.len(),
            width,
            height,
            expected
        )));
    }

    let to_rgb = |y: f32, u: f32, v: f32| {
        [
            (y + 1.402 * v).clamp(0.0, 255.0) as u8,
            (y - 0.344_136 * u - 0.714_136 * v).clamp(0.0, 255.0) as u8,
            (y + 1.772 * u).clamp(0.0, 255.0) as u8,
        ]
    };

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for chunk in data[..expected].chunks_exact(4) {
        let u = chunk[1] as f32 - 128.0;
        let v = chunk[3] as f32 - 128.0;
        rgb.extend_from_slice(&to_rgb(chunk[0] as f32, u, v));
        rgb.extend_from_slice(&to_rgb(chunk[2] as f32, u, v));
    }

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| AppError::Camera("Failed to build RGB image from YUYV".to_string()))
}
