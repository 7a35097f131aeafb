pub mod camera_client;
pub mod pixel_format;
#[cfg(target_os = "linux")]
pub mod v4l2_capture;

pub use camera_client::CameraClient;
