pub mod app;
pub mod camera;
pub mod common;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod serial;

pub use error::AppError;
