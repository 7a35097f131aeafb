pub mod classification_label;
pub mod confidence_bar;
pub mod layout;
pub mod photo_grid;
pub mod splash;
pub mod video_pause;

pub use classification_label::ClassificationLabel;
pub use confidence_bar::ConfidenceBar;
pub use layout::Layout;
pub use photo_grid::{GridCell, PhotoGrid};
pub use splash::{Splash, SplashTiming};
pub use video_pause::VideoPause;
