pub mod components;
pub mod controller;
pub mod sorter_app;
pub mod views;

pub use controller::SorterController;
pub use sorter_app::SorterApp;
