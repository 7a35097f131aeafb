pub mod loop_state;
pub mod sorter_controller;

pub use loop_state::{InFlight, LoopState};
pub use sorter_controller::{SortOutcome, SorterController};
