pub mod loopback;
pub mod protocol;
pub mod serial_link;

pub use loopback::LoopbackLink;
pub use protocol::{SortCommand, SorterFirmware};
pub use serial_link::SerialSorterLink;

use crate::error::AppError;

/// Byte channel to the sorter microcontroller.
pub trait SorterLink: Send {
    fn name(&self) -> &str;

    fn is_open(&self) -> bool;

    fn send(&mut self, command: SortCommand) -> Result<(), AppError>;

    fn close(&mut self) -> Result<(), AppError>;
}
