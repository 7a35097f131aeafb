use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::serial::protocol::ServoMove;
use crate::serial::{SortCommand, SorterFirmware, SorterLink};

/// In-process link that feeds every byte to a [`SorterFirmware`].
///
/// Used when `serial.simulate` is set and by tests.
pub struct LoopbackLink {
    open: bool,
    firmware: SorterFirmware,
    sent: Arc<Mutex<Vec<u8>>>,
    fail_writes: bool,
}

impl LoopbackLink {
    pub fn new() -> Self {
        Self {
            open: true,
            firmware: SorterFirmware::new(),
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_writes: false,
        }
    }

    /// A link whose writes always fail, like a sorter unplugged mid-session.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }

    /// Shared view of every byte written so far.
    pub fn sent_bytes(&self) -> Arc<Mutex<Vec<u8>>> {
        self.sent.clone()
    }

    pub fn servo_angle(&self) -> u8 {
        self.firmware.angle()
    }
}

impl Default for LoopbackLink {
    fn default() -> Self {
        Self::new()
    }
}

impl SorterLink for LoopbackLink {
    fn name(&self) -> &str {
        "loopback"
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn send(&mut self, command: SortCommand) -> Result<(), AppError> {
        if !self.open {
            return Err(AppError::LinkClosed);
        }
        if self.fail_writes {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "sorter unplugged",
            )));
        }
        let byte = command.byte();
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(byte);
        }
        match self.firmware.poll(&[byte]) {
            ServoMove::Hold(angle) => tracing::info!("Loopback sorter: servo to {}", angle),
            ServoMove::Jiggle(_) => tracing::info!("Loopback sorter: jiggle"),
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), AppError> {
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::protocol::{LEFT_POSITION, RIGHT_POSITION};

    #[test]
    fn records_bytes_and_moves_the_servo() {
        let mut link = LoopbackLink::new();
        let sent = link.sent_bytes();
        link.send(SortCommand::Right).unwrap();
        assert_eq!(link.servo_angle(), RIGHT_POSITION);
        link.send(SortCommand::Left).unwrap();
        assert_eq!(link.servo_angle(), LEFT_POSITION);
        assert_eq!(*sent.lock().unwrap(), b"21".to_vec());
    }

    #[test]
    fn closed_link_rejects_writes() {
        let mut link = LoopbackLink::new();
        link.close().unwrap();
        assert!(!link.is_open());
        assert!(matches!(link.send(SortCommand::Left), Err(AppError::LinkClosed)));
    }
}
