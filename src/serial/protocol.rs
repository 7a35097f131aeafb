//! Single-byte sorter protocol. No framing, no acknowledgment.

pub const CENTER_POSITION: u8 = 90;
pub const LEFT_POSITION: u8 = 10;
pub const RIGHT_POSITION: u8 = 170;
pub const JIGGLE_ANGLE: u8 = 15;
pub const NUM_JIGGLES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortCommand {
    Left,
    Right,
}

impl SortCommand {
    pub fn byte(&self) -> u8 {
        match self {
            SortCommand::Left => b'1',
            SortCommand::Right => b'2',
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'1' => Some(SortCommand::Left),
            b'2' => Some(SortCommand::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServoMove {
    /// Move to the angle and hold.
    Hold(u8),
    /// Wiggle around the centre, then return to it.
    Jiggle(Vec<u8>),
}

/// Behaviour of the microcontroller on the other end of the link.
///
/// Every poll looks at the bytes received since the previous poll and keeps
/// only the last ASCII digit. `1` and `2` move the gate, anything else jiggles.
#[derive(Debug, Clone)]
pub struct SorterFirmware {
    angle: u8,
}

impl Default for SorterFirmware {
    fn default() -> Self {
        Self {
            angle: CENTER_POSITION,
        }
    }
}

impl SorterFirmware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn angle(&self) -> u8 {
        self.angle
    }

    pub fn poll(&mut self, received: &[u8]) -> ServoMove {
        let last_digit = received.iter().rev().find(|b| b.is_ascii_digit()).copied();
        match last_digit.and_then(SortCommand::from_byte) {
            Some(SortCommand::Left) => {
                self.angle = LEFT_POSITION;
                ServoMove::Hold(LEFT_POSITION)
            }
            Some(SortCommand::Right) => {
                self.angle = RIGHT_POSITION;
                ServoMove::Hold(RIGHT_POSITION)
            }
            None => {
                let mut angles = Vec::with_capacity(NUM_JIGGLES * 2);
                for _ in 0..NUM_JIGGLES {
                    angles.push(CENTER_POSITION + JIGGLE_ANGLE);
                    angles.push(CENTER_POSITION - JIGGLE_ANGLE);
                }
                self.angle = CENTER_POSITION - JIGGLE_ANGLE;
                ServoMove::Jiggle(angles)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_bytes_are_ascii_digits() {
        assert_eq!(SortCommand::Left.byte(), b'1');
        assert_eq!(SortCommand::Right.byte(), b'2');
        assert_eq!(SortCommand::from_byte(b'2'), Some(SortCommand::Right));
        assert_eq!(SortCommand::from_byte(b'x'), None);
    }

    #[test]
    fn firmware_keeps_only_the_last_digit() {
        let mut firmware = SorterFirmware::new();
        assert_eq!(firmware.poll(b"12\r\n"), ServoMove::Hold(RIGHT_POSITION));
        assert_eq!(firmware.poll(b"2a1"), ServoMove::Hold(LEFT_POSITION));
        assert_eq!(firmware.angle(), LEFT_POSITION);
    }

    #[test]
    fn unknown_or_missing_digit_jiggles() {
        let mut firmware = SorterFirmware::new();
        match firmware.poll(b"7") {
            ServoMove::Jiggle(angles) => assert_eq!(angles.len(), NUM_JIGGLES * 2),
            other => panic!("expected a jiggle, got {:?}", other),
        }
        assert!(matches!(firmware.poll(&[]), ServoMove::Jiggle(_)));
    }
}
