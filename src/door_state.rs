use std::fmt;

use rppal::gpio::Level;

/// Logical state of the monitored opening.
///
/// The reed switch sits on a pulled-up input, so the line reads low while
/// the switch (and therefore the door) is closed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DoorState {
    Open,
    Closed,
}

impl DoorState {
    pub fn is_open(self) -> bool {
        self == DoorState::Open
    }
}

impl From<bool> for DoorState {
    fn from(raw_level: bool) -> Self {
        if raw_level {
            DoorState::Open
        } else {
            DoorState::Closed
        }
    }
}

impl From<Level> for DoorState {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => DoorState::Closed,
            Level::High => DoorState::Open,
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoorState::Open => f.write_str("Open"),
            DoorState::Closed => f.write_str("Closed"),
        }
    }
}
