//! # Zoom Command Decoding
//!
//! Turns the two captured bytes of a LANC frame into a motor command.
//!
//! ## Encoding
//!
//! | Byte | Bits | Meaning |
//! |------|------|---------|
//! | 0 | all | `0x28` = move, anything else = stop |
//! | 1 | 4 | direction: set = reverse (wide), clear = forward (tele) |
//! | 1 | 1-3 | speed index 0-7 |
//!
//! ## Usage
//!
//! ```
//! use lanc_zoom::motor::command::{Command, Direction};
//!
//! let cmd = Command::decode([0x28, 0b0001_0010]);
//! assert_eq!(cmd, Command::Move { direction: Direction::Reverse, speed_index: 1 });
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{LancError, Result};
use crate::lanc::protocol::{DIRECTION_BIT, MOVE_COMMAND};

/// Number of discrete speed steps
pub const SPEED_STEPS: usize = 8;

/// Default duty values, one per speed index, doubling each step
pub const DEFAULT_SPEEDS: [u8; SPEED_STEPS] = [2, 4, 8, 16, 32, 64, 128, 255];

/// Motor direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Zoom towards tele
    Forward,
    /// Zoom towards wide
    Reverse,
}

/// Decoded LANC command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Motor off
    Stop,
    /// Run the motor
    Move {
        direction: Direction,
        /// Index into the speed table (0-7)
        speed_index: u8,
    },
}

impl Command {
    /// Decode the two captured bytes of a frame
    ///
    /// Any first byte other than the move command means stop; there is no
    /// error case.
    pub fn decode(bytes: [u8; 2]) -> Self {
        let [kind, arg] = bytes;

        if kind != MOVE_COMMAND {
            return Command::Stop;
        }

        let direction = if arg & DIRECTION_BIT != 0 {
            Direction::Reverse
        } else {
            Direction::Forward
        };

        Command::Move {
            direction,
            speed_index: (arg >> 1) & 0x07,
        }
    }

    /// Bytes a camera sends for this command
    ///
    /// Stop is encoded as an all-zero frame.
    pub fn encode(&self) -> [u8; 2] {
        match *self {
            Command::Stop => [0x00, 0x00],
            Command::Move {
                direction,
                speed_index,
            } => {
                let dir = match direction {
                    Direction::Forward => 0,
                    Direction::Reverse => DIRECTION_BIT,
                };
                [MOVE_COMMAND, dir | ((speed_index & 0x07) << 1)]
            }
        }
    }

    /// True for a move command
    pub fn is_move(&self) -> bool {
        matches!(self, Command::Move { .. })
    }
}

/// Duty value for each speed index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedTable([u8; SPEED_STEPS]);

impl SpeedTable {
    /// Build a table from exactly 8 non-decreasing duty values
    ///
    /// # Errors
    ///
    /// Returns error if the slice has the wrong length or is not monotonic
    pub fn new(speeds: &[u8]) -> Result<Self> {
        let table: [u8; SPEED_STEPS] = speeds.try_into().map_err(|_| {
            LancError::SpeedTable(format!(
                "expected {} entries, got {}",
                SPEED_STEPS,
                speeds.len()
            ))
        })?;

        if table.windows(2).any(|w| w[0] > w[1]) {
            return Err(LancError::SpeedTable(format!(
                "entries must be non-decreasing: {:?}",
                table
            )));
        }

        Ok(Self(table))
    }

    /// Duty value for a speed index; only the low 3 bits are used
    pub fn duty(&self, speed_index: u8) -> u8 {
        self.0[(speed_index & 0x07) as usize]
    }

    /// All entries
    pub fn entries(&self) -> &[u8; SPEED_STEPS] {
        &self.0
    }
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self(DEFAULT_SPEEDS)
    }
}
