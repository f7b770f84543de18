//! # Start-Bit Sequencer
//!
//! Decides, from the frame cursor alone, what the line driver does on each
//! bit-slot tick. The decisions are pure functions so they can be checked
//! without hardware; [`apply`] is the only part that touches the line.
//!
//! | Byte slot | Bit slot | Action |
//! |-----------|----------|--------|
//! | 8-15 | any | none (idle region) |
//! | 0-7 | 0 | drive line low (start bit) |
//! | 0-1 | 1 | release line, arm sampler |
//! | 2-7 | 1 | release line |
//! | 0-7 | 2-11 | none |

use super::line::LancLine;
use super::protocol::{FrameCursor, DATA_BITS};

/// What the line is doing during a bit slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePhase {
    /// Trailing half of the frame, nothing happens on the line
    Idle,
    /// Line held low by this device
    StartBit,
    /// Sender drives data bits, the armed sampler captures them
    Sampling,
    /// Data or stop cells that this device does not capture
    Gap,
}

impl LinePhase {
    /// Phase of the bit slot the cursor points at
    pub const fn at(cursor: FrameCursor) -> Self {
        if cursor.in_idle_region() {
            LinePhase::Idle
        } else if cursor.bit_slot == 0 {
            LinePhase::StartBit
        } else if cursor.is_receive_slot() && cursor.bit_slot <= DATA_BITS {
            LinePhase::Sampling
        } else {
            LinePhase::Gap
        }
    }
}

/// Line driver action for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    /// Leave the line and sampler alone
    None,
    /// Begin the start bit
    AssertStart,
    /// End the start bit, optionally arming the sampler for the data bits
    ReleaseStart { arm_sampler: bool },
}

impl SlotAction {
    /// Action due at the bit slot the cursor points at
    pub const fn at(cursor: FrameCursor) -> Self {
        if cursor.in_idle_region() {
            return SlotAction::None;
        }

        match cursor.bit_slot {
            0 => SlotAction::AssertStart,
            // Transmitting would also start here; this device never does
            1 => SlotAction::ReleaseStart {
                arm_sampler: cursor.is_receive_slot(),
            },
            _ => SlotAction::None,
        }
    }
}

/// Carry out a slot action on the line
pub fn apply<L: LancLine>(action: SlotAction, line: &mut L) {
    match action {
        SlotAction::None => {}
        SlotAction::AssertStart => line.assert_line(),
        SlotAction::ReleaseStart { arm_sampler } => {
            line.release_line();
            if arm_sampler {
                line.arm_sampler();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanc::line::mocks::{LineEvent, MockLine};
    use crate::lanc::protocol::{BIT_SLOTS_PER_BYTE, BYTE_SLOTS_PER_FRAME};

    fn all_slots() -> impl Iterator<Item = FrameCursor> {
        (0..BYTE_SLOTS_PER_FRAME)
            .flat_map(|byte| (0..BIT_SLOTS_PER_BYTE).map(move |bit| FrameCursor::new(byte, bit)))
    }

    #[test]
    fn test_start_bit_only_in_first_eight_slots() {
        for cursor in all_slots() {
            let asserts = SlotAction::at(cursor) == SlotAction::AssertStart;
            assert_eq!(
                asserts,
                cursor.bit_slot == 0 && cursor.byte_slot < 8,
                "cursor {:?}",
                cursor
            );
        }
    }

    #[test]
    fn test_sampler_armed_only_for_receive_slots() {
        let armed: Vec<FrameCursor> = all_slots()
            .filter(|c| SlotAction::at(*c) == SlotAction::ReleaseStart { arm_sampler: true })
            .collect();

        assert_eq!(armed, vec![FrameCursor::new(0, 1), FrameCursor::new(1, 1)]);
    }

    #[test]
    fn test_release_without_arming_in_other_active_slots() {
        for byte in 2..8 {
            assert_eq!(
                SlotAction::at(FrameCursor::new(byte, 1)),
                SlotAction::ReleaseStart { arm_sampler: false }
            );
        }
    }

    #[test]
    fn test_nothing_happens_in_idle_region() {
        for cursor in all_slots().filter(|c| c.byte_slot >= 8) {
            assert_eq!(SlotAction::at(cursor), SlotAction::None);
            assert_eq!(LinePhase::at(cursor), LinePhase::Idle);
        }
    }

    #[test]
    fn test_phases() {
        assert_eq!(LinePhase::at(FrameCursor::new(0, 0)), LinePhase::StartBit);
        assert_eq!(LinePhase::at(FrameCursor::new(0, 1)), LinePhase::Sampling);
        assert_eq!(LinePhase::at(FrameCursor::new(1, 8)), LinePhase::Sampling);
        assert_eq!(LinePhase::at(FrameCursor::new(1, 9)), LinePhase::Gap);
        assert_eq!(LinePhase::at(FrameCursor::new(2, 0)), LinePhase::StartBit);
        assert_eq!(LinePhase::at(FrameCursor::new(2, 3)), LinePhase::Gap);
        assert_eq!(LinePhase::at(FrameCursor::new(9, 0)), LinePhase::Idle);
    }

    #[test]
    fn test_apply_drives_line() {
        let mut line = MockLine::new();

        apply(SlotAction::None, &mut line);
        assert!(line.get_events().is_empty());

        apply(SlotAction::AssertStart, &mut line);
        apply(SlotAction::ReleaseStart { arm_sampler: false }, &mut line);
        apply(SlotAction::ReleaseStart { arm_sampler: true }, &mut line);

        assert_eq!(
            line.get_events(),
            vec![
                LineEvent::Assert,
                LineEvent::Release,
                LineEvent::Release,
                LineEvent::Arm
            ]
        );
    }
}
