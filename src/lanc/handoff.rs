//! # Frame Hand-off
//!
//! Single-slot hand-off between the capture interrupt (producer) and the
//! background command interpreter (consumer).
//!
//! This is a flag, not a queue. The consumer must drain it within one frame
//! period (~20 ms) of the flag being set. If it does not, the next frame
//! overwrites the captured bytes in place and the earlier command is lost.
//! Nothing ties the two bytes to the same frame either: if the first byte of
//! a frame is missed, the second pairs with whatever the slot held before.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use super::protocol::RECEIVE_SLOTS;

/// Captured bytes plus the "frame ready" flag
#[derive(Debug, Default)]
pub struct FrameHandoff {
    recvd: [AtomicU8; RECEIVE_SLOTS as usize],
    ready: AtomicBool,
    frames_completed: AtomicU32,
    overruns: AtomicU32,
}

impl FrameHandoff {
    /// Create an empty hand-off with the flag cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a captured byte for its byte slot (interrupt side)
    ///
    /// Storing the last receivable slot sets the ready flag. Slots outside
    /// the receivable range are ignored.
    pub fn store(&self, byte_slot: u8, byte: u8) {
        let Some(cell) = self.recvd.get(byte_slot as usize) else {
            return;
        };

        cell.store(byte, Ordering::Relaxed);

        if byte_slot == RECEIVE_SLOTS - 1 {
            self.frames_completed.fetch_add(1, Ordering::Relaxed);
            // Release orders the byte stores before the flag
            if self.ready.swap(true, Ordering::Release) {
                self.overruns.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// True if a completed frame is waiting
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Read both bytes and clear the flag (background side)
    ///
    /// Returns `None` if no frame completed since the last call.
    pub fn take(&self) -> Option<[u8; RECEIVE_SLOTS as usize]> {
        if !self.ready.load(Ordering::Acquire) {
            return None;
        }

        let bytes = [
            self.recvd[0].load(Ordering::Relaxed),
            self.recvd[1].load(Ordering::Relaxed),
        ];
        self.ready.store(false, Ordering::Release);

        Some(bytes)
    }

    /// Frames whose second byte has been captured since power-on
    pub fn frames_completed(&self) -> u32 {
        self.frames_completed.load(Ordering::Relaxed)
    }

    /// Frames that completed while the previous one was still unread
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_handoff_has_nothing() {
        let handoff = FrameHandoff::new();
        assert!(!handoff.is_ready());
        assert_eq!(handoff.take(), None);
        assert_eq!(handoff.frames_completed(), 0);
    }

    #[test]
    fn test_first_byte_does_not_signal() {
        let handoff = FrameHandoff::new();
        handoff.store(0, 0x28);
        assert!(!handoff.is_ready());
        assert_eq!(handoff.take(), None);
    }

    #[test]
    fn test_second_byte_signals_frame() {
        let handoff = FrameHandoff::new();
        handoff.store(0, 0x28);
        handoff.store(1, 0x1E);

        assert!(handoff.is_ready());
        assert_eq!(handoff.take(), Some([0x28, 0x1E]));
        assert!(!handoff.is_ready());
        assert_eq!(handoff.frames_completed(), 1);
    }

    #[test]
    fn test_take_twice_yields_once() {
        let handoff = FrameHandoff::new();
        handoff.store(0, 0x28);
        handoff.store(1, 0x00);

        assert!(handoff.take().is_some());
        assert_eq!(handoff.take(), None);
    }

    #[test]
    fn test_out_of_range_slot_ignored() {
        let handoff = FrameHandoff::new();
        handoff.store(2, 0xAA);
        handoff.store(15, 0xAA);
        assert!(!handoff.is_ready());
        assert_eq!(handoff.frames_completed(), 0);
    }

    #[test]
    fn test_unread_frame_is_overwritten() {
        let handoff = FrameHandoff::new();
        handoff.store(0, 0x28);
        handoff.store(1, 0x00);

        // Consumer too slow: next frame lands on top
        handoff.store(0, 0x00);
        handoff.store(1, 0x10);

        assert_eq!(handoff.take(), Some([0x00, 0x10]));
        assert_eq!(handoff.frames_completed(), 2);
        assert_eq!(handoff.overruns(), 1);
    }

    #[test]
    fn test_first_byte_of_next_frame_races_with_read() {
        let handoff = FrameHandoff::new();
        handoff.store(0, 0x28);
        handoff.store(1, 0x1E);

        // Next frame's first byte arrives before the consumer runs
        handoff.store(0, 0x00);

        // Mixed pair: new first byte, old second byte
        assert_eq!(handoff.take(), Some([0x00, 0x1E]));
    }

    #[test]
    fn test_missed_first_byte_pairs_with_stale_value() {
        let handoff = FrameHandoff::new();
        handoff.store(0, 0x28);
        handoff.store(1, 0x02);
        assert_eq!(handoff.take(), Some([0x28, 0x02]));

        // First byte of the next frame lost, only the second arrives
        handoff.store(1, 0x04);
        assert_eq!(handoff.take(), Some([0x28, 0x04]));
    }
}
