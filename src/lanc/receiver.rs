//! # LANC Receiver
//!
//! Ties the frame cursor, the start-bit sequencer and the shift-capture unit
//! into one state machine driven by two interrupt sources:
//!
//! - [`LancReceiver::on_bit_tick`]: the bit-slot timer compare, once per bit
//! - [`LancReceiver::on_capture_complete`]: the shift-capture overflow, once
//!   per armed byte
//!
//! Both handlers are short, bounded and never log. The receiver does no
//! allocation after construction.

use std::sync::Arc;

use super::bits::decode_captured;
use super::handoff::FrameHandoff;
use super::line::LancLine;
use super::protocol::FrameCursor;
use super::sequencer::{self, LinePhase, SlotAction};

/// Interrupt-side half of the LANC receiver
pub struct LancReceiver<L> {
    cursor: FrameCursor,
    line: L,
    handoff: Arc<FrameHandoff>,
}

impl<L: LancLine> LancReceiver<L> {
    /// Create a receiver positioned at the start of a frame
    ///
    /// # Arguments
    ///
    /// * `line` - Line and shift-capture access
    /// * `handoff` - Storage shared with the background consumer
    pub fn new(line: L, handoff: Arc<FrameHandoff>) -> Self {
        Self {
            cursor: FrameCursor::default(),
            line,
            handoff,
        }
    }

    /// Bit-slot tick handler
    ///
    /// Advances the cursor, then acts on the slot the advance handed back.
    pub fn on_bit_tick(&mut self) -> SlotAction {
        let slot = self.cursor.advance();
        let action = SlotAction::at(slot);
        sequencer::apply(action, &mut self.line);
        action
    }

    /// Shift-capture completion handler
    ///
    /// Disarms the sampler, decodes the captured byte and stores it for the
    /// current byte slot. Storing byte slot 1 marks the frame ready.
    pub fn on_capture_complete(&mut self) {
        self.line.disarm_sampler();
        let byte = decode_captured(self.line.read_sampled_byte());
        self.handoff.store(self.cursor.byte_slot, byte);
    }

    /// Position the next tick will handle
    pub fn cursor(&self) -> FrameCursor {
        self.cursor
    }

    /// Phase of the slot the next tick will handle
    pub fn phase(&self) -> LinePhase {
        LinePhase::at(self.cursor)
    }

    /// Shared hand-off storage
    pub fn handoff(&self) -> &Arc<FrameHandoff> {
        &self.handoff
    }

    /// Line access
    pub fn line(&self) -> &L {
        &self.line
    }

    /// Mutable line access
    pub fn line_mut(&mut self) -> &mut L {
        &mut self.line
    }
}

impl<L> std::fmt::Debug for LancReceiver<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LancReceiver")
            .field("cursor", &self.cursor)
            .field("handoff", &self.handoff)
            .finish_non_exhaustive()
    }
}
