//! # LANC Protocol Module
//!
//! Interrupt-driven LANC receiver.
//!
//! This module handles:
//! - Frame timing: the (byte slot, bit slot) cursor advanced once per bit
//! - Start-bit generation on the shared open-collector line
//! - Arming the shift-capture unit for the two receivable byte slots
//! - Bit-order reversal and polarity inversion of captured bytes
//! - Handing completed two-byte frames to the background consumer

pub mod protocol;
pub mod bits;
pub mod line;
pub mod sequencer;
pub mod handoff;
pub mod receiver;

pub use handoff::FrameHandoff;
pub use line::LancLine;
pub use protocol::FrameCursor;
pub use receiver::LancReceiver;
