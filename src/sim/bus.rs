//! # Simulated LANC Bus
//!
//! Software stand-in for the hardware behind [`LancLine`]:
//!
//! - the open-collector line, low whenever either side pulls it low
//! - an 8-bit shift-capture unit clocked mid-cell, shifting the line level
//!   in from the bottom and overflowing after 8 clocks
//! - a camera that answers each released start bit with the next byte of its
//!   current frame, LSB first, pulling the line low for a 1
//!
//! The camera finds byte 0 of a frame from the idle gap: a start bit more
//! than two byte slots after the previous one begins a new frame.

use std::collections::VecDeque;

use crate::lanc::line::LancLine;
use crate::lanc::protocol::{BIT_SLOTS_PER_BYTE, DATA_BITS, RECEIVE_SLOTS};

/// Cells of silence after which the camera treats the next start bit as byte 0
const FRAME_GAP_CELLS: u32 = 2 * BIT_SLOTS_PER_BYTE as u32;

/// Shift-capture unit model
#[derive(Debug, Clone, Default)]
pub struct ShiftCapture {
    armed: bool,
    shift: u8,
    count: u8,
    buffer: u8,
    overflowed: bool,
}

impl ShiftCapture {
    fn arm(&mut self) {
        self.armed = true;
        self.count = 0;
        self.overflowed = false;
    }

    fn disarm(&mut self) {
        self.armed = false;
    }

    /// Shift in one line level; returns true when the overflow interrupt fires
    fn clock(&mut self, line_high: bool) -> bool {
        if !self.armed {
            return false;
        }

        self.shift = (self.shift << 1) | line_high as u8;
        self.count += 1;

        if self.count == DATA_BITS {
            self.count = 0;
            self.buffer = self.shift;
            self.overflowed = true;
            return true;
        }

        false
    }

    /// True while armed
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// True once a full byte has been shifted in since arming
    pub fn has_overflowed(&self) -> bool {
        self.overflowed
    }
}

/// Camera side of the bus
#[derive(Debug, Clone)]
pub struct CameraEmulator {
    frames: VecDeque<[u8; 2]>,
    idle: [u8; 2],
    current: [u8; 2],
    byte_index: u8,
    sending: Option<(u8, u8)>,
    cells_since_start: u32,
    frames_sent: u64,
}

impl CameraEmulator {
    fn new(idle: [u8; 2]) -> Self {
        Self {
            frames: VecDeque::new(),
            idle,
            current: idle,
            byte_index: 0,
            sending: None,
            cells_since_start: u32::MAX,
            frames_sent: 0,
        }
    }

    fn on_start_released(&mut self) {
        if self.cells_since_start > FRAME_GAP_CELLS {
            self.byte_index = 0;
            self.current = self.frames.pop_front().unwrap_or(self.idle);
            self.frames_sent += 1;
        } else {
            self.byte_index = self.byte_index.saturating_add(1);
        }
        self.cells_since_start = 0;

        self.sending = if self.byte_index < RECEIVE_SLOTS {
            Some((self.current[self.byte_index as usize], 0))
        } else {
            None
        };
    }

    fn advance_cell(&mut self) {
        self.cells_since_start = self.cells_since_start.saturating_add(1);

        self.sending = match self.sending {
            Some((byte, bit)) if bit + 1 < DATA_BITS => Some((byte, bit + 1)),
            _ => None,
        };
    }

    fn pulling_low(&self) -> bool {
        match self.sending {
            Some((byte, bit)) => (byte >> bit) & 1 == 1,
            None => false,
        }
    }

    /// Frames still queued
    pub fn pending(&self) -> usize {
        self.frames.len()
    }

    /// Frames the camera has started sending
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }
}

/// Line, sampler and camera in one
#[derive(Debug, Clone)]
pub struct SimulatedBus {
    receiver_low: bool,
    sampler: ShiftCapture,
    camera: CameraEmulator,
    start_bits: u64,
}

impl SimulatedBus {
    /// Create a bus whose camera sends `idle` when it has nothing queued
    pub fn new(idle: [u8; 2]) -> Self {
        Self {
            receiver_low: false,
            sampler: ShiftCapture::default(),
            camera: CameraEmulator::new(idle),
            start_bits: 0,
        }
    }

    /// Queue a two-byte frame for the camera to send
    pub fn enqueue(&mut self, bytes: [u8; 2]) {
        self.camera.frames.push_back(bytes);
    }

    /// Bit-cell boundary, called before the bit-slot tick handler
    pub fn begin_cell(&mut self) {
        self.camera.advance_cell();
    }

    /// Sampler clock, half a bit after the tick
    ///
    /// Returns true if the completion interrupt should run.
    pub fn sampler_clock(&mut self) -> bool {
        let level = self.line_high();
        self.sampler.clock(level)
    }

    /// Current line level (true = high / idle)
    pub fn line_high(&self) -> bool {
        !(self.receiver_low || self.camera.pulling_low())
    }

    /// True while the receiver holds the start bit
    pub fn receiver_driving(&self) -> bool {
        self.receiver_low
    }

    /// Start bits the receiver has generated
    pub fn start_bits(&self) -> u64 {
        self.start_bits
    }

    /// Shift-capture unit state
    pub fn sampler(&self) -> &ShiftCapture {
        &self.sampler
    }

    /// Camera state
    pub fn camera(&self) -> &CameraEmulator {
        &self.camera
    }
}

impl Default for SimulatedBus {
    fn default() -> Self {
        Self::new([0x00, 0x00])
    }
}

impl LancLine for SimulatedBus {
    fn assert_line(&mut self) {
        self.receiver_low = true;
        self.start_bits += 1;
    }

    fn release_line(&mut self) {
        if self.receiver_low {
            self.receiver_low = false;
            self.camera.on_start_released();
        }
    }

    fn arm_sampler(&mut self) {
        self.sampler.arm();
    }

    fn disarm_sampler(&mut self) {
        self.sampler.disarm();
    }

    fn read_sampled_byte(&mut self) -> u8 {
        self.sampler.buffer
    }
}
