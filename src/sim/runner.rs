//! # Simulation Runner
//!
//! Drives a [`LancReceiver`] over a [`SimulatedBus`] one bit period at a time,
//! in the same order the device sees its events:
//!
//! 1. bit-cell boundary on the bus
//! 2. bit-slot tick handler
//! 3. half a bit later, the sampler clock and, if it overflowed, the capture
//!    completion handler
//! 4. background poll of the motor controller

use std::sync::Arc;

use super::bus::SimulatedBus;
use crate::lanc::protocol::{FrameCursor, TICKS_PER_FRAME};
use crate::lanc::{FrameHandoff, LancReceiver};
use crate::motor::{Actuator, Command, MotorController, SpeedTable};

/// Command applied during a simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedCommand {
    /// Ticks since the simulation started, counting the one that applied it
    pub tick: u64,
    /// Slot handled by that tick
    pub slot: FrameCursor,
    /// Decoded command
    pub command: Command,
}

/// Summary of one simulated frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    /// Zero-based frame number
    pub frame: u64,
    /// Commands applied while the frame ran
    pub applied: Vec<AppliedCommand>,
    /// Frames completed by the receiver so far
    pub frames_completed: u32,
    /// Overruns recorded by the hand-off so far
    pub overruns: u32,
}

/// Receiver, bus and motor controller wired together
pub struct Simulator<A> {
    receiver: LancReceiver<SimulatedBus>,
    controller: MotorController<A>,
    ticks: u64,
    frames: u64,
}

impl<A: Actuator> Simulator<A> {
    /// Create a simulator at power-on
    ///
    /// # Arguments
    ///
    /// * `bus` - Simulated bus, possibly with frames already queued
    /// * `actuator` - Output sink for the motor controller
    /// * `speeds` - Duty table
    pub fn new(bus: SimulatedBus, actuator: A, speeds: SpeedTable) -> Self {
        let handoff = Arc::new(FrameHandoff::new());
        Self {
            receiver: LancReceiver::new(bus, Arc::clone(&handoff)),
            controller: MotorController::new(actuator, speeds, handoff),
            ticks: 0,
            frames: 0,
        }
    }

    /// Queue a command for the camera to send in one frame
    pub fn enqueue(&mut self, command: Command) {
        self.bus_mut().enqueue(command.encode());
    }

    /// Simulate one bit period, returning the command applied by the
    /// background poll, if any
    pub fn step_bit(&mut self) -> Option<AppliedCommand> {
        let slot = self.receiver.cursor();

        self.receiver.line_mut().begin_cell();
        self.receiver.on_bit_tick();

        if self.receiver.line_mut().sampler_clock() {
            self.receiver.on_capture_complete();
        }

        self.ticks += 1;

        self.controller.poll().map(|command| AppliedCommand {
            tick: self.ticks,
            slot,
            command,
        })
    }

    /// Simulate the remainder of the current frame
    pub fn run_frame(&mut self) -> FrameReport {
        let mut applied = Vec::new();

        loop {
            if let Some(cmd) = self.step_bit() {
                applied.push(cmd);
            }
            if self.receiver.cursor() == FrameCursor::default() {
                break;
            }
        }

        let report = FrameReport {
            frame: self.frames,
            applied,
            frames_completed: self.receiver.handoff().frames_completed(),
            overruns: self.receiver.handoff().overruns(),
        };
        self.frames += 1;
        report
    }

    /// Ticks simulated so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Frames simulated so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Receiver access
    pub fn receiver(&self) -> &LancReceiver<SimulatedBus> {
        &self.receiver
    }

    /// Motor controller access
    pub fn controller(&self) -> &MotorController<A> {
        &self.controller
    }

    /// Bus access
    pub fn bus(&self) -> &SimulatedBus {
        self.receiver.line()
    }

    /// Mutable bus access
    pub fn bus_mut(&mut self) -> &mut SimulatedBus {
        self.receiver.line_mut()
    }
}

/// Ticks per frame, as a `u64` for tick arithmetic
pub const FRAME_TICKS: u64 = TICKS_PER_FRAME as u64;
