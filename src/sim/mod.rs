//! # Simulation Module
//!
//! Host-side model of the LANC bus so the receiver can be exercised without
//! a device.
//!
//! This module handles:
//! - Emulating the camera, the open-collector line and the shift-capture unit
//! - Running the receiver and motor controller in device event order
//! - Recording actuator output for inspection
//! - Running a configured script in real time

pub mod bus;
pub mod runner;
pub mod session;

pub use bus::SimulatedBus;
pub use runner::{AppliedCommand, FrameReport, Simulator};
pub use session::{Session, SessionSummary};

use crate::motor::{Actuator, ActuatorState, OutputPins};

/// Actuator that keeps its register values in memory
#[derive(Debug, Clone)]
pub struct SimActuator {
    /// Current PWM duty
    pub duty: u8,
    /// Current discrete outputs
    pub outputs: OutputPins,
    /// Every output write, with the duty in effect at the time
    pub history: Vec<ActuatorState>,
}

impl SimActuator {
    /// Current outputs as a state value
    pub fn state(&self) -> ActuatorState {
        ActuatorState {
            duty: self.duty,
            outputs: self.outputs,
        }
    }
}

impl Default for SimActuator {
    fn default() -> Self {
        Self {
            duty: 0,
            outputs: OutputPins::empty(),
            history: Vec::new(),
        }
    }
}

impl Actuator for SimActuator {
    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
    }

    fn set_outputs(&mut self, outputs: OutputPins) {
        self.outputs = outputs;
        self.history.push(self.state());
    }
}
