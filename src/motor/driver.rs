//! # Motor Driver
//!
//! Background consumer of the frame hand-off. Applies each decoded command
//! to the PWM duty register and the direction / indicator outputs.
//!
//! ## Output Truth Table
//!
//! | Command | FORWARD | REVERSE | INDICATOR | Duty |
//! |---------|---------|---------|-----------|------|
//! | Stop | 0 | 0 | 0 | 0 |
//! | Move forward | 1 | 0 | 1 | table[speed] |
//! | Move reverse | 0 | 1 | 1 | table[speed] |

use std::sync::Arc;

use bitflags::bitflags;
use tracing::{debug, trace};

use super::command::{Command, Direction, SpeedTable};
use crate::lanc::FrameHandoff;

bitflags! {
    /// Discrete outputs, laid out like the device's output port
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OutputPins: u8 {
        /// H-bridge forward inputs
        const FORWARD = 1 << 1;
        /// H-bridge reverse inputs
        const REVERSE = 1 << 2;
        /// Status LED
        const INDICATOR = 1 << 3;
    }
}

/// PWM and discrete outputs driven by the controller
#[cfg_attr(test, mockall::automock)]
pub trait Actuator {
    /// Write the PWM duty register (0 = off, 255 = full)
    fn set_duty(&mut self, duty: u8);

    /// Write all discrete outputs at once
    fn set_outputs(&mut self, outputs: OutputPins);
}

/// Output values for one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorState {
    /// PWM duty
    pub duty: u8,
    /// Direction and indicator outputs
    pub outputs: OutputPins,
}

impl ActuatorState {
    /// Everything off
    pub const OFF: ActuatorState = ActuatorState {
        duty: 0,
        outputs: OutputPins::empty(),
    };

    /// Outputs a command maps to
    pub fn for_command(command: Command, speeds: &SpeedTable) -> Self {
        match command {
            Command::Stop => Self::OFF,
            Command::Move {
                direction,
                speed_index,
            } => {
                let dir = match direction {
                    Direction::Forward => OutputPins::FORWARD,
                    Direction::Reverse => OutputPins::REVERSE,
                };
                Self {
                    duty: speeds.duty(speed_index),
                    outputs: dir | OutputPins::INDICATOR,
                }
            }
        }
    }
}

/// Command interpreter driving an [`Actuator`]
pub struct MotorController<A> {
    actuator: A,
    speeds: SpeedTable,
    handoff: Arc<FrameHandoff>,
    state: ActuatorState,
    commands_applied: u64,
}

impl<A: Actuator> MotorController<A> {
    /// Create a controller reading from `handoff`
    ///
    /// Outputs are assumed off until the first frame arrives.
    pub fn new(actuator: A, speeds: SpeedTable, handoff: Arc<FrameHandoff>) -> Self {
        Self {
            actuator,
            speeds,
            handoff,
            state: ActuatorState::OFF,
            commands_applied: 0,
        }
    }

    /// Consume a waiting frame, if any, and apply it
    ///
    /// Returns the applied command. Returns `None` when no frame completed
    /// since the previous call, in which case the outputs are untouched.
    pub fn poll(&mut self) -> Option<Command> {
        let bytes = self.handoff.take()?;
        let command = Command::decode(bytes);
        self.apply(command);
        Some(command)
    }

    /// Drive the outputs for a command
    pub fn apply(&mut self, command: Command) {
        let state = ActuatorState::for_command(command, &self.speeds);

        self.actuator.set_duty(state.duty);
        self.actuator.set_outputs(state.outputs);

        if state != self.state {
            debug!(
                "Applied {:?}: duty {} outputs {:?}",
                command, state.duty, state.outputs
            );
        } else {
            trace!("Repeated {:?}", command);
        }

        self.state = state;
        self.commands_applied += 1;
    }

    /// Outputs last written
    pub fn state(&self) -> ActuatorState {
        self.state
    }

    /// Number of frames applied since construction
    pub fn commands_applied(&self) -> u64 {
        self.commands_applied
    }

    /// Speed table in use
    pub fn speeds(&self) -> &SpeedTable {
        &self.speeds
    }

    /// Actuator access
    pub fn actuator(&self) -> &A {
        &self.actuator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn handoff_with(bytes: [u8; 2]) -> Arc<FrameHandoff> {
        let handoff = Arc::new(FrameHandoff::new());
        handoff.store(0, bytes[0]);
        handoff.store(1, bytes[1]);
        handoff
    }

    #[test]
    fn test_state_for_stop() {
        let state = ActuatorState::for_command(Command::Stop, &SpeedTable::default());
        assert_eq!(state, ActuatorState::OFF);
    }

    #[test]
    fn test_state_for_move() {
        let state = ActuatorState::for_command(
            Command::Move {
                direction: Direction::Reverse,
                speed_index: 7,
            },
            &SpeedTable::default(),
        );
        assert_eq!(state.duty, 255);
        assert_eq!(state.outputs, OutputPins::REVERSE | OutputPins::INDICATOR);
        assert!(!state.outputs.contains(OutputPins::FORWARD));
    }

    #[test]
    fn test_move_forward_sets_duty_then_outputs() {
        let mut actuator = MockActuator::new();
        let mut seq = Sequence::new();
        actuator
            .expect_set_duty()
            .with(eq(2))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        actuator
            .expect_set_outputs()
            .with(eq(OutputPins::FORWARD | OutputPins::INDICATOR))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let mut controller =
            MotorController::new(actuator, SpeedTable::default(), handoff_with([0x28, 0x00]));

        assert_eq!(
            controller.poll(),
            Some(Command::Move {
                direction: Direction::Forward,
                speed_index: 0
            })
        );
    }

    #[test]
    fn test_stop_clears_everything() {
        let mut actuator = MockActuator::new();
        actuator.expect_set_duty().with(eq(0)).times(1).return_const(());
        actuator
            .expect_set_outputs()
            .with(eq(OutputPins::empty()))
            .times(1)
            .return_const(());

        let mut controller =
            MotorController::new(actuator, SpeedTable::default(), handoff_with([0x00, 0x5A]));

        assert_eq!(controller.poll(), Some(Command::Stop));
        assert_eq!(controller.state(), ActuatorState::OFF);
    }

    #[test]
    fn test_poll_without_frame_touches_nothing() {
        let mut actuator = MockActuator::new();
        actuator.expect_set_duty().times(0);
        actuator.expect_set_outputs().times(0);

        let mut controller =
            MotorController::new(actuator, SpeedTable::default(), Arc::new(FrameHandoff::new()));

        assert_eq!(controller.poll(), None);
        assert_eq!(controller.commands_applied(), 0);
    }

    #[test]
    fn test_same_frame_is_applied_once() {
        let mut actuator = MockActuator::new();
        actuator.expect_set_duty().times(1).return_const(());
        actuator.expect_set_outputs().times(1).return_const(());

        let mut controller =
            MotorController::new(actuator, SpeedTable::default(), handoff_with([0x28, 0x12]));

        assert!(controller.poll().is_some());
        assert!(controller.poll().is_none());
        assert_eq!(controller.commands_applied(), 1);
    }

    #[test]
    fn test_custom_speed_table() {
        let mut actuator = MockActuator::new();
        actuator.expect_set_duty().with(eq(90)).times(1).return_const(());
        actuator.expect_set_outputs().times(1).return_const(());

        let speeds = SpeedTable::new(&[10, 20, 30, 40, 50, 60, 70, 90]).unwrap();
        let mut controller = MotorController::new(actuator, speeds, handoff_with([0x28, 0x0E]));

        controller.poll();
        assert_eq!(controller.state().duty, 90);
    }
}
