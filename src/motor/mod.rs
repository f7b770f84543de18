//! # Motor Module
//!
//! Zoom motor control from decoded LANC frames.
//!
//! This module handles:
//! - Decoding the two-byte command into direction and speed
//! - Mapping the speed index through the duty table
//! - Driving the PWM duty and the direction / indicator outputs

pub mod command;
pub mod driver;

pub use command::{Command, Direction, SpeedTable};
pub use driver::{Actuator, ActuatorState, MotorController, OutputPins};
