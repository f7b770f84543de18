//! # LANC Zoom Library
//!
//! Drive a zoom motor from a camera's LANC bus.
//!
//! This library provides the interrupt-side LANC receiver (frame timing,
//! start-bit generation, byte capture), the background command interpreter
//! that turns captured frames into motor direction and PWM duty, and a host
//! simulation of the bus for testing both.

pub mod config;
pub mod error;
pub mod lanc;
pub mod motor;
pub mod sim;
pub mod telemetry;
