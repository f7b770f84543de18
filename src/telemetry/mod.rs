//! # Telemetry Module
//!
//! Handles actuator logging to JSONL files with rotation.
//!
//! This module handles:
//! - Recording every command the motor controller applies
//! - Formatting as JSONL (JSON Lines)
//! - Managing file rotation (max N records per file)
//! - Retaining only last M files

pub mod logger;

pub use logger::{ActuatorRecord, TelemetryLogger};
