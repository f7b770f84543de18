//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{LancError, Result};
use crate::lanc::protocol::{BIT_PERIOD_US, NOMINAL_BAUD_RATE};
use crate::motor::command::{Command, Direction, SpeedTable, DEFAULT_SPEEDS, SPEED_STEPS};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub motor: MotorConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Bit-slot timer configuration
///
/// The timer runs in clear-on-compare mode: compare A resets it once per bit
/// and clocks the sampler, compare B fires half a bit earlier and drives the
/// bit-slot tick.
#[derive(Debug, Deserialize, Clone)]
pub struct TimerConfig {
    #[serde(default = "default_cpu_hz")]
    pub cpu_hz: u32,

    #[serde(default = "default_prescaler")]
    pub prescaler: u32,

    #[serde(default = "default_bit_period_us")]
    pub bit_period_us: u32,
}

/// Motor configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MotorConfig {
    #[serde(default = "default_speeds")]
    pub speeds: Vec<u8>,
}

/// Simulation configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    /// Pace frames at the real frame period instead of running flat out
    #[serde(default = "default_realtime")]
    pub realtime: bool,

    /// Stop frames sent after the script finishes
    #[serde(default = "default_idle_frames")]
    pub idle_frames: u32,

    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

/// One scripted camera command, repeated for a number of frames
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    pub command: ScriptCommand,

    #[serde(default = "default_direction")]
    pub direction: Direction,

    #[serde(default)]
    pub speed: u8,

    #[serde(default = "default_step_frames")]
    pub frames: u32,
}

/// Command kind in a script step
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScriptCommand {
    Move,
    Stop,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write logs to this file, if set
    #[serde(default)]
    pub file: Option<String>,
}

// Default value functions
fn default_cpu_hz() -> u32 { 8_000_000 }
fn default_prescaler() -> u32 { 8 }
fn default_bit_period_us() -> u32 { BIT_PERIOD_US }

fn default_speeds() -> Vec<u8> { DEFAULT_SPEEDS.to_vec() }

fn default_realtime() -> bool { true }
fn default_idle_frames() -> u32 { 5 }
fn default_direction() -> Direction { Direction::Forward }
fn default_step_frames() -> u32 { 1 }

fn default_telemetry_enabled() -> bool { false }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_format() -> String { "jsonl".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            cpu_hz: default_cpu_hz(),
            prescaler: default_prescaler(),
            bit_period_us: default_bit_period_us(),
        }
    }
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self { speeds: default_speeds() }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            realtime: default_realtime(),
            idle_frames: default_idle_frames(),
            script: Vec::new(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            format: default_log_format(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl TimerConfig {
    /// Timer counts per bit period
    pub fn counts_per_bit(&self) -> u64 {
        self.cpu_hz as u64 * self.bit_period_us as u64 / self.prescaler as u64 / 1_000_000
    }

    /// Compare A value: the timer resets here, once per bit
    ///
    /// # Errors
    ///
    /// Returns error if the value does not fit the 8-bit timer
    pub fn compare_a(&self) -> Result<u8> {
        let counts = self.counts_per_bit();
        if counts < 2 || counts > 256 {
            return Err(LancError::Timer(format!(
                "{} counts per bit does not fit an 8-bit timer (cpu_hz {}, prescaler {}, bit_period_us {})",
                counts, self.cpu_hz, self.prescaler, self.bit_period_us
            )));
        }
        Ok((counts - 1) as u8)
    }

    /// Compare B value: half a bit before compare A
    pub fn compare_b(&self) -> Result<u8> {
        let a = self.compare_a()? as u16;
        Ok(((a + 1) / 2 - 1) as u8)
    }

    /// Bit rate actually produced by the timer
    pub fn actual_baud_rate(&self) -> f64 {
        self.cpu_hz as f64 / self.prescaler as f64 / self.counts_per_bit() as f64
    }

    /// Deviation from the nominal 9600 bit/s, in percent
    pub fn baud_error_percent(&self) -> f64 {
        (self.actual_baud_rate() / NOMINAL_BAUD_RATE as f64 - 1.0) * 100.0
    }
}

impl ScriptStep {
    /// Command the camera sends for this step
    pub fn to_command(&self) -> Command {
        match self.command {
            ScriptCommand::Stop => Command::Stop,
            ScriptCommand::Move => Command::Move {
                direction: self.direction,
                speed_index: self.speed,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            motor: MotorConfig::default(),
            simulation: SimulationConfig::default(),
            telemetry: TelemetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use lanc_zoom::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Speed table built from `[motor] speeds`
    pub fn speed_table(&self) -> Result<SpeedTable> {
        SpeedTable::new(&self.motor.speeds)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.timer.cpu_hz == 0 || self.timer.prescaler == 0 || self.timer.bit_period_us == 0 {
            return Err(LancError::Config(toml::de::Error::custom(
                "cpu_hz, prescaler and bit_period_us must be greater than 0",
            )));
        }

        if ![1, 8, 64, 256, 1024].contains(&self.timer.prescaler) {
            return Err(LancError::Config(toml::de::Error::custom(
                "prescaler must be one of: 1, 8, 64, 256, 1024",
            )));
        }

        self.timer.compare_a()?;

        // Beyond ±2% the sampling point drifts out of the last data cell
        if self.timer.baud_error_percent().abs() > 2.0 {
            return Err(LancError::Timer(format!(
                "bit rate {:.0} is more than 2% away from {}",
                self.timer.actual_baud_rate(),
                NOMINAL_BAUD_RATE
            )));
        }

        if self.motor.speeds.len() != SPEED_STEPS {
            return Err(LancError::Config(toml::de::Error::custom(format!(
                "speeds must have exactly {} entries",
                SPEED_STEPS
            ))));
        }
        self.speed_table()?;

        for step in &self.simulation.script {
            if step.speed > 7 {
                return Err(LancError::Config(toml::de::Error::custom(format!(
                    "script speed {} is out of range (must be 0-7)",
                    step.speed
                ))));
            }
            if step.frames == 0 {
                return Err(LancError::Config(toml::de::Error::custom(
                    "script frames must be greater than 0",
                )));
            }
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(LancError::Config(toml::de::Error::custom(
                "telemetry log_dir cannot be empty when enabled",
            )));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(LancError::Config(toml::de::Error::custom(
                "max_records_per_file must be greater than 0",
            )));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(LancError::Config(toml::de::Error::custom(
                "max_files_to_keep must be greater than 0",
            )));
        }

        if self.telemetry.format != "jsonl" {
            return Err(LancError::Config(toml::de::Error::custom(
                "log format must be 'jsonl' (only supported format)",
            )));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(LancError::Config(toml::de::Error::custom(
                "logging level must be one of: trace, debug, info, warn, error",
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.speed_table().unwrap(), SpeedTable::default());
    }

    #[test]
    fn test_default_timer_matches_protocol() {
        let timer = TimerConfig::default();
        assert_eq!(timer.counts_per_bit(), 104);
        assert_eq!(timer.compare_a().unwrap(), 103);
        assert_eq!(timer.compare_b().unwrap(), 51);
    }

    #[test]
    fn test_default_timer_is_slightly_fast() {
        let timer = TimerConfig::default();
        let error = timer.baud_error_percent();
        assert!(error > 0.15 && error < 0.17, "error was {}", error);
    }

    #[test]
    fn test_timer_overflowing_eight_bits() {
        let mut config = Config::default();
        config.timer.prescaler = 1;
        assert!(matches!(config.validate(), Err(LancError::Timer(_))));
    }

    #[test]
    fn test_unsupported_prescaler() {
        let mut config = Config::default();
        config.timer.prescaler = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bit_rate_too_far_off() {
        let mut config = Config::default();
        config.timer.bit_period_us = 110;
        assert!(matches!(config.validate(), Err(LancError::Timer(_))));
    }

    #[test]
    fn test_other_clock_same_bit_period() {
        let mut config = Config::default();
        config.timer.cpu_hz = 16_000_000;
        config.timer.prescaler = 64;
        // 16 MHz / 64 = 250 kHz, 26 counts per bit: 9615 bit/s again
        assert!(config.validate().is_ok());
        assert_eq!(config.timer.compare_a().unwrap(), 25);
        assert_eq!(config.timer.compare_b().unwrap(), 12);
    }

    #[test]
    fn test_wrong_speed_count() {
        let mut config = Config::default();
        config.motor.speeds = vec![1, 2, 3];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_decreasing_speeds() {
        let mut config = Config::default();
        config.motor.speeds = vec![255, 128, 64, 32, 16, 8, 4, 2];
        assert!(matches!(config.validate(), Err(LancError::SpeedTable(_))));
    }

    #[test]
    fn test_script_speed_out_of_range() {
        let mut config = Config::default();
        config.simulation.script.push(ScriptStep {
            command: ScriptCommand::Move,
            direction: Direction::Forward,
            speed: 8,
            frames: 1,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_script_zero_frames() {
        let mut config = Config::default();
        config.simulation.script.push(ScriptStep {
            command: ScriptCommand::Stop,
            direction: Direction::Forward,
            speed: 0,
            frames: 0,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_enabled() {
        let mut config = Config::default();
        config.telemetry.enabled = true;
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_disabled() {
        let mut config = Config::default();
        config.telemetry.enabled = false;
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.telemetry.format = "csv".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_script_step_commands() {
        let step = ScriptStep {
            command: ScriptCommand::Move,
            direction: Direction::Reverse,
            speed: 7,
            frames: 3,
        };
        assert_eq!(
            step.to_command(),
            Command::Move {
                direction: Direction::Reverse,
                speed_index: 7
            }
        );

        let stop = ScriptStep {
            command: ScriptCommand::Stop,
            ..step
        };
        assert_eq!(stop.to_command(), Command::Stop);
    }

    #[test]
    fn test_parse_script() {
        let toml_content = r#"
[simulation]
realtime = false

[[simulation.script]]
command = "move"
direction = "reverse"
speed = 7
frames = 10

[[simulation.script]]
command = "stop"
"#;

        let config = Config::from_toml(toml_content).unwrap();
        assert!(!config.simulation.realtime);
        assert_eq!(config.simulation.script.len(), 2);
        assert_eq!(config.simulation.script[0].frames, 10);
        assert_eq!(config.simulation.script[0].direction, Direction::Reverse);
        assert_eq!(config.simulation.script[1].command, ScriptCommand::Stop);
        assert_eq!(config.simulation.script[1].frames, 1);
    }

    #[test]
    fn test_unknown_command_rejected() {
        let toml_content = r#"
[[simulation.script]]
command = "jump"
"#;
        assert!(matches!(
            Config::from_toml(toml_content),
            Err(LancError::Config(_))
        ));
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[timer]
cpu_hz = 8000000

[motor]
speeds = [1, 2, 4, 8, 16, 32, 64, 128]

[telemetry]

[logging]
level = "debug"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.speed_table().unwrap().duty(7), 128);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/lanc-zoom.toml");
        assert!(matches!(result, Err(LancError::Io(_))));
    }
}
