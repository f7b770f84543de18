//! # Simulation Session
//!
//! Runs a configured script through the [`Simulator`], frame by frame, paced
//! at the real frame period or as fast as possible, until the script runs out
//! or shutdown is requested.

use std::future::Future;

use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::runner::{FrameReport, Simulator};
use super::{SimActuator, SimulatedBus};
use crate::config::Config;
use crate::error::Result;
use crate::lanc::protocol::FRAME_PERIOD_US;
use crate::motor::{ActuatorState, Command};
use crate::telemetry::{ActuatorRecord, TelemetryLogger};

/// Number of frames between status log messages (~1 second)
const LOG_INTERVAL_FRAMES: u64 = 50;

/// Totals at the end of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u64,
    pub commands_applied: u64,
    pub overruns: u32,
    pub final_state: ActuatorState,
    pub interrupted: bool,
}

/// Scripted simulation with optional telemetry
pub struct Session {
    sim: Simulator<SimActuator>,
    telemetry: Option<TelemetryLogger>,
    frames_to_run: u64,
    last_state: ActuatorState,
    last_overruns: u32,
}

impl Session {
    /// Build a session from configuration, queueing the whole script
    ///
    /// # Errors
    ///
    /// Returns error if the speed table is invalid or the telemetry
    /// directory cannot be created
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut bus = SimulatedBus::new(Command::Stop.encode());
        let mut frames_to_run = config.simulation.idle_frames as u64;

        for step in &config.simulation.script {
            let bytes = step.to_command().encode();
            for _ in 0..step.frames {
                bus.enqueue(bytes);
            }
            frames_to_run += step.frames as u64;
        }

        let telemetry = if config.telemetry.enabled {
            Some(TelemetryLogger::new(&config.telemetry)?)
        } else {
            None
        };

        debug!(
            "Session: {} script steps, {} frames",
            config.simulation.script.len(),
            frames_to_run
        );

        Ok(Self {
            sim: Simulator::new(bus, SimActuator::default(), config.speed_table()?),
            telemetry,
            frames_to_run,
            last_state: ActuatorState::OFF,
            last_overruns: 0,
        })
    }

    /// Simulate one frame, logging changes and writing telemetry
    pub fn step_frame(&mut self) -> Result<FrameReport> {
        let report = self.sim.run_frame();
        let state = self.sim.controller().state();

        for applied in &report.applied {
            if state != self.last_state {
                info!(
                    "Frame {}: {:?} -> duty {}, outputs {:?}",
                    report.frame, applied.command, state.duty, state.outputs
                );
            }

            if let Some(logger) = self.telemetry.as_mut() {
                logger.log(&ActuatorRecord::new(report.frame, applied, state))?;
            }
        }
        self.last_state = state;

        if report.overruns > self.last_overruns {
            warn!(
                "Frame {}: {} frame(s) overwritten before being read",
                report.frame,
                report.overruns - self.last_overruns
            );
            self.last_overruns = report.overruns;
        }

        if (report.frame + 1) % LOG_INTERVAL_FRAMES == 0 {
            info!(
                "Simulated {} frames ({} ticks), {} commands applied",
                report.frame + 1,
                self.sim.ticks(),
                self.sim.controller().commands_applied()
            );
        }

        Ok(report)
    }

    /// Run the remaining frames
    ///
    /// # Arguments
    ///
    /// * `realtime` - Wait one frame period between frames
    /// * `shutdown` - Completes when the session should stop early
    pub async fn run<F: Future<Output = ()>>(
        &mut self,
        realtime: bool,
        shutdown: F,
    ) -> Result<SessionSummary> {
        let mut frame_interval = interval(Duration::from_micros(FRAME_PERIOD_US as u64));
        frame_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);
        let mut interrupted = false;

        while self.sim.frames() < self.frames_to_run {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested after {} frames", self.sim.frames());
                    interrupted = true;
                    break;
                }
                _ = pace(&mut frame_interval, realtime) => {
                    self.step_frame()?;
                }
            }
        }

        if let Some(logger) = self.telemetry.as_mut() {
            logger.flush()?;
        }

        Ok(self.summary(interrupted))
    }

    /// Totals so far
    pub fn summary(&self, interrupted: bool) -> SessionSummary {
        SessionSummary {
            frames: self.sim.frames(),
            commands_applied: self.sim.controller().commands_applied(),
            overruns: self.sim.receiver().handoff().overruns(),
            final_state: self.sim.controller().state(),
            interrupted,
        }
    }

    /// Frames the script and idle tail add up to
    pub fn frames_to_run(&self) -> u64 {
        self.frames_to_run
    }

    /// Underlying simulator
    pub fn simulator(&self) -> &Simulator<SimActuator> {
        &self.sim
    }
}

async fn pace(frame_interval: &mut tokio::time::Interval, realtime: bool) {
    if realtime {
        frame_interval.tick().await;
    } else {
        tokio::task::yield_now().await;
    }
}
