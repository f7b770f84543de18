//! # JSONL Actuator Logger
//!
//! Writes one JSON object per line for every command the motor controller
//! applies, rotating to a new file after a fixed number of records and
//! deleting the oldest files beyond the retention limit.
//!
//! Files are named `lanc-<UTC timestamp>-<sequence>.jsonl`, so name order is
//! creation order.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::TelemetryConfig;
use crate::error::Result;
use crate::motor::{ActuatorState, Command, OutputPins};
use crate::sim::AppliedCommand;

/// One applied command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActuatorRecord {
    pub timestamp: DateTime<Utc>,
    pub frame: u64,
    pub tick: u64,
    #[serde(flatten)]
    pub command: Command,
    pub duty: u8,
    pub forward: bool,
    pub reverse: bool,
    pub indicator: bool,
}

impl ActuatorRecord {
    /// Build a record for a command applied during `frame`
    pub fn new(frame: u64, applied: &AppliedCommand, state: ActuatorState) -> Self {
        Self {
            timestamp: Utc::now(),
            frame,
            tick: applied.tick,
            command: applied.command,
            duty: state.duty,
            forward: state.outputs.contains(OutputPins::FORWARD),
            reverse: state.outputs.contains(OutputPins::REVERSE),
            indicator: state.outputs.contains(OutputPins::INDICATOR),
        }
    }
}

/// Rotating JSONL writer
pub struct TelemetryLogger {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    files_created: u64,
}

impl TelemetryLogger {
    /// Create a logger writing into `config.log_dir`
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        let dir = PathBuf::from(&config.log_dir);
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            max_records_per_file: config.max_records_per_file,
            max_files_to_keep: config.max_files_to_keep,
            writer: None,
            records_in_file: 0,
            files_created: 0,
        })
    }

    /// Append a record, rotating first if the current file is full
    pub fn log(&mut self, record: &ActuatorRecord) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        if let Some(writer) = self.writer.as_mut() {
            serde_json::to_writer(&mut *writer, record)?;
            writer.write_all(b"\n")?;
            self.records_in_file += 1;
        }

        Ok(())
    }

    /// Flush buffered records to disk
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Directory the logger writes into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn rotate(&mut self) -> Result<()> {
        self.flush()?;

        let name = format!(
            "lanc-{}-{:04}.jsonl",
            Utc::now().format("%Y%m%dT%H%M%S"),
            self.files_created
        );
        let path = self.dir.join(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        debug!("Opened telemetry file {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;
        self.files_created += 1;

        self.prune()
    }

    fn prune(&self) -> Result<()> {
        let mut files = log_files(&self.dir)?;
        files.sort();

        while files.len() > self.max_files_to_keep {
            let oldest = files.remove(0);
            if let Err(e) = fs::remove_file(&oldest) {
                warn!("Failed to remove {}: {}", oldest.display(), e);
            }
        }

        Ok(())
    }
}

impl Drop for TelemetryLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to flush telemetry: {}", e);
        }
    }
}

/// Telemetry files in `dir`
pub fn log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with("lanc-") && n.ends_with(".jsonl"))
            .unwrap_or(false);

        if is_log {
            files.push(path);
        }
    }

    Ok(files)
}
