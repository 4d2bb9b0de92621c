//! Command Log
//!
//! Append-only audit trail of submitted commands. Each record carries an
//! ISO-8601 timestamp and the raw input line. The full ordered sequence is
//! handed to the sink after every append; the JSON sink rewrites its file
//! in full each time, which is acceptable for small histories.

use std::path::PathBuf;

use chrono::{Local, SecondsFormat};
use serde::Serialize;
use thiserror::Error;

/// Log persistence errors. Losing the audit trail is fatal to the process.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("cannot write command log: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot serialize command log: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One logged command.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub command: String,
}

impl LogRecord {
    /// Stamp `command` with the current local time.
    pub fn new(command: &str) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            command: command.to_string(),
        }
    }
}

/// Destination for the persisted log.
pub trait LogSink {
    /// Persist the full ordered record sequence.
    fn persist(&mut self, records: &[LogRecord]) -> Result<(), LogError>;
}

/// Sink that rewrites a JSON array file on every persist.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LogSink for JsonFileSink {
    fn persist(&mut self, records: &[LogRecord]) -> Result<(), LogError> {
        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// The interpreter-owned log: the record sequence plus the sink it flows to.
pub struct CommandLog {
    records: Vec<LogRecord>,
    sink: Box<dyn LogSink>,
}

impl CommandLog {
    pub fn new(sink: Box<dyn LogSink>) -> Self {
        Self {
            records: Vec::new(),
            sink,
        }
    }

    /// Append one record and push the whole sequence through the sink.
    pub fn record(&mut self, command: &str) -> Result<(), LogError> {
        self.records.push(LogRecord::new(command));
        self.sink.persist(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }
}
