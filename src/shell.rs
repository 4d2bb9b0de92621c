//! Shell Environment
//!
//! Main entry point for the shell emulator session.
//! Ties together the archive loader, the interpreter, and the command log,
//! and drives startup scripts. The interactive loop lives in the binary;
//! this module renders its prompt text.

use std::path::Path;

use thiserror::Error;

use crate::archive::{self, ArchiveError};
use crate::fs::VirtualFs;
use crate::interpreter::{Interpreter, Outcome};
use crate::log::{CommandLog, JsonFileSink, LogError, LogSink};

/// Startup and audit-trail failures; both terminate the process.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Log(#[from] LogError),
}

/// Options for creating a shell session.
pub struct ShellOptions {
    /// Username shown in the prompt.
    pub username: String,
    /// Starting directory for the cursor.
    pub start_dir: String,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            username: "user".to_string(),
            start_dir: "/".to_string(),
        }
    }
}

/// Result of running a startup script.
pub struct ScriptRun {
    /// Printable outputs in submission order.
    pub outputs: Vec<String>,
    /// True when a script line terminated the session.
    pub exited: bool,
}

/// An interactive session over an archive-backed virtual filesystem.
pub struct Shell {
    interpreter: Interpreter,
    username: String,
}

impl Shell {
    /// Create a session from an archive on disk, logging to `log_path`.
    pub fn from_archive(
        archive_path: impl AsRef<Path>,
        log_path: impl AsRef<Path>,
        options: ShellOptions,
    ) -> Result<Self, ShellError> {
        let entries = archive::load(archive_path)?;
        let sink = Box::new(JsonFileSink::new(log_path.as_ref()));
        Ok(Self::with_sink(
            VirtualFs::from_entries(entries),
            sink,
            options,
        ))
    }

    /// Create a session over an existing store and sink.
    pub fn with_sink(vfs: VirtualFs, sink: Box<dyn LogSink>, options: ShellOptions) -> Self {
        let log = CommandLog::new(sink);
        Self {
            interpreter: Interpreter::new(vfs, &options.start_dir, log),
            username: options.username,
        }
    }

    /// Feed one line to the interpreter.
    pub fn submit(&mut self, line: &str) -> Result<Option<Outcome>, ShellError> {
        Ok(self.interpreter.submit(line)?)
    }

    /// Run a startup script: each trimmed, non-empty line in order,
    /// collecting the printable outputs. Stops early when a line
    /// terminates the session.
    pub fn run_script(&mut self, script: &str) -> Result<ScriptRun, ShellError> {
        let mut outputs = Vec::new();
        for line in script.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match self.interpreter.submit(line)? {
                Some(Outcome::Output(text)) => outputs.push(text),
                Some(Outcome::Exit) => {
                    return Ok(ScriptRun {
                        outputs,
                        exited: true,
                    })
                }
                None => {}
            }
        }
        Ok(ScriptRun {
            outputs,
            exited: false,
        })
    }

    /// Prompt text for the interactive surface.
    pub fn prompt(&self) -> String {
        format!(
            "{}@vshell:{}$ ",
            self.username,
            self.interpreter.current_dir()
        )
    }

    pub fn current_dir(&self) -> &str {
        self.interpreter.current_dir()
    }
}
