//! Command Interpreter
//!
//! Owns the virtual filesystem, the current-directory cursor, and the
//! command log. Each submitted line is processed synchronously; every
//! command error becomes ordinary output, never a session failure. Only a
//! failing log sink aborts, since the audit trail must not be lost.

use crate::fs::{normalize_path, VfsError, VirtualFs};
use crate::log::{CommandLog, LogError};

use super::command::{tokenize, CommandName};

/// What `uname` reports.
const SYSTEM_NAME: &str = "vshell";

/// What a submitted line produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to show the user. Empty after a successful `cd`.
    Output(String),
    /// The session should terminate.
    Exit,
}

/// The interactive command interpreter over a [`VirtualFs`].
pub struct Interpreter {
    vfs: VirtualFs,
    current_dir: String,
    log: CommandLog,
}

impl Interpreter {
    pub fn new(vfs: VirtualFs, start_dir: &str, log: CommandLog) -> Self {
        Self {
            vfs,
            current_dir: normalize_path("/", start_dir),
            log,
        }
    }

    /// The cursor: absolute, normalized, only changed by a successful `cd`.
    pub fn current_dir(&self) -> &str {
        &self.current_dir
    }

    pub fn vfs(&self) -> &VirtualFs {
        &self.vfs
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    /// Process one line of input. A blank line is ignored entirely; `exit`
    /// terminates without logging; everything else — unknown commands
    /// included — is answered and logged.
    pub fn submit(&mut self, line: &str) -> Result<Option<Outcome>, LogError> {
        let (name, args) = match tokenize(line) {
            Some(parsed) => parsed,
            None => return Ok(None),
        };

        let output = match name {
            CommandName::Ls => self.ls(&args),
            CommandName::Cd => self.cd(&args),
            CommandName::Cp => self.cp(&args),
            CommandName::Echo => args.join(" "),
            CommandName::Uname => SYSTEM_NAME.to_string(),
            CommandName::Exit => return Ok(Some(Outcome::Exit)),
            CommandName::Unknown(cmd) => format!("Unknown command: {}", cmd),
        };

        self.log.record(line)?;
        Ok(Some(Outcome::Output(output)))
    }

    fn ls(&self, args: &[String]) -> String {
        let target = match args.first() {
            Some(arg) => normalize_path(&self.current_dir, arg),
            None => self.current_dir.clone(),
        };
        match self.vfs.list(&target) {
            Ok(names) if names.is_empty() => "Empty directory".to_string(),
            Ok(names) => names.join("\n"),
            Err(_) => format!("ls: cannot access '{}': No such directory", target),
        }
    }

    fn cd(&mut self, args: &[String]) -> String {
        if args.len() != 1 {
            return "cd: missing argument".to_string();
        }
        let target = normalize_path(&self.current_dir, &args[0]);
        if self.vfs.exists_as_directory(&target) {
            self.current_dir = target;
            String::new()
        } else {
            format!("cd: no such file or directory: {}", target)
        }
    }

    fn cp(&mut self, args: &[String]) -> String {
        if args.len() != 2 {
            return "cp: missing source or destination".to_string();
        }
        let src = normalize_path(&self.current_dir, &args[0]);
        let dst = normalize_path(&self.current_dir, &args[1]);
        match self.vfs.copy(&src, &dst) {
            Ok(landed) => format!("Copied {} to {}", src, landed),
            Err(VfsError::NotFound { .. }) => {
                format!("cp: {}: No such file in virtual filesystem", src)
            }
            Err(VfsError::DestinationNotFound { .. }) => {
                format!("cp: {}: No such directory in virtual filesystem", dst)
            }
        }
    }
}
