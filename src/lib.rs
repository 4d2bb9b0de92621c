//! vshell - An interactive shell over an archive-backed virtual filesystem
//!
//! A tar archive is materialized once into an in-memory path→content
//! store; the interpreter then answers shell-like commands (`ls`, `cd`,
//! `cp`, `echo`, `uname`, `exit`) against that store, logging every
//! command to a JSON audit file. Directories are not real nodes: they are
//! inferred from the flat key set.

pub mod archive;
pub mod fs;
pub mod interpreter;
pub mod log;
pub mod shell;

pub use fs::{normalize_path, VfsEntry, VfsError, VirtualFs};
pub use interpreter::{Interpreter, Outcome};
pub use shell::{Shell, ShellOptions};
