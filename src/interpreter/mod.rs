//! Interpreter module
//!
//! Tokenizes submitted lines and dispatches the recognized commands
//! against the virtual filesystem.

pub mod command;
pub mod interpreter;

pub use command::{tokenize, CommandName};
pub use interpreter::{Interpreter, Outcome};
