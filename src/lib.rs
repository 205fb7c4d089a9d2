//! A minimal interactive command shell.
//!
//! Each input line is split on whitespace into a [`Command`]: the lower-cased
//! command name, its arguments and the flags derived from them. The
//! [`Interpreter`] then either stops (`exit`), skips a blank line, runs one of
//! the builtins (`pwd`, `ls`, `cd`, `help`) or launches an external program
//! found through `PATH`.
//!
//! The public modules expose the pieces so they can be driven and tested on
//! their own: [`builtin`] for the registry and the [`BuiltinCommand`] trait,
//! [`io_adapters`] for line sources and an in-memory output sink, and
//! [`env`] for the variables handed to builtins and child processes.

pub mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod external;
pub mod flags;
pub mod interpreter;
pub mod io_adapters;
pub mod prompt;

pub use builtin::{BuiltinCommand, Builtins};
pub use command::{Command, ExitCode, Stdout};
pub use interpreter::{Interpreter, Outcome, Settings};
pub use io_adapters::MemWriter;
