use crate::error::ParseError;
use crate::flags::extract_flags;
use std::fs::File;
use std::io::{self, Write};
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Abstraction over the shell's output stream that external programs can also
/// be attached to.
///
/// Builtins write to it through [`Write`]; child processes receive the handle
/// returned by [`Stdout::stdio`]. Implementations must hand out a handle that
/// writes to the same destination, so that output from both sources interleaves
/// in order once the writer has been flushed.
pub trait Stdout: Write {
    /// Produce a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(&self) -> io::Result<Stdio>;

    /// View this sink as a plain writer.
    fn as_write(&mut self) -> &mut dyn Write;
}

impl Stdout for io::Stdout {
    fn stdio(&self) -> io::Result<Stdio> {
        Ok(Stdio::inherit())
    }

    fn as_write(&mut self) -> &mut dyn Write {
        self
    }
}

impl Stdout for File {
    fn stdio(&self) -> io::Result<Stdio> {
        Ok(self.try_clone()?.into())
    }

    fn as_write(&mut self) -> &mut dyn Write {
        self
    }
}

/// One parsed input line.
///
/// A fresh value is built for every line read, so nothing from a previous
/// line can influence the next dispatch decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    raw_input: String,
    script: String,
    args: Vec<String>,
    flags: Vec<String>,
}

impl Command {
    /// Split `line` on runs of whitespace.
    ///
    /// No quoting or escaping is recognised. `script` is the lower-cased first
    /// token, or empty for a blank line. Flags are not extracted here, see
    /// [`Command::extract_flags`].
    pub fn parse(line: &str) -> Self {
        let args: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let script = args
            .first()
            .map(|first| first.to_lowercase())
            .unwrap_or_default();

        Self {
            raw_input: line.to_string(),
            script,
            args,
            flags: Vec::new(),
        }
    }

    /// Replace `flags` with the flags derived from every argument after the
    /// command name.
    ///
    /// On error `flags` is left empty and the line must not be dispatched.
    pub fn extract_flags(&mut self) -> Result<&[String], ParseError> {
        self.flags.clear();
        self.flags = extract_flags(self.params())?;
        Ok(&self.flags)
    }

    /// The line exactly as it was read.
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// Lower-cased command name; empty for a blank line.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// All tokens, the command name included as element 0.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Tokens after the command name.
    pub fn params(&self) -> &[String] {
        self.args.get(1..).unwrap_or_default()
    }

    /// Positional tokens after the command name, i.e. those not starting with `-`.
    pub fn operands(&self) -> impl Iterator<Item = &str> {
        self.params()
            .iter()
            .map(String::as_str)
            .filter(|arg| !arg.starts_with('-'))
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Whether any of `names` was given as a flag.
    pub fn has_flag(&self, names: &[&str]) -> bool {
        self.flags.iter().any(|flag| names.contains(&flag.as_str()))
    }

    pub fn is_blank(&self) -> bool {
        self.script.is_empty()
    }
}
