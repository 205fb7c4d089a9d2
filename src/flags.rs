//! Flag extraction.
//!
//! Turns the argument tokens of a command into a flat list of flag names:
//!
//! - `--name` yields the long flag `name`;
//! - `-abc` yields the short flags `a`, `b` and `c`, in order;
//! - tokens that do not start with `-` are positional and yield nothing;
//! - a bare `-` is rejected.

use crate::error::ParseError;

const LONG_PREFIX: &str = "--";
const SHORT_PREFIX: char = '-';

/// Extracts normalized flags from `args`, which must not include the command name.
///
/// The result depends only on `args`, so extracting twice gives the same flags.
pub fn extract_flags<S: AsRef<str>>(args: &[S]) -> Result<Vec<String>, ParseError> {
    let mut flags = Vec::new();

    for arg in args {
        let arg = arg.as_ref();
        if !arg.starts_with(SHORT_PREFIX) {
            continue;
        }
        if arg.chars().count() < 2 {
            return Err(ParseError::InvalidFlag(arg.to_string()));
        }

        match arg.strip_prefix(LONG_PREFIX) {
            Some(long) => flags.push(long.to_string()),
            None => flags.extend(
                arg.chars()
                    .filter(|&ch| ch != SHORT_PREFIX)
                    .map(String::from),
            ),
        }
    }

    Ok(flags)
}
