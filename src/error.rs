//! Error types shared across the shell.

use std::io;

/// Errors raised while turning an input line into a [`Command`](crate::command::Command).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A flag token too short to carry a name, e.g. a bare `-`.
    #[error("invalid flag entered: `{0}`")]
    InvalidFlag(String),
}

/// Failures while building the prompt string.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("cannot determine current user: {0}")]
    User(#[source] io::Error),

    #[error("cannot determine host name: {0}")]
    Host(#[source] io::Error),

    #[error("cannot determine current directory: {0}")]
    Cwd(#[source] io::Error),
}

/// Failures while launching an external program.
#[derive(Debug, thiserror::Error)]
pub enum ExternalError {
    #[error("{0}: not found in PATH")]
    NotFound(String),

    #[error("failed to start `{name}`: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for `{name}`: {source}")]
    Wait {
        name: String,
        #[source]
        source: io::Error,
    },
}
