//! Prompt rendering.
//!
//! The full prompt reads `<user>@<host> <dir> > `, where `<dir>` is the last
//! component of the current working directory.

use crate::error::PromptError;
use std::env;
use std::path::Path;

/// Prompt shown by the simple variant, and by the full variant when it has
/// degraded after a lookup failure.
pub const PLAIN_PROMPT: &str = "> ";

/// Which prompt the shell displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptStyle {
    /// Always `> `.
    Plain,
    /// `<user>@<host> <dir> > `.
    #[default]
    Full,
}

/// What to do when the full prompt cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptFailure {
    /// Stop the shell with the lookup error.
    #[default]
    Fatal,
    /// Show [`PLAIN_PROMPT`] and keep going.
    Degrade,
}

/// Host lookups needed by the full prompt.
///
/// Split out so the prompt can be rendered against fixed values.
pub trait PromptContext {
    fn username(&self) -> Result<String, PromptError>;
    fn hostname(&self) -> Result<String, PromptError>;
    fn current_dir(&self) -> Result<std::path::PathBuf, PromptError>;
}

/// Lookups against the running system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemContext;

impl PromptContext for SystemContext {
    fn username(&self) -> Result<String, PromptError> {
        whoami::fallible::username().map_err(PromptError::User)
    }

    fn hostname(&self) -> Result<String, PromptError> {
        whoami::fallible::hostname().map_err(PromptError::Host)
    }

    fn current_dir(&self) -> Result<std::path::PathBuf, PromptError> {
        env::current_dir().map_err(PromptError::Cwd)
    }
}

/// Render the prompt for `style`.
pub fn render(style: PromptStyle, ctx: &dyn PromptContext) -> Result<String, PromptError> {
    match style {
        PromptStyle::Plain => Ok(PLAIN_PROMPT.to_string()),
        PromptStyle::Full => {
            let user = ctx.username()?;
            let host = ctx.hostname()?;
            let cwd = ctx.current_dir()?;
            Ok(format!("{user}@{host} {} {PLAIN_PROMPT}", last_segment(&cwd)))
        }
    }
}

/// Last path component, or the path itself for roots like `/`.
fn last_segment(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}
