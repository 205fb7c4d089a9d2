//! Command-line options of the `mini_shell` binary.

use crate::interpreter::Settings;
use crate::prompt::{PromptFailure, PromptStyle};
use argh::FromArgs;

#[derive(FromArgs, Debug, Default, PartialEq, Eq)]
/// A minimal interactive shell: builtins `pwd`, `ls`, `cd`, `help`, `exit`,
/// everything else is run from PATH.
pub struct Cli {
    #[argh(switch)]
    /// always show the plain `> ` prompt instead of `user@host dir > `.
    pub plain_prompt: bool,

    #[argh(switch)]
    /// fall back to the plain prompt when user, host or directory lookup fails,
    /// instead of exiting.
    pub degraded_prompt: bool,

    #[argh(switch)]
    /// read lines from standard input without the interactive line editor.
    pub no_editor: bool,
}

impl Cli {
    /// Interpreter settings selected by these options.
    pub fn settings(&self) -> Settings {
        Settings {
            prompt: if self.plain_prompt {
                PromptStyle::Plain
            } else {
                PromptStyle::Full
            },
            on_prompt_error: if self.degraded_prompt {
                PromptFailure::Degrade
            } else {
                PromptFailure::Fatal
            },
        }
    }
}
