use crate::builtin::Builtins;
use crate::command::{Command, ExitCode, Stdout};
use crate::env::Environment;
use crate::external::run_external;
use crate::io_adapters::LineSource;
use crate::prompt::{self, PLAIN_PROMPT, PromptContext, PromptFailure, PromptStyle, SystemContext};
use anyhow::Result;
use std::io::Write;

/// Name that ends the read-eval loop.
pub const EXIT: &str = "exit";

/// Interpreter options, chosen once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub prompt: PromptStyle,
    pub on_prompt_error: PromptFailure,
}

/// What happened to one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `exit` was entered; the loop stops.
    Exit,
    /// Blank line; nothing was run or printed.
    NoOp,
    /// Flag extraction failed and the line was abandoned.
    InvalidFlags,
    /// A builtin ran with the given status.
    Builtin(ExitCode),
    /// An external program ran with the given status.
    External(ExitCode),
    /// The external program could not be found, started or waited for.
    NotFound,
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// Each line goes through the same steps: parse, then resolve the command
/// name in order: `exit`, blank line, flag check, builtin, external program.
///
/// Example
/// ```
/// use mini_shell::{Interpreter, MemWriter, Outcome};
/// let mut sh = Interpreter::default();
/// let outcome = sh.eval_line("   ", &mut MemWriter::new()).unwrap();
/// assert_eq!(outcome, Outcome::NoOp);
/// ```
pub struct Interpreter {
    env: Environment,
    builtins: Builtins,
    settings: Settings,
    prompt_context: Box<dyn PromptContext>,
}

impl Interpreter {
    /// Create a new interpreter with a custom builtin registry.
    pub fn new(builtins: Builtins, settings: Settings) -> Self {
        Self {
            env: Environment::new(),
            builtins,
            settings,
            prompt_context: Box::new(SystemContext),
        }
    }

    /// Replace the host lookups used for the prompt.
    pub fn with_prompt_context(mut self, ctx: impl PromptContext + 'static) -> Self {
        self.prompt_context = Box::new(ctx);
        self
    }

    /// Replace the environment handed to builtins and child processes.
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Read-eval loop.
    ///
    /// Returns `Ok(())` after `exit` or at end of input. Errors come only from
    /// the line source, from writing to `stdout`, or from the prompt under the
    /// fatal policy.
    pub fn repl(&mut self, lines: &mut dyn LineSource, stdout: &mut dyn Stdout) -> Result<()> {
        loop {
            let prompt = self.prompt()?;
            let Some(line) = lines.read_line(&prompt, stdout.as_write())? else {
                log::debug!("end of input");
                return Ok(());
            };

            if self.eval_line(&line, stdout)? == Outcome::Exit {
                return Ok(());
            }
        }
    }

    /// Parse and dispatch a single line.
    pub fn eval_line(&mut self, line: &str, stdout: &mut dyn Stdout) -> std::io::Result<Outcome> {
        let mut cmd = Command::parse(line);
        log::debug!("parsed {cmd:?}");

        if cmd.script() == EXIT {
            return Ok(Outcome::Exit);
        }
        if cmd.is_blank() {
            return Ok(Outcome::NoOp);
        }
        if let Err(err) = cmd.extract_flags() {
            writeln!(stdout, "{err}")?;
            return Ok(Outcome::InvalidFlags);
        }

        let outcome = self.dispatch(&cmd, stdout)?;
        log::debug!("{} finished: {outcome:?}", cmd.script());
        Ok(outcome)
    }

    /// Run a parsed, non-blank command as a builtin or an external program.
    fn dispatch(&mut self, cmd: &Command, stdout: &mut dyn Stdout) -> std::io::Result<Outcome> {
        if let Some(builtin) = self.builtins.get(cmd.script()) {
            let code = Builtins::run(builtin, cmd, stdout.as_write(), &mut self.env)?;
            return Ok(Outcome::Builtin(code));
        }

        match run_external(cmd, stdout, &self.env) {
            Ok(code) => Ok(Outcome::External(code)),
            Err(err) => {
                log::debug!("{err}");
                writeln!(stdout, "Command not found: {}", cmd.script())?;
                Ok(Outcome::NotFound)
            }
        }
    }

    /// Build the prompt, applying the configured failure policy.
    fn prompt(&self) -> Result<String> {
        match prompt::render(self.settings.prompt, self.prompt_context.as_ref()) {
            Ok(prompt) => Ok(prompt),
            Err(err) => match self.settings.on_prompt_error {
                PromptFailure::Fatal => Err(err.into()),
                PromptFailure::Degrade => {
                    log::warn!("{err}; using plain prompt");
                    Ok(PLAIN_PROMPT.to_string())
                }
            },
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default builtins and settings.
    fn default() -> Self {
        Self::new(Builtins::default(), Settings::default())
    }
}
