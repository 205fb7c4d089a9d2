use crate::command::{Command, ExitCode};
use crate::env::Environment;
use crate::interpreter::EXIT;
use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Separator written after every name listed by `ls`.
pub const LS_SEPARATOR: &str = "  ";

/// Built-in commands known to the shell at compile time.
///
/// Builtins run in-process and get the whole parsed [`Command`], so a builtin
/// may branch on [`Command::flags`] or ignore them.
pub trait BuiltinCommand {
    /// Canonical name of the command, e.g. "pwd" or "cd".
    fn name(&self) -> &'static str;

    /// Executes the command, writing its output to `stdout`.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(
        &self,
        cmd: &Command,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

/// Immutable mapping from command name to builtin handler.
///
/// Built once at startup and owned by the interpreter.
pub struct Builtins {
    commands: HashMap<&'static str, Box<dyn BuiltinCommand>>,
}

impl Builtins {
    /// Create a registry from the given handlers. A later handler replaces an
    /// earlier one with the same name.
    pub fn new(commands: Vec<Box<dyn BuiltinCommand>>) -> Self {
        Self {
            commands: commands.into_iter().map(|cmd| (cmd.name(), cmd)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn BuiltinCommand> {
        self.commands.get(name).map(|cmd| cmd.as_ref())
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Run `builtin` for `cmd`.
    ///
    /// Errors are reported on `stdout` as a diagnostic line naming the command,
    /// and turned into exit status 1.
    pub fn run(
        builtin: &dyn BuiltinCommand,
        cmd: &Command,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> std::io::Result<ExitCode> {
        match builtin.execute(cmd, stdout, env) {
            Ok(code) => Ok(code),
            Err(e) => {
                log::debug!("builtin {} failed: {e:#}", cmd.script());
                writeln!(
                    stdout,
                    "command {} ran into an unexpected error: {e:#}",
                    cmd.script()
                )?;
                Ok(1)
            }
        }
    }
}

impl Default for Builtins {
    /// The builtins shipped with the shell: `pwd`, `ls`, `cd` and `help`.
    fn default() -> Self {
        let mut builtins = Self::new(vec![Box::new(Pwd), Box::new(Ls), Box::new(Cd)]);

        let mut listed = builtins.names();
        listed.extend([Help::NAME, EXIT]);
        listed.sort_unstable();
        builtins
            .commands
            .insert(Help::NAME, Box::new(Help { commands: listed }));

        builtins
    }
}

/// Print the current working directory to standard output.
///
/// `-L`/`--logical` prefers `$PWD` when it names the current directory,
/// `-P`/`--physical` resolves every symlink. The last one given wins.
pub struct Pwd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PwdMode {
    Reported,
    Logical,
    Physical,
}

impl Pwd {
    fn mode(cmd: &Command) -> PwdMode {
        cmd.flags()
            .iter()
            .fold(PwdMode::Reported, |mode, flag| match flag.as_str() {
                "L" | "logical" => PwdMode::Logical,
                "P" | "physical" => PwdMode::Physical,
                _ => mode,
            })
    }
}

impl BuiltinCommand for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn execute(
        &self,
        cmd: &Command,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let cwd = env::current_dir().context("cannot get current directory")?;

        let dir = match Pwd::mode(cmd) {
            PwdMode::Reported => cwd,
            PwdMode::Physical => fs::canonicalize(&cwd)
                .with_context(|| format!("cannot resolve {}", cwd.display()))?,
            PwdMode::Logical => match logical_pwd(env, &cwd) {
                Some(pwd) => pwd,
                None => fs::canonicalize(&cwd)
                    .with_context(|| format!("cannot resolve {}", cwd.display()))?,
            },
        };

        writeln!(stdout, "{}", dir.to_string_lossy())?;
        Ok(0)
    }
}

/// `$PWD` if it is absolute and refers to the same directory as `cwd`.
fn logical_pwd(env: &Environment, cwd: &Path) -> Option<PathBuf> {
    let pwd = PathBuf::from(env.get_var("PWD")?);
    if !pwd.is_absolute() {
        return None;
    }
    let same = fs::canonicalize(&pwd).ok()? == fs::canonicalize(cwd).ok()?;
    same.then_some(pwd)
}

/// List the entries of the current directory on one line.
///
/// Names starting with `.` are skipped unless `-a`/`--all` is given.
pub struct Ls;

impl BuiltinCommand for Ls {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn execute(
        &self,
        cmd: &Command,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        let show_hidden = cmd.has_flag(&["a", "all"]);
        let cwd = env::current_dir().context("cannot get current directory")?;
        let entries =
            fs::read_dir(&cwd).with_context(|| format!("cannot read {}", cwd.display()))?;

        // Collect first so a failing entry aborts before anything is printed.
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("cannot read {}", cwd.display()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if show_hidden || !name.starts_with('.') {
                names.push(name);
            }
        }

        for name in &names {
            write!(stdout, "{name}{LS_SEPARATOR}")?;
        }
        writeln!(stdout)?;
        Ok(0)
    }
}

/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd;

impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(
        &self,
        cmd: &Command,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let target = match cmd.operands().next() {
            Some(t) if t != "~" => PathBuf::from(t),
            _ => match env.get_var("HOME") {
                Some(home) => PathBuf::from(home),
                None => return Err(anyhow!("no target and HOME not set")),
            },
        };

        let old_dir = env::current_dir().context("cannot get current directory")?;
        let new_dir = if target.is_absolute() {
            target
        } else {
            old_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("can't canonicalize {}", new_dir.display()))?;

        env::set_current_dir(&canonical)
            .with_context(|| format!("can't chdir to {}", canonical.display()))?;

        env.set_var("OLDPWD", old_dir.to_string_lossy());
        env.set_var("PWD", canonical.to_string_lossy());
        Ok(0)
    }
}

/// Print a short banner and the list of builtins.
pub struct Help {
    commands: Vec<&'static str>,
}

impl Help {
    const NAME: &'static str = "help";
}

impl BuiltinCommand for Help {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(
        &self,
        _cmd: &Command,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "mini_shell")?;
        writeln!(
            stdout,
            "Type a command and its arguments, then press enter.\n"
        )?;
        writeln!(stdout, "Builtin commands:")?;
        for name in &self.commands {
            writeln!(stdout, "\t{name}")?;
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CwdGuard, lock_current_dir};
    use std::fs::File;

    fn run(builtin: &dyn BuiltinCommand, line: &str, env: &mut Environment) -> (ExitCode, String) {
        let mut cmd = Command::parse(line);
        cmd.extract_flags().unwrap();
        let mut out = Vec::new();
        let code = Builtins::run(builtin, &cmd, &mut out, env).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_pwd_prints_current_dir() {
        let _lock = lock_current_dir();
        let cur = env::current_dir().unwrap();

        let (code, out) = run(&Pwd, "pwd", &mut Environment::default());

        assert_eq!(code, 0);
        assert_eq!(out, format!("{}\n", cur.to_string_lossy()));
    }

    #[test]
    fn test_pwd_in_known_directory() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let canonical = fs::canonicalize(temp.path()).unwrap();
        let _guard = CwdGuard::enter(&canonical);

        let (_, out) = run(&Pwd, "pwd", &mut Environment::default());

        assert_eq!(out, format!("{}\n", canonical.display()));
    }

    #[test]
    fn test_pwd_ignores_unknown_flags() {
        let _lock = lock_current_dir();
        let cur = env::current_dir().unwrap();

        let (code, out) = run(&Pwd, "pwd -z --bogus", &mut Environment::default());

        assert_eq!(code, 0);
        assert_eq!(out, format!("{}\n", cur.to_string_lossy()));
    }

    #[test]
    fn test_pwd_mode_last_flag_wins() {
        let mode = |line: &str| {
            let mut cmd = Command::parse(line);
            cmd.extract_flags().unwrap();
            Pwd::mode(&cmd)
        };
        assert_eq!(mode("pwd"), PwdMode::Reported);
        assert_eq!(mode("pwd -L"), PwdMode::Logical);
        assert_eq!(mode("pwd --physical"), PwdMode::Physical);
        assert_eq!(mode("pwd -LP"), PwdMode::Physical);
        assert_eq!(mode("pwd -P --logical"), PwdMode::Logical);
    }

    #[cfg(unix)]
    #[test]
    fn test_pwd_logical_and_physical_through_symlink() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let base = fs::canonicalize(temp.path()).unwrap();
        let real = base.join("real");
        let link = base.join("link");
        fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();
        let _guard = CwdGuard::enter(&link);

        let mut env = Environment::default();
        env.set_var("PWD", link.to_string_lossy());

        let (_, logical) = run(&Pwd, "pwd -L", &mut env);
        assert_eq!(logical, format!("{}\n", link.display()));

        let (_, physical) = run(&Pwd, "pwd -P", &mut env);
        assert_eq!(physical, format!("{}\n", real.display()));
    }

    #[test]
    fn test_pwd_logical_falls_back_when_pwd_is_stale() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let base = fs::canonicalize(temp.path()).unwrap();
        let _guard = CwdGuard::enter(&base);

        let mut env = Environment::default();
        env.set_var("PWD", "relative/path");

        let (_, out) = run(&Pwd, "pwd --logical", &mut env);
        assert_eq!(out, format!("{}\n", base.display()));
    }

    #[test]
    fn test_ls_skips_hidden_entries() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        for name in ["a.txt", ".hidden", "b.txt"] {
            File::create(temp.path().join(name)).unwrap();
        }
        let _guard = CwdGuard::enter(temp.path());

        let (code, out) = run(&Ls, "ls", &mut Environment::default());

        assert_eq!(code, 0);
        assert!(out.ends_with('\n'));
        let mut names: Vec<&str> = out.trim_end_matches('\n').split(LS_SEPARATOR).collect();
        assert_eq!(names.pop(), Some(""), "every name is followed by the separator");
        names.sort_unstable();
        assert_eq!(names, ["a.txt", "b.txt"]);
    }

    #[test]
    fn test_ls_all_includes_hidden_entries() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        for name in ["a.txt", ".hidden"] {
            File::create(temp.path().join(name)).unwrap();
        }
        let _guard = CwdGuard::enter(temp.path());

        let (_, out) = run(&Ls, "ls -a", &mut Environment::default());

        assert!(out.contains(".hidden"));
        assert!(out.contains("a.txt"));
    }

    #[test]
    fn test_ls_empty_directory_prints_newline() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let _guard = CwdGuard::enter(temp.path());

        let (_, out) = run(&Ls, "ls", &mut Environment::default());

        assert_eq!(out, "\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_ls_reports_unreadable_directory() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let gone = temp.path().join("gone");
        fs::create_dir(&gone).unwrap();
        let _guard = CwdGuard::enter(&gone);
        fs::remove_dir(&gone).unwrap();

        let (code, out) = run(&Ls, "ls", &mut Environment::default());

        assert_eq!(code, 1);
        assert!(out.starts_with("command ls ran into an unexpected error: "));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();
        let orig = env::current_dir().unwrap();
        let _guard = CwdGuard::enter(&orig);

        let mut env = Environment::default();
        let (code, out) = run(&Cd, &format!("cd {}", canonical_temp.display()), &mut env);

        assert_eq!(code, 0);
        assert!(out.is_empty());
        assert_eq!(fs::canonicalize(env::current_dir().unwrap()).unwrap(), canonical_temp);
        assert_eq!(env.vars.get("PWD").map(PathBuf::from), Some(canonical_temp));
        assert_eq!(env.vars.get("OLDPWD").map(PathBuf::from), Some(orig));
    }

    #[test]
    fn test_cd_relative_path() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let base = fs::canonicalize(temp.path()).unwrap();
        fs::create_dir(base.join("sub")).unwrap();
        let _guard = CwdGuard::enter(&base);

        let (code, _) = run(&Cd, "cd sub", &mut Environment::default());

        assert_eq!(code, 0);
        assert_eq!(env::current_dir().unwrap(), base.join("sub"));
    }

    #[test]
    fn test_cd_to_home_when_none() {
        let _lock = lock_current_dir();
        let temp = tempfile::tempdir().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();
        let _guard = CwdGuard::enter(&env::current_dir().unwrap());

        let mut env = Environment::default();
        env.set_var("HOME", canonical_temp.to_string_lossy());

        for line in ["cd", "cd ~", "cd -L"] {
            let (code, _) = run(&Cd, line, &mut env);
            assert_eq!(code, 0, "{line}");
            assert_eq!(env::current_dir().unwrap(), canonical_temp, "{line}");
        }
    }

    #[test]
    fn test_cd_nonexistent_path_errors() {
        let _lock = lock_current_dir();
        let orig = env::current_dir().unwrap();

        let line = format!("cd nonexistent_dir_for_mini_shell_{}", std::process::id());
        let (code, out) = run(&Cd, &line, &mut Environment::default());

        assert_eq!(code, 1);
        assert!(out.starts_with("command cd ran into an unexpected error: can't canonicalize"));
        assert_eq!(env::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_help_lists_builtins() {
        let builtins = Builtins::default();
        let help = builtins.get("help").unwrap();

        let (code, out) = run(help, "help", &mut Environment::default());

        assert_eq!(code, 0);
        for name in ["cd", "exit", "help", "ls", "pwd"] {
            assert!(out.contains(&format!("\t{name}\n")), "missing {name}");
        }
    }

    #[test]
    fn test_registry_lookup() {
        let builtins = Builtins::default();
        assert_eq!(builtins.names(), ["cd", "help", "ls", "pwd"]);
        assert!(builtins.get("pwd").is_some());
        assert!(builtins.get("exit").is_none());
        assert!(builtins.get("PWD").is_none());
    }

    #[test]
    fn test_registry_later_handler_wins() {
        struct Fake;
        impl BuiltinCommand for Fake {
            fn name(&self) -> &'static str {
                "pwd"
            }
            fn execute(
                &self,
                _cmd: &Command,
                stdout: &mut dyn Write,
                _env: &mut Environment,
            ) -> Result<ExitCode> {
                writeln!(stdout, "fake")?;
                Ok(7)
            }
        }

        let builtins = Builtins::new(vec![Box::new(Pwd), Box::new(Fake)]);
        let (code, out) = run(builtins.get("pwd").unwrap(), "pwd", &mut Environment::default());
        assert_eq!((code, out.as_str()), (7, "fake\n"));
    }
}
