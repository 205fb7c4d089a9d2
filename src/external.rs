use crate::command::{Command, ExitCode, Stdout};
use crate::env::Environment;
use crate::error::ExternalError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

/// Launch `cmd.script()` as a child process and wait for it.
///
/// The remaining tokens become its arguments. The child's standard output is
/// attached to `stdout`; standard input and error are inherited.
pub fn run_external(
    cmd: &Command,
    stdout: &mut dyn Stdout,
    env: &Environment,
) -> Result<ExitCode, ExternalError> {
    let name = cmd.script();
    let search_paths = env.get_var("PATH").unwrap_or_default();
    let program = find_command_path(OsStr::new(&search_paths), Path::new(name))
        .ok_or_else(|| ExternalError::NotFound(name.to_string()))?;
    log::debug!("launching {} with {:?}", program.display(), cmd.params());

    let spawn_error = |source: std::io::Error| ExternalError::Spawn {
        name: name.to_string(),
        source,
    };

    // Anything the shell buffered must land before the child's output.
    stdout.flush().map_err(spawn_error)?;
    let child_stdout = stdout.stdio().map_err(spawn_error)?;

    let mut child = std::process::Command::new(&program)
        .args(cmd.params())
        .stdin(Stdio::inherit())
        .stdout(child_stdout)
        .env_clear()
        .envs(env.iter())
        .spawn()
        .map_err(spawn_error)?;

    let exit_status = child.wait().map_err(|source| ExternalError::Wait {
        name: name.to_string(),
        source,
    })?;
    Ok(match exit_status.code() {
        Some(x) => x,
        None => terminated_by_signal(exit_status),
    })
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = exit_status.signal() {
        128 + signal
    } else if exit_status.core_dumped() {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ExitCode {
    -1
}

/// Resolve a program path the way a typical shell would.
///
/// - Absolute path: used if it is an executable file.
/// - `./foo`, or any path with more than one component: looked up relative to
///   the current directory.
/// - Single component: searched in each directory of `search_paths` (PATH),
///   first executable match wins.
/// - Empty path: `None`.
pub fn find_command_path(search_paths: &OsStr, path: &Path) -> Option<PathBuf> {
    if path.is_absolute() {
        return existing(path);
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, _) => None,
        (Some(first), None) if !path.starts_with(".") => {
            find_in_path(search_paths, first.as_os_str())
        }
        _ => existing(path),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths).find_map(|dir| existing(&dir.join(cmd)))
}

fn existing(path: &Path) -> Option<PathBuf> {
    is_executable(path).then(|| path.to_path_buf())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
