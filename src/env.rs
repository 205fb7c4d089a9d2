use std::collections::HashMap;
use std::env as stdenv;

/// Variables the shell hands to builtins and to the programs it launches.
///
/// The working directory is not tracked here: it is process-wide state owned
/// by the operating system, and every builtin queries it when it runs.
///
/// Note: `vars` is public to keep construction in tests short.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME, PWD).
    pub vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the variables of the current process.
    pub fn new() -> Self {
        Self {
            vars: stdenv::vars().collect(),
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Only `self.vars` is consulted, the same map child processes receive.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Iterate over the variables passed to child processes.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
