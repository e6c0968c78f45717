use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: environment variables passed to every launched program.
/// - `current_dir`: the working directory programs are started in.
/// - `should_exit`: set by the `exit` built-in, checked by the read loop.
/// - `isolated`: set on the private copy each pipeline stage receives.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that an interactive loop should exit.
    pub should_exit: bool,
    /// A stage-local copy: changes stay here and never reach the shell process.
    pub isolated: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            current_dir,
            should_exit: false,
            isolated: false,
        }
    }

    /// Copy handed to one pipeline stage, the equivalent of a forked child.
    pub fn for_stage(&self) -> Self {
        Self {
            should_exit: false,
            isolated: true,
            ..self.clone()
        }
    }

    /// Get the value of an environment variable.
    ///
    /// `self.vars` is authoritative: it was seeded from the process when the
    /// environment was captured, and later changes go through it.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Unset a variable in `self.vars`, returning its old value.
    pub fn remove_var(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    /// Process variables, but a fixed working directory: other tests move
    /// the process directory around.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            current_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")),
            ..Self::new()
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
