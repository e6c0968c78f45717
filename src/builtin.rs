use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::history::History;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "history".
    fn name() -> &'static str;

    /// Whether this invocation belongs to the builtin at all. Rejected
    /// invocations fall through to the next factory.
    fn accepts(_args: &[&str]) -> bool {
        true
    }

    /// Executes the command using provided IO streams and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(
        self,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
        history: &History,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        mut stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        env: &mut Environment,
        history: &History,
    ) -> Result<ExitCode> {
        let result = <T as BuiltinCommand>::execute(*self, &mut stdin, &mut stdout, env, history);
        stdout.flush()?;
        match result {
            Ok(x) => Ok(x),
            Err(e) => {
                eprintln!("{:#}", e);
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        _env: &mut Environment,
        _history: &History,
    ) -> Result<ExitCode> {
        if self.is_error {
            eprintln!("{}", self.output);
            Ok(1)
        } else {
            writeln!(stdout, "{}", self.output)?;
            Ok(0)
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name != T::name() || !T::accepts(args) {
            return None;
        }
        Some(match T::from_args(&[name], args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        })
    }
}

#[derive(FromArgs)]
/// Leave the shell.
pub struct Exit {}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    /// Only a bare `exit` is the builtin; `exit 3` is looked up on PATH.
    fn accepts(args: &[&str]) -> bool {
        args.is_empty()
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        env: &mut Environment,
        _history: &History,
    ) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List previously entered commands, newest first.
pub struct ShowHistory {}

impl BuiltinCommand for ShowHistory {
    fn name() -> &'static str {
        "history"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _env: &mut Environment,
        history: &History,
    ) -> Result<ExitCode> {
        for (i, entry) in history.iter_most_recent_first().enumerate() {
            writeln!(stdout, "{:2}: {}", i, entry.text)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, or the target is `~`, changes to $HOME (or stays put when HOME is unset).
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        env: &mut Environment,
        _history: &History,
    ) -> Result<ExitCode> {
        let target = match self.target.as_deref() {
            None | Some("") | Some("~") => env
                .get_var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            Some(t) => PathBuf::from(t),
        };

        let new_dir = if target.is_absolute() {
            target.clone()
        } else {
            env.current_dir.join(&target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: {}", target.display()))?;
        if !canonical.is_dir() {
            anyhow::bail!("cd: {}: Not a directory", target.display());
        }

        // A pipeline stage only moves its own copy, like a forked child would.
        if !env.isolated {
            env::set_current_dir(&canonical)
                .with_context(|| format!("cd: {}", target.display()))?;
        }
        tracing::debug!(dir = %canonical.display(), isolated = env.isolated, "changed directory");
        env.current_dir = canonical;
        Ok(0)
    }
}
