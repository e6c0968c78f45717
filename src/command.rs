use crate::env::Environment;
use crate::history::History;
use anyhow::Result;
use std::io::{Read, Write};
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Abstraction over a readable input stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// A blanket implementation exists for any type that implements `Read` and
/// `Into<Stdio>`, which covers [`Input`](crate::io_adapters::Input) and test
/// doubles such as `std::fs::File`.
pub trait Stdin: Read {
    /// Convert this input into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Read + Into<Stdio>> Stdin for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// Abstraction over a writable output stream that can also be converted into
/// a [`Stdio`] handle for spawning external processes.
///
/// A blanket implementation exists for any type that implements `Write` and `Into<Stdio>`.
pub trait Stdout: Write {
    /// Convert this output into a [`Stdio`] handle suitable for `std::process::Command`.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Write + Into<Stdio>> Stdout for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
/// The history is read-only here: only the read loop appends to it.
pub trait ExecutableCommand {
    /// Executes the command and returns its exit status.
    fn execute(
        self: Box<Self>,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        env: &mut Environment,
        history: &History,
    ) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`. Factories are
/// shared with the threads that run in-process pipeline stages, hence the
/// `Send + Sync` bound.
pub trait CommandFactory: Send + Sync {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
