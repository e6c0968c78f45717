//! Launching programs that are not built-ins.

use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::error::ShellError;
use crate::history::History;
use crate::interpreter::Factory;
use anyhow::Result;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Command that is not a builtin.
///
/// `program` is `None` when the name could not be found on `PATH`; running
/// such a command reports a launch failure instead of spawning anything.
pub struct ExternalCommand {
    name: String,
    program: Option<OsString>,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(name: String, program: Option<OsString>, args: Vec<OsString>) -> Self {
        Self {
            name,
            program,
            args,
        }
    }

    fn launch_error(&self, source: io::Error) -> anyhow::Error {
        ShellError::Launch {
            name: self.name.clone(),
            source,
        }
        .into()
    }
}

/// Catch-all factory: always produces a command, so it must come last.
impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let search_paths = env.get_var("PATH").unwrap_or_default();
        let program =
            find_command_path(OsStr::new(&search_paths), Path::new(name), &env.current_dir)
                .map(PathBuf::into_os_string);
        Some(Box::new(ExternalCommand::new(
            name.to_string(),
            program,
            args.iter().map(|x| x.into()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        env: &mut Environment,
        _history: &History,
    ) -> Result<ExitCode> {
        let Some(program) = &self.program else {
            return Err(self.launch_error(io::ErrorKind::NotFound.into()));
        };
        // The Command (and with it our copy of both pipe ends) is dropped
        // right after the spawn, before we block on the child.
        let spawned = std::process::Command::new(program)
            .args(&self.args)
            .stdin(stdin.stdio())
            .stdout(stdout.stdio())
            .env_clear()
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => return Err(self.launch_error(e)),
        };
        tracing::debug!(pid = child.id(), program = %self.name, "spawned child");

        let exit_status = child
            .wait()
            .map_err(ShellError::resource("waiting for child"))?;
        let code = match exit_status.code() {
            Some(x) => x,
            None => terminated_by_signal(exit_status),
        };
        tracing::debug!(program = %self.name, code, "child exited");
        Ok(code)
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Locate the program a command name refers to.
///
/// A name containing `/` is a path, taken relative to `cwd` unless it is
/// absolute, and only has to exist. A bare name is looked up in each
/// directory of `search_paths` in order; candidates that are not executable
/// regular files are skipped, like `execvp` does.
pub fn find_command_path(search_paths: &OsStr, name: &Path, cwd: &Path) -> Option<PathBuf> {
    if name.as_os_str().is_empty() {
        return None;
    }
    if name.as_os_str().as_encoded_bytes().contains(&b'/') {
        let path = cwd.join(name);
        return path.exists().then_some(path);
    }
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
