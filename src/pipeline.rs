//! Running segments joined by `|`.
//!
//! A line with n segments gets n-1 anonymous pipes. Every pipe is created
//! before the first stage starts, each pipe end is owned by exactly one
//! stage, and the executor waits for all stages before returning.

use crate::command::ExitCode;
use crate::env::Environment;
use crate::error::{ShellError, UsageError};
use crate::interpreter::{Runner, report};
use crate::io_adapters::{Input, Output};
use crate::lexer::PIPE;
use std::thread;

/// A token sequence split at its `|` tokens. Segments borrow from the
/// original tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline<'t> {
    segments: Vec<&'t [String]>,
}

impl<'t> Pipeline<'t> {
    /// Split `tokens` at every `|`.
    ///
    /// Returns `Ok(None)` when there is no pipe at all. A pipe in first or
    /// last position, or two pipes with nothing between them, is rejected
    /// before anything runs.
    pub fn split(tokens: &'t [String]) -> Result<Option<Self>, UsageError> {
        if !tokens.iter().any(|t| t == PIPE) {
            return Ok(None);
        }

        let mut segments = Vec::new();
        let mut start = 0;
        for (i, token) in tokens.iter().enumerate() {
            if token != PIPE {
                continue;
            }
            if i == 0 {
                return Err(UsageError::PipeAtStart);
            }
            if i == start {
                return Err(UsageError::EmptySegment(i));
            }
            segments.push(&tokens[start..i]);
            start = i + 1;
        }
        if start == tokens.len() {
            return Err(UsageError::PipeAtEnd);
        }
        segments.push(&tokens[start..]);

        Ok(Some(Self { segments }))
    }

    pub fn segments(&self) -> &[&'t [String]] {
        &self.segments
    }

    /// Run every segment concurrently and wait for all of them.
    ///
    /// The first stage reads `stdin` and the last writes `stdout`. Each stage
    /// runs as if it were a line of its own, against a private copy of `env`.
    /// Returns the status of the last stage.
    pub(crate) fn run(
        &self,
        runner: &Runner<'_>,
        stdin: Input,
        stdout: Output,
        env: &Environment,
    ) -> Result<ExitCode, ShellError> {
        let mut inputs = Vec::with_capacity(self.segments.len());
        let mut outputs = Vec::with_capacity(self.segments.len());
        inputs.push(stdin);
        for _ in 1..self.segments.len() {
            let (reader, writer) = os_pipe::pipe().map_err(ShellError::resource("creating pipe"))?;
            outputs.push(Output::Pipe(writer));
            inputs.push(Input::Pipe(reader));
        }
        outputs.push(stdout);

        let mut spawn_error = None;
        let statuses: Vec<ExitCode> = thread::scope(|scope| {
            // Start every stage before waiting on any of them.
            let stages: Vec<_> = self
                .segments
                .iter()
                .zip(inputs.into_iter().zip(outputs))
                .enumerate()
                .map(|(index, (argv, (input, output)))| {
                    let mut stage_env = env.for_stage();
                    thread::Builder::new()
                        .name(format!("stage-{}", index))
                        .spawn_scoped(scope, move || {
                            let _span = tracing::debug_span!("stage", index).entered();
                            match runner.run_segment(argv, input, output, &mut stage_env) {
                                Ok(code) => code,
                                Err(err) => {
                                    report(&err);
                                    err.status()
                                }
                            }
                        })
                })
                .collect();

            stages
                .into_iter()
                .map(|stage| match stage {
                    Ok(handle) => handle.join().unwrap_or_else(|_| {
                        tracing::error!("pipeline stage panicked");
                        1
                    }),
                    Err(e) => {
                        spawn_error.get_or_insert(e);
                        1
                    }
                })
                .collect()
        });

        if let Some(source) = spawn_error {
            return Err(ShellError::Resource {
                what: "starting pipeline stage",
                source,
            });
        }

        tracing::debug!(?statuses, "pipeline finished");
        if statuses.iter().any(|&code| code != 0) {
            tracing::warn!(?statuses, "pipeline failed");
        }
        Ok(statuses.last().copied().unwrap_or(0))
    }
}
