//! Error taxonomy of the execution engine.
//!
//! Every variant is recoverable: the top level reports it on stderr and keeps
//! the read loop alive. Inside a pipeline stage the error becomes that stage's
//! exit status instead, see [`ShellError::status`].

use crate::command::ExitCode;
use std::io;

/// Status reported for a segment whose program could not even be started.
pub const LAUNCH_FAILURE_STATUS: ExitCode = 127;

/// Status reported for a malformed command line.
pub const USAGE_ERROR_STATUS: ExitCode = 2;

/// Malformed invocation detected before anything was run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("syntax error: pipeline starts with `|`")]
    PipeAtStart,
    #[error("syntax error: pipeline ends with `|`")]
    PipeAtEnd,
    #[error("syntax error: empty command between `|` at token {0}")]
    EmptySegment(usize),
    #[error("line too long ({len} bytes, limit {limit})")]
    LineTooLong { len: usize, limit: usize },
    #[error("too many tokens ({count}, limit {limit})")]
    TooManyTokens { count: usize, limit: usize },
}

impl UsageError {
    /// Whether the line was rejected for where its `|` tokens sit.
    pub fn is_misplaced_pipe(&self) -> bool {
        matches!(
            self,
            UsageError::PipeAtStart | UsageError::PipeAtEnd | UsageError::EmptySegment(_)
        )
    }
}

/// A `!`-expansion that could not be resolved against the history.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("no previous command in history")]
    NoHistory,
    #[error("{0}: event not found")]
    InvalidIndex(String),
    #[error("{0}: history expansion inside a recalled command")]
    Nested(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Executable not found or not runnable.
    #[error("Unable to execute {name}")]
    Launch {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A pipe, spawn or wait primitive failed.
    #[error("{what}: {source}")]
    Resource {
        what: &'static str,
        #[source]
        source: io::Error,
    },

    /// Any other failure surfaced by a command body.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShellError {
    pub(crate) fn resource(what: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| ShellError::Resource { what, source }
    }

    /// Exit status a stage reports when it fails with this error.
    pub fn status(&self) -> ExitCode {
        match self {
            ShellError::Usage(_) => USAGE_ERROR_STATUS,
            ShellError::Launch { .. } => LAUNCH_FAILURE_STATUS,
            ShellError::Resolution(_) | ShellError::Resource { .. } | ShellError::Other(_) => 1,
        }
    }
}
