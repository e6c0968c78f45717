//! A small line-oriented shell: built-ins, external programs, `|` pipelines
//! and `!`-recall of earlier lines.
//!
//! The main entry point is [`Interpreter::execute`], which runs one line
//! against a caller-owned [`History`] and tells the read loop what to do next
//! via [`Outcome`]. [`Interpreter::repl`] is the interactive loop built on top
//! of it. The public modules [`command`] and [`env`] expose traits and types
//! for implementing your own commands and for interacting with the process
//! environment.

mod builtin;
pub mod command;
pub mod env;
pub mod error;
mod external;
pub mod history;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
mod pipeline;

pub use error::{ResolutionError, ShellError, UsageError};
pub use history::History;
/// Just a convenient re-export of the command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, MAX_EXPANSION_DEPTH, Outcome, PromptStyle};
pub use pipeline::Pipeline;
