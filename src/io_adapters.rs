//! Standard stream bindings for one command segment.
//!
//! A segment either inherits the shell's own stream or owns one end of a
//! pipeline pipe. Both adapters implement [`Read`]/[`Write`] for built-ins and
//! convert into [`Stdio`] for launched programs, so they plug into the
//! [`Stdin`](crate::command::Stdin) and [`Stdout`](crate::command::Stdout)
//! blanket implementations.

use os_pipe::{PipeReader, PipeWriter};
use std::io::{self, Read, Result as IoResult, Write};
use std::process::Stdio;

/// Where a segment reads its standard input from.
pub enum Input {
    Inherit,
    Pipe(PipeReader),
}

/// Where a segment writes its standard output to.
pub enum Output {
    Inherit,
    Pipe(PipeWriter),
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        match self {
            Input::Inherit => io::stdin().read(buf),
            Input::Pipe(reader) => reader.read(buf),
        }
    }
}

impl From<Input> for Stdio {
    fn from(input: Input) -> Stdio {
        match input {
            Input::Inherit => Stdio::inherit(),
            Input::Pipe(reader) => Stdio::from(reader),
        }
    }
}

impl Write for Output {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        match self {
            Output::Inherit => io::stdout().write(data),
            Output::Pipe(writer) => writer.write(data),
        }
    }

    fn flush(&mut self) -> IoResult<()> {
        match self {
            Output::Inherit => io::stdout().flush(),
            Output::Pipe(writer) => writer.flush(),
        }
    }
}

impl From<Output> for Stdio {
    fn from(output: Output) -> Stdio {
        match output {
            // Anything a built-in printed must land before the child's output.
            Output::Inherit => {
                let _ = io::stdout().flush();
                Stdio::inherit()
            }
            Output::Pipe(writer) => Stdio::from(writer),
        }
    }
}
