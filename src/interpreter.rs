use crate::command::{CommandFactory, ExitCode};
use crate::env::Environment;
use crate::error::{ResolutionError, ShellError};
use crate::history::{self, History};
use crate::io_adapters::{Input, Output};
use crate::lexer;
use crate::pipeline::Pipeline;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// How many times a recalled line may itself be recalled. A line brought
/// back by `!N` is run as-is and never expanded again.
pub const MAX_EXPANSION_DEPTH: usize = 1;

const PROMPT_COLOR_START: &str = "\x1b[0;31;40m";
const PROMPT_COLOR_END: &str = "\x1b[0m";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only support commands defined in this crate — BuiltinCommand and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// What the read loop should do after one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The line ran (successfully or not); prompt for the next one.
    Continue,
    /// The `exit` built-in was invoked.
    Exit,
    /// The line was malformed and nothing was run. Carries the usage status.
    Error(ExitCode),
}

/// Prompt settings for [`Interpreter::repl`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptStyle {
    /// Print no prompt at all.
    pub quiet: bool,
    /// Print the prompt without ANSI colour.
    pub monochrome: bool,
}

impl PromptStyle {
    fn render(&self) -> String {
        match (self.quiet, self.monochrome) {
            (true, _) => String::new(),
            (false, true) => "$ ".to_string(),
            (false, false) => format!("{}${} ", PROMPT_COLOR_START, PROMPT_COLOR_END),
        }
    }
}

/// A minimal shell that runs built-ins in-process and everything else as a
/// child process, with `|` pipelines and `!`-recall from a [`History`].
///
/// The interpreter maintains an [`Environment`] and a list of [`CommandFactory`] objects
/// that are queried to create commands by name. See [`Default`] for the built-in
/// factories included out of the box.
///
/// Example
/// ```
/// use bangsh::{History, Interpreter, Outcome};
/// let mut sh = Interpreter::default();
/// let mut history = History::new();
/// history.append("true");
/// assert_eq!(sh.execute("true", &history), Outcome::Continue);
/// history.append("exit");
/// assert_eq!(sh.execute("exit", &history), Outcome::Exit);
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Execute one command line.
    ///
    /// `history` is only read here (by `history`, `!!` and `!N`); appending
    /// the line is up to the caller. Every failure is reported on stderr.
    /// Only a misplaced `|` yields [`Outcome::Error`], and only a typed
    /// `exit` yields [`Outcome::Exit`]; a recalled `exit` is ignored.
    pub fn execute(&mut self, line: &str, history: &History) -> Outcome {
        let _span = tracing::debug_span!("execute", line = line.trim_end()).entered();
        self.env.should_exit = false;
        let runner = Runner {
            commands: &self.commands,
            history,
            depth: 0,
        };

        let result = lexer::split_into_tokens(line)
            .map_err(ShellError::from)
            .and_then(|tokens| {
                if tokens.is_empty() {
                    return Ok(0);
                }
                runner.run_tokens(&tokens, Input::Inherit, Output::Inherit, &mut self.env)
            });

        match result {
            Ok(_) if self.env.should_exit => Outcome::Exit,
            Ok(code) => {
                tracing::debug!(code, "line finished");
                Outcome::Continue
            }
            Err(err) => {
                report(&err);
                match err {
                    ShellError::Usage(ref usage) if usage.is_misplaced_pipe() => {
                        Outcome::Error(err.status())
                    }
                    _ => Outcome::Continue,
                }
            }
        }
    }

    /// The interactive read loop.
    ///
    /// Every non-blank line is appended to a fresh [`History`] before it runs,
    /// so `history` lists itself and `!!` skips its own entry. The loop ends
    /// on `exit` or end of input; Ctrl-C only abandons the current line.
    pub fn repl(&mut self, style: PromptStyle) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;
        let prompt = style.render();
        let mut history = History::new();

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str())?;
                    history.append(&line);
                    if self.execute(&line, &history) == Outcome::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `exit`, `history`, `cd`
    /// - external command launcher
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<ShowHistory>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}

/// Everything needed to run a token sequence, shared with pipeline stages.
#[derive(Clone, Copy)]
pub(crate) struct Runner<'a> {
    commands: &'a [Box<dyn CommandFactory>],
    history: &'a History,
    depth: usize,
}

impl Runner<'_> {
    /// Run a tokenized line: a pipeline if it contains `|`, otherwise a
    /// single segment.
    pub(crate) fn run_tokens(
        &self,
        tokens: &[String],
        stdin: Input,
        stdout: Output,
        env: &mut Environment,
    ) -> Result<ExitCode, ShellError> {
        match Pipeline::split(tokens)? {
            Some(pipeline) => pipeline.run(self, stdin, stdout, env),
            None => self.run_segment(tokens, stdin, stdout, env),
        }
    }

    /// Run one segment: a history recall, a built-in, or a program.
    pub(crate) fn run_segment(
        &self,
        argv: &[String],
        stdin: Input,
        stdout: Output,
        env: &mut Environment,
    ) -> Result<ExitCode, ShellError> {
        let Some((name, args)) = argv.split_first() else {
            return Ok(0);
        };
        if history::is_expansion(name) {
            return self.recall(argv, stdin, stdout, env);
        }

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let cmd = self
            .commands
            .iter()
            .find_map(|factory| factory.try_create(env, name, &args))
            .ok_or_else(|| ShellError::Launch {
                name: name.clone(),
                source: std::io::ErrorKind::NotFound.into(),
            })?;
        tracing::trace!(%name, ?args, "dispatching");

        cmd.execute(Box::new(stdin), Box::new(stdout), env, self.history)
            .map_err(|err| err.downcast::<ShellError>().unwrap_or_else(ShellError::Other))
    }

    /// Replace a `!!`/`!N` command by the line it names and run that once.
    ///
    /// The recalled line never ends the shell. Its failures are reported
    /// here and become its status, and an `exit` inside it is dropped.
    fn recall(
        &self,
        argv: &[String],
        stdin: Input,
        stdout: Output,
        env: &mut Environment,
    ) -> Result<ExitCode, ShellError> {
        if self.depth >= MAX_EXPANSION_DEPTH {
            return Err(ResolutionError::Nested(argv[0].clone()).into());
        }
        let line = history::expand(self.history, argv)?;
        tracing::debug!(%line, "history expansion");

        let recalled = Runner {
            depth: self.depth + 1,
            ..*self
        };
        let exiting = env.should_exit;
        let result = lexer::split_into_tokens(&line)
            .map_err(ShellError::from)
            .and_then(|tokens| recalled.run_tokens(&tokens, stdin, stdout, env));
        env.should_exit = exiting;

        Ok(result.unwrap_or_else(|err| {
            report(&err);
            err.status()
        }))
    }
}

/// Print an error for the user, the way the read loop recovers from it.
pub(crate) fn report(err: &ShellError) {
    tracing::debug!(error = ?err, "reporting error");
    eprintln!("{}", err);
}
