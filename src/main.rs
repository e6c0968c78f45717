use argh::FromArgs;
use bangsh::{Interpreter, PromptStyle};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `BANGSH_LOG=debug`.
const LOG_ENV: &str = "BANGSH_LOG";

#[derive(FromArgs)]
/// A small shell with pipelines and `!` history recall.
struct Args {
    #[argh(switch, short = 'q')]
    /// do not print the prompt.
    quiet: bool,

    #[argh(switch, short = 'm')]
    /// print the prompt without colour.
    monochrome: bool,
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    Interpreter::default().repl(PromptStyle {
        quiet: args.quiet,
        monochrome: args.monochrome,
    })?;
    Ok(())
}
