//! Tally - notepad calculator REPL
//!
//! Reads lines from stdin (or `--eval` / `--file`), evaluates each one and
//! prints the result. Diagnostics go to stderr.

mod config;
mod logging;
mod session;

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tally_calc::Engine;

use crate::config::{CliConfig, Overrides};
use crate::session::{Flow, Session};

#[derive(Debug, Parser)]
#[command(name = "tally", version, about = "Notepad calculator with units, currencies and dates")]
struct Cli {
    /// Configuration file (TOML); defaults to <config dir>/tally/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Digits after the decimal point
    #[arg(long)]
    precision: Option<usize>,

    /// Disable natural-language phrases
    #[arg(long)]
    no_fuzzy: bool,

    /// Do not print the result of assignments
    #[arg(long)]
    quiet: bool,

    /// Evaluate an expression and exit (repeatable)
    #[arg(short, long, value_name = "EXPR")]
    eval: Vec<String>,

    /// Replay a saved session file and exit
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Print one JSON object per result
    #[arg(long)]
    json: bool,

    /// Emit diagnostics as JSON
    #[arg(long)]
    log_json: bool,

    /// Diagnostic level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        CliConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .apply(&Overrides {
            precision: cli.precision,
            no_fuzzy: cli.no_fuzzy,
            quiet: cli.quiet,
            log_level: cli.log_level.clone(),
            log_json: cli.log_json,
        })
        .context("Invalid command-line options")?;

    logging::init_logging(&config.log_level, config.log_json)
        .context("Failed to initialize logging")?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        precision = config.precision,
        fuzzy = config.fuzzy,
        quiet = config.quiet,
        "starting tally"
    );

    let mut session = Session::new(Engine::new(config.settings()), cli.json);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !cli.eval.is_empty() || cli.file.is_some() {
        if let Some(path) = &cli.file {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if session.replay(&text, &mut out)? == Flow::Quit {
                return Ok(());
            }
        }
        for expression in &cli.eval {
            if session.handle(expression, &mut out)? == Flow::Quit {
                break;
            }
        }
        return Ok(());
    }

    repl(&mut session, &mut out)
}

fn repl(session: &mut Session, out: &mut impl Write) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut input = stdin.lock();
    let mut line = String::new();

    loop {
        if interactive {
            write!(out, "> ")?;
            out.flush()?;
        }
        line.clear();
        if input.read_line(&mut line).context("Failed to read input")? == 0 {
            break;
        }
        let text = line.trim_end_matches(['\r', '\n']);
        if session.handle(text, out)? == Flow::Quit {
            break;
        }
    }

    Ok(())
}
