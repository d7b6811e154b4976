mod commands;
mod config;
mod session;
mod view;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use config::CalbookConfig;
use session::{Mode, Session};
use view::ConsoleView;

#[derive(Parser)]
#[command(name = "calbook")]
#[command(about = "Manage calendars, recurring events and cross-calendar copies")]
struct Cli {
    /// Read commands from the terminal or from a file
    #[arg(long, value_enum, default_value_t = Mode::Interactive)]
    mode: Mode,

    /// Command file for headless mode
    file: Option<PathBuf>,

    /// Config file (defaults to ~/.config/calbook/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = CalbookConfig::load(cli.config.as_deref())?;
    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut session = Session::new(ConsoleView::new(stdout.lock(), color), &config);

    match cli.mode {
        Mode::Interactive => session.run(io::stdin().lock(), Mode::Interactive),
        Mode::Headless => {
            let Some(path) = cli.file else {
                anyhow::bail!("Headless mode needs a command file: calbook --mode headless <file>");
            };
            let file = File::open(&path)
                .with_context(|| format!("Could not open command file {}", path.display()))?;
            session.run(BufReader::new(file), Mode::Headless)
        }
    }
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}
