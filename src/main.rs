mod cli;
mod config;
mod transcript;

use std::io::IsTerminal;

use clap::Parser;

use cli::OutputMode;

/// Scans `~/.claude/projects` and prints one JSON record per session,
/// or an aggregate report with `--summary`.
#[derive(Debug, Parser)]
#[command(
    name = "session-metrics",
    version,
    about = "Extract metrics from Claude Code session transcripts"
)]
struct Cli {
    /// Print an aggregate text report instead of JSONL records
    #[arg(long)]
    summary: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();

    tracing::debug!(?cli, "parsed CLI arguments");

    let mode = if cli.summary {
        OutputMode::Summary
    } else {
        OutputMode::Jsonl
    };
    cli::run(mode)
}
