pub mod jsonl;
pub mod summary;

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::config;
use crate::transcript::record::SessionRecord;
use crate::transcript::{discovery, parser};

use summary::SummaryReport;

/// What goes to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// One JSON record per session (default)
    #[default]
    Jsonl,
    /// Aggregate text report
    Summary,
}

pub fn run(mode: OutputMode) -> anyhow::Result<()> {
    let home = config::home_dir();
    let paths = match &home {
        Some(home) => discovery::find_sessions(&config::projects_dir(home)),
        None => {
            tracing::warn!("could not determine home directory, no sessions to scan");
            Vec::new()
        }
    };
    tracing::info!("Found {} session files", paths.len());

    let records = extract_all(&paths);

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match mode {
        OutputMode::Jsonl => jsonl::write_records(&records, &mut out)?,
        OutputMode::Summary => SummaryReport::build(&records, home.as_deref()).render(&mut out)?,
    }
    out.flush()?;

    Ok(())
}

/// Extract a record from each path, in order. Files that cannot be read or
/// hold no events are skipped.
pub fn extract_all(paths: &[PathBuf]) -> Vec<SessionRecord> {
    paths
        .iter()
        .filter_map(|path| match parser::parse_transcript(path) {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                tracing::debug!(path = %path.display(), "no events in transcript, skipping");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, path = %path.display(), "failed to read transcript, skipping");
                None
            }
        })
        .collect()
}
