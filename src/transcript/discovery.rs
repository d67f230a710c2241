use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Directory name holding nested subagent transcripts.
pub const SUBAGENTS_DIR: &str = "subagents";

/// Find all session JSONL files under `root`, in file-name order.
///
/// Anything inside a `subagents` directory is left out; those transcripts
/// are counted by their parent session instead. A missing root is reported
/// and yields no sessions.
pub fn find_sessions(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        tracing::warn!("Claude directory not found: {}", root.display());
        return Vec::new();
    }

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != SUBAGENTS_DIR);

    let mut sessions = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read directory entry");
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }
        if entry.path().extension().is_some_and(|ext| ext == "jsonl") {
            sessions.push(entry.into_path());
        }
    }

    sessions
}
