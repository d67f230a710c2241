use std::path::{Path, PathBuf};

/// Maximum number of error samples kept on a session record.
pub const MAX_ERROR_SAMPLES: usize = 5;
/// Error samples are cut to this many characters at extraction time.
pub const MAX_ERROR_SAMPLE_LEN: usize = 200;
/// Maximum number of entries in a record's `read_list`.
pub const MAX_READ_LIST: usize = 20;

/// The current user's home directory, if one can be determined.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Resolve the transcript root for a home directory: `<home>/.claude/projects`
pub fn projects_dir(home: &Path) -> PathBuf {
    home.join(".claude").join("projects")
}

/// Shorten a path for display by replacing a leading `home` with `~`.
pub fn abbreviate_home(path: &str, home: Option<&Path>) -> String {
    let home = match home.and_then(|h| h.to_str()).map(|h| h.trim_end_matches('/')) {
        Some(h) if !h.is_empty() => h,
        _ => return path.to_string(),
    };

    match path.strip_prefix(home) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => format!("~{}", rest),
        _ => path.to_string(),
    }
}
