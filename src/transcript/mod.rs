pub mod discovery;
pub mod event;
pub mod parser;
pub mod record;
pub mod timestamp;

/// Keep at most `max_chars` characters of `s`.
pub fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
