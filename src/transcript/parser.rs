use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;

use super::discovery::SUBAGENTS_DIR;
use super::event::{decode_line, result_text, ContentItem, Event, EventBody};
use super::record::{ErrorSummary, FileSummary, MessageCounts, SessionRecord};
use super::timestamp::{elapsed_minutes, format_timestamp, parse_timestamp};
use super::truncate;
use crate::config::{MAX_ERROR_SAMPLES, MAX_ERROR_SAMPLE_LEN, MAX_READ_LIST};

/// Tool-result text that reads like a failure. Matches benign "not found"
/// output too.
static ERROR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)error|failed|exception|not found").unwrap());

/// Parse a session transcript JSONL file into a [`SessionRecord`].
/// Streams line-by-line; undecodable lines are skipped.
///
/// Returns `Ok(None)` when no line decodes into an event.
pub fn parse_transcript(path: &Path) -> anyhow::Result<Option<SessionRecord>> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut tally = Tally::default();
    let mut decoded = 0usize;

    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let event = match decode_line(&line) {
            Ok(event) => event,
            Err(err) => {
                tracing::trace!(path = %path.display(), line = index + 1, %err, "skipping line");
                continue;
            }
        };
        decoded += 1;
        tally.observe(event);
    }

    if decoded == 0 {
        return Ok(None);
    }

    let subagent_count = count_subagents(path);
    Ok(Some(tally.finish(path, subagent_count)))
}

/// Running totals for one transcript.
#[derive(Debug, Default)]
struct Tally {
    session_id: Option<String>,
    project: Option<String>,
    git_branch: Option<String>,

    start: Option<DateTime<FixedOffset>>,
    end: Option<DateTime<FixedOffset>>,

    tool_counts: BTreeMap<String, u64>,
    error_samples: Vec<String>,

    user_messages: u64,
    assistant_messages: u64,
    system_messages: u64,

    files_read: BTreeSet<String>,
    files_edited: BTreeSet<String>,
}

impl Tally {
    fn observe(&mut self, event: Event) {
        set_once(&mut self.session_id, event.session_id);
        set_once(&mut self.project, event.cwd);
        set_once(&mut self.git_branch, event.git_branch);

        if let Some(ts) = event.timestamp.as_deref().and_then(parse_timestamp) {
            self.observe_timestamp(ts);
        }

        match event.body {
            EventBody::User { content } => {
                self.user_messages += 1;
                self.extract_tool_results(&content);
            }
            EventBody::Assistant { content } => {
                self.assistant_messages += 1;
                self.extract_tool_uses(&content);
            }
            EventBody::System => self.system_messages += 1,
            EventBody::Other => {}
        }
    }

    /// Ties keep the first timestamp as the start and the last as the end.
    fn observe_timestamp(&mut self, ts: DateTime<FixedOffset>) {
        if self.start.map_or(true, |start| ts < start) {
            self.start = Some(ts);
        }
        if self.end.map_or(true, |end| ts >= end) {
            self.end = Some(ts);
        }
    }

    fn extract_tool_results(&mut self, content: &[ContentItem]) {
        for item in content {
            let ContentItem::ToolResult { is_error, content } = item else {
                continue;
            };

            let looks_failed = content
                .as_str()
                .is_some_and(|text| ERROR_PATTERN.is_match(text));

            if *is_error || looks_failed {
                self.error_samples
                    .push(truncate(&result_text(content), MAX_ERROR_SAMPLE_LEN));
            }
        }
    }

    fn extract_tool_uses(&mut self, content: &[ContentItem]) {
        for item in content {
            let ContentItem::ToolUse { name, input } = item else {
                continue;
            };

            *self.tool_counts.entry(name.clone()).or_insert(0) += 1;

            let Some(path) = input.as_ref().and_then(|i| i.target()) else {
                continue;
            };
            match name.as_str() {
                "Read" => {
                    self.files_read.insert(path.to_string());
                }
                "Edit" | "Write" => {
                    self.files_edited.insert(path.to_string());
                }
                _ => {}
            }
        }
    }

    fn finish(self, path: &Path, subagent_count: usize) -> SessionRecord {
        let duration_minutes = match (&self.start, &self.end) {
            (Some(start), Some(end)) => Some(elapsed_minutes(start, end)),
            _ => None,
        };

        SessionRecord {
            session_id: self.session_id,
            jsonl_path: path.to_string_lossy().to_string(),
            project: self.project,
            git_branch: self.git_branch,
            start_time: self.start.as_ref().map(format_timestamp),
            end_time: self.end.as_ref().map(format_timestamp),
            duration_minutes,
            total_tool_calls: self.tool_counts.values().sum(),
            tool_counts: self.tool_counts,
            errors: ErrorSummary {
                count: self.error_samples.len() as u64,
                samples: self
                    .error_samples
                    .into_iter()
                    .take(MAX_ERROR_SAMPLES)
                    .collect(),
            },
            messages: MessageCounts::new(
                self.user_messages,
                self.assistant_messages,
                self.system_messages,
            ),
            files: FileSummary {
                read: self.files_read.len(),
                edited: self.files_edited.len(),
                read_list: self.files_read.into_iter().take(MAX_READ_LIST).collect(),
                edited_list: self.files_edited.into_iter().collect(),
            },
            subagent_count,
        }
    }
}

/// Keep the first non-empty value seen for a metadata field.
fn set_once(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_some() {
        return;
    }
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *slot = Some(value);
    }
}

/// Count `*.jsonl` files in the `subagents` directory next to a transcript.
fn count_subagents(path: &Path) -> usize {
    let Some(dir) = path.parent().map(|p| p.join(SUBAGENTS_DIR)) else {
        return 0;
    };
    if !dir.is_dir() {
        return 0;
    }

    let pattern = format!("{}/*.jsonl", glob::Pattern::escape(&dir.to_string_lossy()));
    match glob::glob(&pattern) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .count(),
        Err(err) => {
            tracing::warn!(error = %err, dir = %dir.display(), "invalid subagent glob");
            0
        }
    }
}
