use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metrics extracted from one session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: Option<String>,
    pub jsonl_path: String,
    pub project: Option<String>,
    pub git_branch: Option<String>,

    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration_minutes: Option<f64>,

    pub tool_counts: BTreeMap<String, u64>,
    pub total_tool_calls: u64,
    pub errors: ErrorSummary,
    pub messages: MessageCounts,
    pub files: FileSummary,

    pub subagent_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub count: u64,
    pub samples: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageCounts {
    pub user: u64,
    pub assistant: u64,
    pub system: u64,
    pub total: u64,
}

impl MessageCounts {
    pub fn new(user: u64, assistant: u64, system: u64) -> Self {
        Self {
            user,
            assistant,
            system,
            total: user + assistant + system,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    pub read: usize,
    pub edited: usize,
    pub read_list: Vec<String>,
    pub edited_list: Vec<String>,
}

impl SessionRecord {
    /// Duration for aggregation, with a missing duration counted as zero.
    pub fn minutes(&self) -> f64 {
        self.duration_minutes.unwrap_or(0.0)
    }
}
