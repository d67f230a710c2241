use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Why a transcript line did not produce an [`Event`].
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("blank line")]
    Blank,
    #[error("line is not a JSON object")]
    NotAnObject,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One decoded transcript line.
#[derive(Debug, Default, PartialEq)]
pub struct Event {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub git_branch: Option<String>,
    pub timestamp: Option<String>,
    pub body: EventBody,
}

#[derive(Debug, Default, PartialEq)]
pub enum EventBody {
    User { content: Vec<ContentItem> },
    Assistant { content: Vec<ContentItem> },
    System,
    /// Progress, summary, file-history-snapshot, or no `type` at all.
    #[default]
    Other,
}

/// An entry of a structured `message.content` array.
#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    ToolUse {
        #[serde(default = "unknown_tool", deserialize_with = "tool_name")]
        name: String,
        #[serde(default, deserialize_with = "lenient")]
        input: Option<ToolInput>,
    },
    ToolResult {
        #[serde(default, deserialize_with = "flag")]
        is_error: bool,
        #[serde(default)]
        content: Value,
    },
    #[serde(other)]
    Other,
}

impl ContentItem {
    /// Items that are not objects or carry no recognizable tag become `Other`.
    fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or(ContentItem::Other)
    }
}

#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct ToolInput {
    #[serde(default, deserialize_with = "lenient")]
    pub file_path: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub path: Option<String>,
}

impl ToolInput {
    /// The file a tool acted on: `file_path`, falling back to `path`.
    pub fn target(&self) -> Option<&str> {
        fn non_empty(p: &Option<String>) -> Option<&str> {
            p.as_deref().filter(|p| !p.is_empty())
        }
        non_empty(&self.file_path).or_else(|| non_empty(&self.path))
    }
}

/// Render tool-result content as text. Strings pass through, `null` is empty,
/// anything else becomes compact JSON.
pub fn result_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    session_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    cwd: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    git_branch: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default, deserialize_with = "lenient")]
    content: Option<Vec<Value>>,
}

/// Best-effort decode of one transcript line.
///
/// Only the line as a whole can fail. A field with an unexpected shape
/// decodes as absent and the rest of the event is kept.
pub fn decode_line(line: &[u8]) -> Result<Event, LineError> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Err(LineError::Blank);
    }

    let value: Value = serde_json::from_slice(line)?;
    if !value.is_object() {
        return Err(LineError::NotAnObject);
    }
    let raw = RawEvent::deserialize(value)?;

    let body = match raw.kind.as_deref() {
        Some("user") => EventBody::User {
            content: content_items(raw.message),
        },
        Some("assistant") => EventBody::Assistant {
            content: content_items(raw.message),
        },
        Some("system") => EventBody::System,
        _ => EventBody::Other,
    };

    Ok(Event {
        session_id: raw.session_id,
        cwd: raw.cwd,
        git_branch: raw.git_branch,
        timestamp: raw.timestamp,
        body,
    })
}

fn content_items(message: Option<RawMessage>) -> Vec<ContentItem> {
    message
        .and_then(|m| m.content)
        .unwrap_or_default()
        .into_iter()
        .map(ContentItem::from_value)
        .collect()
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn tool_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient::<D, String>(deserializer)?.unwrap_or_else(unknown_tool))
}

/// JSON truthiness: `false`, `null`, zero, `""`, `[]` and `{}` are false.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(truthy(&Value::deserialize(deserializer)?))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn unknown_tool() -> String {
    "unknown".to_string()
}
