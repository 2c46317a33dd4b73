use crate::preferences::Preferences;
use crate::util;
use serde::Deserialize;
use std::fs;
use std::io;

// ===================================================================
// Bounds on the extracted summary
// ===================================================================

/// Most-recent qualifying user messages kept in the summary.
pub const MAX_USER_MESSAGES: usize = 10;
/// Distinct tool names kept, in insertion order.
pub const MAX_TOOLS: usize = 20;
/// Distinct modified-file paths kept, in insertion order.
pub const MAX_FILES: usize = 30;
/// Per-message character cap.
pub const MAX_MESSAGE_CHARS: usize = 200;

// ===================================================================
// Transcript records — one per JSONL line
// ===================================================================

/// A structured message record: `{"type":"message","message":{...}}`.
#[derive(Debug, Deserialize)]
pub struct MessageRecord {
    pub message: MessageBody,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

/// A content block inside `message.content[]`. Unknown block types
/// (thinking, tool_result, ...) fall through to `Other` and are skipped,
/// never treated as errors.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text(TextBlock),
    #[serde(rename = "tool_use")]
    ToolUse(ToolUseBlock),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ToolUseBlock {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input: ToolInput,
}

/// Only `file_path` matters for the summary; other input fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub file_path: Option<String>,
}

/// A legacy flat record: role at top level, no nested `message` field.
#[derive(Debug, Deserialize)]
pub struct LegacyRecord {
    #[serde(default)]
    pub content: Option<LegacyContent>,
}

/// Legacy `content` is either a plain string or a sequence of blocks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LegacyContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// One line of the transcript, classified into a known shape.
#[derive(Debug)]
pub enum TranscriptRecord {
    Message(MessageRecord),
    LegacyUser(LegacyRecord),
    Unrecognized,
}

impl TranscriptRecord {
    /// Classify a parsed JSON value by checking discriminating fields
    /// (`type`, `role`, presence of `message`) one by one, then
    /// deserializing the matching typed shape. Anything else is
    /// `Unrecognized`, never an error.
    pub fn classify(value: serde_json::Value) -> Self {
        let type_field = value.get("type").and_then(|v| v.as_str());
        if type_field == Some("message") && value.get("message").is_some() {
            return match serde_json::from_value(value) {
                Ok(rec) => Self::Message(rec),
                Err(_) => Self::Unrecognized,
            };
        }
        let role_field = value.get("role").and_then(|v| v.as_str());
        if (type_field == Some("user") || role_field == Some("user"))
            && value.get("message").is_none()
        {
            return match serde_json::from_value(value) {
                Ok(rec) => Self::LegacyUser(rec),
                Err(_) => Self::Unrecognized,
            };
        }
        Self::Unrecognized
    }
}

// ===================================================================
// Transcript reader
// ===================================================================

/// Read the transcript file's text. Absence or unreadability is a normal
/// outcome: it is logged and summary extraction is simply skipped.
pub fn read_transcript(path: &str) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Some(contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            util::log(format!("transcript not found: {path}"));
            None
        }
        Err(e) => {
            util::log(format!("transcript unreadable: {path}: {e}"));
            None
        }
    }
}

// ===================================================================
// Summary extraction
// ===================================================================

/// Bounded summary of one session's transcript.
#[derive(Debug, PartialEq, Eq)]
pub struct SessionSummary {
    /// Most-recent qualifying user messages, in original order.
    pub user_messages: Vec<String>,
    /// Distinct tool names, insertion order.
    pub tools_used: Vec<String>,
    /// Distinct file paths from mutating-tool invocations, insertion order.
    pub files_modified: Vec<String>,
    /// True qualifying-message count before truncation.
    pub total_messages: usize,
}

/// Truncate to at most `max` chars without splitting a char boundary.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}

fn push_unique(vec: &mut Vec<String>, value: String) {
    if !vec.contains(&value) {
        vec.push(value);
    }
}

/// Walk the transcript line by line and accumulate a bounded summary of
/// user intents, tool usage, and modified files.
///
/// Each non-empty line is parsed as an independent JSON value; one corrupt
/// line never aborts the pass (errors are counted and reported once at the
/// end). Returns `None` when no qualifying user message was found.
pub fn extract_summary(contents: &str, prefs: &Preferences) -> Option<SessionSummary> {
    let mut user_messages: Vec<String> = Vec::new();
    let mut tools_used: Vec<String> = Vec::new();
    let mut files_modified: Vec<String> = Vec::new();
    let mut parse_errors = 0usize;
    let mut total_lines = 0usize;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        total_lines += 1;
        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };

        match TranscriptRecord::classify(value) {
            TranscriptRecord::Message(rec) if rec.message.role == "user" => {
                for block in &rec.message.content {
                    if let ContentBlock::Text(t) = block {
                        push_qualifying(&mut user_messages, &t.text, prefs);
                    }
                }
            }
            TranscriptRecord::Message(rec) if rec.message.role == "assistant" => {
                for block in &rec.message.content {
                    if let ContentBlock::ToolUse(tu) = block {
                        if tu.name.is_empty() {
                            continue;
                        }
                        push_unique(&mut tools_used, tu.name.clone());
                        if let Some(path) = tu.input.file_path.as_deref() {
                            if !path.is_empty() && prefs.is_mutating_tool(&tu.name) {
                                push_unique(&mut files_modified, path.to_string());
                            }
                        }
                    }
                }
            }
            TranscriptRecord::LegacyUser(rec) => {
                if let Some(text) = normalize_legacy_content(rec.content.as_ref(), prefs) {
                    push_qualifying(&mut user_messages, &text, prefs);
                }
            }
            _ => {}
        }
    }

    if parse_errors > 0 {
        util::log(format!(
            "skipped {parse_errors}/{total_lines} unparseable transcript lines"
        ));
    }

    if user_messages.is_empty() {
        return None;
    }

    let total_messages = user_messages.len();
    let skip = total_messages.saturating_sub(MAX_USER_MESSAGES);
    user_messages.drain(..skip);
    tools_used.truncate(MAX_TOOLS);
    files_modified.truncate(MAX_FILES);

    Some(SessionSummary {
        user_messages,
        tools_used,
        files_modified,
        total_messages,
    })
}

/// Apply the qualifying rule to one candidate message: trim, drop noise
/// prefixes and sub-2-char strings, cap at `MAX_MESSAGE_CHARS`.
fn push_qualifying(user_messages: &mut Vec<String>, text: &str, prefs: &Preferences) {
    let text = text.trim();
    if text.chars().count() < 2 || prefs.is_noise(text) {
        return;
    }
    user_messages.push(truncate_chars(text, MAX_MESSAGE_CHARS).to_string());
}

/// Normalize legacy `content` to plain text: strings pass through; block
/// sequences contribute their non-noise text blocks joined by single spaces.
fn normalize_legacy_content(
    content: Option<&LegacyContent>,
    prefs: &Preferences,
) -> Option<String> {
    match content? {
        LegacyContent::Text(s) => Some(s.clone()),
        LegacyContent::Blocks(blocks) => {
            let parts: Vec<&str> = blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text(t) if !t.text.is_empty() && !prefs.is_noise(&t.text) => {
                        Some(t.text.as_str())
                    }
                    _ => None,
                })
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(" "))
            }
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
