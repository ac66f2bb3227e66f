//! Append-only log of board data that couldn't be loaded or saved.
//!
//! When the state file is unreadable the board falls back to its seed, and
//! when a save fails the in-memory board is the only copy. Either way the
//! raw data is appended here first so nothing is silently lost.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use super::json_store::atomic_write;

/// Once the log grows past this, the oldest entries are dropped on the next
/// append until it fits in half the size.
const MAX_LOG_SIZE: usize = 1_048_576;

/// Self-documenting header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- dealboard recovery log: append-only
     Board state that could not be read or written is kept here.
     View with: deals recovery
     Safe to delete once you have what you need. -->

---
";

/// Separator between timestamp and category in entry headers
const HEADER_SEP: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// Persisted state could not be parsed
    Parse,
    /// Board state could not be written
    Write,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Parse => write!(f, "parse"),
            RecoveryCategory::Write => write!(f, "write"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "parse" => Some(RecoveryCategory::Parse),
            "write" => Some(RecoveryCategory::Write),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl RecoveryEntry {
    pub fn new(category: RecoveryCategory, description: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Format this entry as a markdown block for the recovery log.
    fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {}{}{}: {}\n\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            HEADER_SEP,
            self.category,
            self.description,
        );

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        if !self.body.is_empty() {
            out.push_str("\n```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }

        out.push_str("\n---\n");
        out
    }

    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }

    /// Same content as `other`, ignoring when it was logged. Bodies are
    /// compared line by line since the log doesn't keep line endings.
    fn repeats(&self, other: &RecoveryEntry) -> bool {
        self.category == other.category
            && self.description == other.description
            && self.fields == other.fields
            && self.body.lines().eq(other.body.lines())
    }

    /// Human-readable form for `deals recovery`
    pub fn to_display_markdown(&self) -> String {
        self.to_markdown()
    }
}

pub fn recovery_log_path(board_dir: &Path) -> PathBuf {
    board_dir.join(".recovery.log")
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Append a recovery entry to the log. Failures are reported through
/// tracing and otherwise ignored.
pub fn log_recovery(board_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = append_entry(board_dir, &entry) {
        tracing::warn!(error = %e, "could not write to recovery log");
    }
}

fn append_entry(board_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(board_dir);
    let existing = match std::fs::read(&path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    // Skip a repeat of the newest entry
    if parse_entries(&existing)
        .last()
        .is_some_and(|last| last.repeats(entry))
    {
        tracing::debug!(category = %entry.category, "recovery entry already logged");
        return Ok(());
    }

    if existing.len() > MAX_LOG_SIZE {
        trim_log(&path, &existing)?;
    }

    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())
}

/// Rewrite the log with only the newest entries that fit in half of
/// `MAX_LOG_SIZE`.
fn trim_log(path: &Path, content: &str) -> io::Result<()> {
    let entries = parse_entries(content);
    let mut kept = Vec::new();
    let mut size = FILE_HEADER.len();
    for entry in entries.iter().rev() {
        let markdown = entry.to_markdown();
        if size + markdown.len() > MAX_LOG_SIZE / 2 {
            break;
        }
        size += markdown.len();
        kept.push(markdown);
    }

    tracing::debug!(
        dropped = entries.len() - kept.len(),
        kept = kept.len(),
        "trimmed recovery log"
    );
    let mut out = String::with_capacity(size);
    out.push_str(FILE_HEADER);
    for markdown in kept.iter().rev() {
        out.push_str(markdown);
    }
    atomic_write(path, out.as_bytes())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read entries, most recent first.
pub fn read_recovery_entries(
    board_dir: &Path,
    limit: Option<usize>,
    since: Option<DateTime<Utc>>,
) -> Vec<RecoveryEntry> {
    let content = match std::fs::read_to_string(recovery_log_path(board_dir)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);
    if let Some(since) = since {
        entries.retain(|e| e.timestamp >= since);
    }
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
    }
    entries.reverse();
    entries
}

/// Number of entries in the log, if there are any.
pub fn recovery_entry_count(board_dir: &Path) -> Option<usize> {
    let content = std::fs::read_to_string(recovery_log_path(board_dir)).ok()?;
    let count = parse_entries(&content).len();
    (count > 0).then_some(count)
}

fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body = String::new();
        let mut in_code_block = false;

        for line in lines.by_ref() {
            if in_code_block {
                if line == "```" {
                    in_code_block = false;
                } else {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(line);
                }
                continue;
            }
            if line == "---" {
                break;
            }
            if line.starts_with("```") {
                in_code_block = true;
                continue;
            }
            if let Some((key, value)) = line.trim().split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            fields,
            body,
        });
    }

    entries
}

/// Parse `<timestamp> | <category>: <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp, rest) = header.split_once(HEADER_SEP)?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp)
        .ok()?
        .with_timezone(&Utc);
    let (category, description) = rest.split_once(": ")?;
    let category = RecoveryCategory::parse_category(category)?;
    Some((timestamp, category, description.to_string()))
}
