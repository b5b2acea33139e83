//! Diagnostic messages and stream headers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message severity, ordered from least to most severe. A fatal message
/// implies the process exits non-zero after the header is flushed and the
/// stream is closed cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            other => Err(format!("Unknown severity: {}", other)),
        }
    }
}

/// One severity-tagged diagnostic produced by a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
}

/// Ordered block of diagnostics flushed exactly once per invocation, before
/// the first output row (or before exit when no rows are produced).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesHeader {
    messages: Vec<Message>,
}

impl MessagesHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, text: impl Into<String>) {
        self.messages.push(Message {
            severity,
            text: text.into(),
        });
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn has_fatal(&self) -> bool {
        self.messages
            .iter()
            .any(|message| message.severity == Severity::Fatal)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// The `key: value` header block the host writes before the input data
/// region. Entry order is preserved; lookup is by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputHeader {
    entries: Vec<(String, String)>,
}

impl InputHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, value)| value.as_str())
    }

    /// Append text to the value of the most recent entry, newline-joined.
    /// Used by the header reader for continuation lines.
    ///
    /// # Arguments
    /// * `text` - The continuation line, already stripped of its terminator
    ///
    /// # Returns
    /// False when the header has no entry to continue; the caller treats
    /// that orphan line as a framing error.
    pub fn append_to_last(&mut self, text: &str) -> bool {
        match self.entries.last_mut() {
            Some((_, value)) => {
                value.push('\n');
                value.push_str(text);
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
