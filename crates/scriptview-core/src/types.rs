use serde::{Deserialize, Serialize};

use crate::error::{FailureKind, LoadError, ParseError};

/// Speaker assigned to a line whose source element names no character.
pub const UNKNOWN_SPEAKER: &str = "不明";

/// Result of parsing one file's text. Carries no file identity; the caller
/// attaches the source name.
pub type ParseOutcome = Result<Vec<DialogueRecord>, ParseError>;

/// A single spoken line. Serializes back to the input element shape
/// (`{"character": .., "text": ..}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialogueRecord {
    #[serde(rename = "character")]
    pub speaker: String,
    #[serde(rename = "text")]
    pub line: String,
}

impl DialogueRecord {
    pub fn new(speaker: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            line: line.into(),
        }
    }

    /// A line with no attributed speaker.
    pub fn unattributed(line: impl Into<String>) -> Self {
        Self::new(UNKNOWN_SPEAKER, line)
    }

    pub fn is_unattributed(&self) -> bool {
        self.speaker == UNKNOWN_SPEAKER
    }
}

/// One successfully parsed file.
///
/// `source_name` is a display name and is not unique within a session: two
/// files with the same name stay two documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptDocument {
    pub source_name: String,
    pub records: Vec<DialogueRecord>,
}

impl ScriptDocument {
    pub fn new(source_name: impl Into<String>, records: Vec<DialogueRecord>) -> Self {
        Self {
            source_name: source_name.into(),
            records,
        }
    }
}

/// One file that could not become a [`ScriptDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    pub source_name: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl LoadFailure {
    pub fn new(source_name: impl Into<String>, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            kind,
            reason: reason.into(),
        }
    }

    /// Record `err` against `source_name`, using the error's display text as
    /// the user-facing reason.
    pub fn from_error(source_name: impl Into<String>, err: &LoadError) -> Self {
        Self::new(source_name, err.kind(), err.to_string())
    }
}
