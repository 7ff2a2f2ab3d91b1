use scriptview_core::{DialogueRecord, UNKNOWN_SPEAKER};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementVerdict {
    /// The element yields a record. `speaker_defaulted` is set when the
    /// element had no string `character` and the sentinel was used.
    Keep {
        record: DialogueRecord,
        speaker_defaulted: bool,
    },
    Drop(DropReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Not a JSON object (includes `null`).
    NotAnObject,
    /// An object without a string `text` field.
    MissingText,
}

impl ElementVerdict {
    pub fn into_record(self) -> Option<DialogueRecord> {
        match self {
            ElementVerdict::Keep { record, .. } => Some(record),
            ElementVerdict::Drop(_) => None,
        }
    }
}

/// Classify one element of a script array.
///
/// Only `character` and `text` are projected; other fields are ignored.
/// A missing or non-string `text` drops the element, a missing or non-string
/// `character` keeps it under [`UNKNOWN_SPEAKER`].
pub fn classify_element(element: &Value) -> ElementVerdict {
    let Some(obj) = element.as_object() else {
        return ElementVerdict::Drop(DropReason::NotAnObject);
    };

    let Some(line) = obj.get("text").and_then(Value::as_str) else {
        return ElementVerdict::Drop(DropReason::MissingText);
    };

    match obj.get("character").and_then(Value::as_str) {
        Some(speaker) => ElementVerdict::Keep {
            record: DialogueRecord::new(speaker, line),
            speaker_defaulted: false,
        },
        None => ElementVerdict::Keep {
            record: DialogueRecord::new(UNKNOWN_SPEAKER, line),
            speaker_defaulted: true,
        },
    }
}
