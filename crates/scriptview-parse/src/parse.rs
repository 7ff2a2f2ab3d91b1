use crate::element::{classify_element, DropReason, ElementVerdict};
use scriptview_core::{ParseError, ParseOutcome};
use serde_json::Value;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseStats {
    pub elements_read: usize,
    pub records_kept: usize,
    pub dropped_not_object: usize,
    pub dropped_missing_text: usize,
    pub speakers_defaulted: usize,
}

impl ParseStats {
    pub fn dropped(&self) -> usize {
        self.dropped_not_object + self.dropped_missing_text
    }
}

/// Parse one file's text into dialogue records.
///
/// Never panics and never returns an error other than [`ParseError`]:
/// invalid elements are dropped or defaulted, not reported.
pub fn parse_script(raw: &str) -> ParseOutcome {
    parse_script_with_stats(raw).0
}

/// Like [`parse_script`], also returning per-element counts.
pub fn parse_script_with_stats(raw: &str) -> (ParseOutcome, ParseStats) {
    let mut stats = ParseStats::default();

    let decoded: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            let err = ParseError::Malformed {
                detail: e.to_string(),
            };
            return (Err(err), stats);
        }
    };

    let elements = match decoded {
        Value::Array(elements) => elements,
        other => {
            let err = ParseError::NotAnArray {
                found: shape_name(&other),
            };
            return (Err(err), stats);
        }
    };

    let mut records = Vec::with_capacity(elements.len());
    for element in &elements {
        stats.elements_read += 1;
        match classify_element(element) {
            ElementVerdict::Keep {
                record,
                speaker_defaulted,
            } => {
                stats.records_kept += 1;
                if speaker_defaulted {
                    stats.speakers_defaulted += 1;
                }
                records.push(record);
            }
            ElementVerdict::Drop(DropReason::NotAnObject) => stats.dropped_not_object += 1,
            ElementVerdict::Drop(DropReason::MissingText) => stats.dropped_missing_text += 1,
        }
    }

    if stats.dropped() > 0 {
        tracing::debug!(
            read = stats.elements_read,
            kept = stats.records_kept,
            dropped = stats.dropped(),
            "dropped script elements"
        );
    }

    (Ok(records), stats)
}

fn shape_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptview_core::DialogueRecord;

    #[test]
    fn well_formed_array_in_order() {
        let raw = r#"[
            {"character": "Alice", "text": "one"},
            {"character": "Bob", "text": "two"},
            {"character": "Alice", "text": "three"}
        ]"#;
        let records = parse_script(raw).unwrap();
        assert_eq!(
            records,
            vec![
                DialogueRecord::new("Alice", "one"),
                DialogueRecord::new("Bob", "two"),
                DialogueRecord::new("Alice", "three"),
            ]
        );
    }

    #[test]
    fn empty_array_ok() {
        let records = parse_script("[]").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn not_json_is_malformed() {
        let err = parse_script("not json").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));
        assert_eq!(err.to_string(), "JSONの解析に失敗しました");
    }

    #[test]
    fn truncated_json_is_malformed() {
        let err = parse_script(r#"[{"text": "a"}"#).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));
    }

    #[test]
    fn empty_text_is_malformed() {
        assert!(matches!(
            parse_script("").unwrap_err(),
            ParseError::Malformed { .. }
        ));
    }

    #[test]
    fn non_array_shapes_rejected() {
        for (raw, found) in [
            ("{}", "object"),
            (r#""x""#, "string"),
            ("123", "number"),
            ("null", "null"),
            ("true", "boolean"),
        ] {
            let err = parse_script(raw).unwrap_err();
            assert_eq!(err, ParseError::NotAnArray { found }, "input {raw}");
            assert_eq!(err.to_string(), "JSONは配列形式である必要があります");
        }
    }

    #[test]
    fn invalid_elements_dropped_order_kept() {
        let raw = r#"[
            {"character": "A", "text": "first"},
            null,
            {"character": "B"},
            "stray",
            {"text": "anon"},
            {"character": "C", "text": "last", "extra": 1}
        ]"#;
        let (outcome, stats) = parse_script_with_stats(raw);
        let records = outcome.unwrap();
        assert_eq!(
            records,
            vec![
                DialogueRecord::new("A", "first"),
                DialogueRecord::new("不明", "anon"),
                DialogueRecord::new("C", "last"),
            ]
        );
        assert_eq!(stats.elements_read, 6);
        assert_eq!(stats.records_kept, 3);
        assert_eq!(stats.dropped_not_object, 2);
        assert_eq!(stats.dropped_missing_text, 1);
        assert_eq!(stats.speakers_defaulted, 1);
    }

    #[test]
    fn all_elements_dropped_is_still_ok() {
        let records = parse_script(r#"[1, null, {"character": "A"}]"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn failure_stats_are_zero() {
        let (outcome, stats) = parse_script_with_stats("{}");
        assert!(outcome.is_err());
        assert_eq!(stats, ParseStats::default());
    }

    #[test]
    fn out_of_range_number_in_extra_field_is_ignored() {
        let raw = r#"[{"character": "A", "text": "hi", "id": 1e400}, {"text": -1e400}]"#;
        let (outcome, stats) = parse_script_with_stats(raw);
        assert_eq!(outcome.unwrap(), vec![DialogueRecord::new("A", "hi")]);
        assert_eq!(stats.dropped_missing_text, 1);
    }

    #[test]
    fn lone_surrogate_escape_is_malformed() {
        // Rust strings cannot hold unpaired surrogates.
        let err = parse_script(r#"[{"text": "hi", "note": "\ud800"}]"#).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));
    }

    #[test]
    fn multibyte_text_copied_verbatim() {
        let raw = r#"[{"character": "花子", "text": "おはよう、太郎くん！"}]"#;
        let records = parse_script(raw).unwrap();
        assert_eq!(records[0].speaker, "花子");
        assert_eq!(records[0].line, "おはよう、太郎くん！");
    }
}
