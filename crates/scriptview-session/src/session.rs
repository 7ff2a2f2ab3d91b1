use std::collections::{BTreeSet, HashSet};

use scriptview_core::{DialogueRecord, LoadFailure, ScriptDocument};

use crate::order::SpeakerOrder;
use crate::view::{FilteredSection, FilteredView};

/// Accumulated state of one viewing session.
///
/// Every transition consumes the session and returns the next one.
/// `documents` and `failures` only grow in arrival order; `failures` is
/// cleared by [`Session::dismiss_failures`] and nothing else is ever removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    documents: Vec<ScriptDocument>,
    failures: Vec<LoadFailure>,
    speaker_filter: BTreeSet<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[ScriptDocument] {
        &self.documents
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Selected speakers. Empty means no filter.
    pub fn speaker_filter(&self) -> &BTreeSet<String> {
        &self.speaker_filter
    }

    pub fn is_filtering(&self) -> bool {
        !self.speaker_filter.is_empty()
    }

    pub fn has_documents(&self) -> bool {
        !self.documents.is_empty()
    }

    // ── Transitions ──

    /// Append documents after the existing ones, keeping their order.
    /// Same-named documents are kept as separate entries.
    #[must_use]
    pub fn append_documents(mut self, new_docs: impl IntoIterator<Item = ScriptDocument>) -> Self {
        self.documents.extend(new_docs);
        self
    }

    #[must_use]
    pub fn append_failures(mut self, new_fails: impl IntoIterator<Item = LoadFailure>) -> Self {
        self.failures.extend(new_fails);
        self
    }

    /// Clear the failure list. Documents and filter are untouched.
    #[must_use]
    pub fn dismiss_failures(mut self) -> Self {
        self.failures.clear();
        self
    }

    /// Replace the speaker selection wholesale.
    #[must_use]
    pub fn set_filter(mut self, selected: BTreeSet<String>) -> Self {
        self.speaker_filter = selected;
        self
    }

    #[must_use]
    pub fn clear_filter(self) -> Self {
        self.set_filter(BTreeSet::new())
    }

    /// Remove `speaker` from the selection if present, otherwise add it.
    #[must_use]
    pub fn toggle_speaker(self, speaker: &str) -> Self {
        let mut selected = self.speaker_filter.clone();
        if !selected.remove(speaker) {
            selected.insert(speaker.to_string());
        }
        self.set_filter(selected)
    }

    // ── Derived queries ──

    /// Distinct speakers in first-occurrence order across all documents.
    /// Computed from the current documents on every call.
    pub fn speaker_index(&self) -> Vec<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        self.records()
            .map(|r| r.speaker.as_str())
            .filter(|speaker| seen.insert(*speaker))
            .collect()
    }

    pub fn speaker_index_by(&self, order: SpeakerOrder) -> Vec<&str> {
        let mut speakers = self.speaker_index();
        if order == SpeakerOrder::Alphabetical {
            // UTF-16 code unit order, as in a JavaScript array sort.
            speakers.sort_unstable_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));
        }
        speakers
    }

    /// Records passing the speaker filter, grouped by document.
    pub fn filtered_view(&self) -> FilteredView<'_> {
        let sections = self
            .documents
            .iter()
            .filter_map(|document| {
                let records: Vec<&DialogueRecord> = document
                    .records
                    .iter()
                    .filter(|r| self.admits(&r.speaker))
                    .collect();
                (!records.is_empty()).then_some(FilteredSection { document, records })
            })
            .collect();
        FilteredView::new(sections)
    }

    fn admits(&self, speaker: &str) -> bool {
        self.speaker_filter.is_empty() || self.speaker_filter.contains(speaker)
    }

    fn records(&self) -> impl Iterator<Item = &DialogueRecord> {
        self.documents.iter().flat_map(|d| d.records.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptview_core::FailureKind;

    fn doc(name: &str, lines: &[(&str, &str)]) -> ScriptDocument {
        ScriptDocument::new(
            name,
            lines
                .iter()
                .map(|(speaker, line)| DialogueRecord::new(*speaker, *line))
                .collect(),
        )
    }

    fn failure(name: &str) -> LoadFailure {
        LoadFailure::new(name, FailureKind::Malformed, "JSONの解析に失敗しました")
    }

    fn filter_of(speakers: &[&str]) -> BTreeSet<String> {
        speakers.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_session_is_empty() {
        let s = Session::new();
        assert!(!s.has_documents());
        assert_eq!(s.failure_count(), 0);
        assert!(!s.is_filtering());
        assert!(s.speaker_index().is_empty());
        assert!(s.filtered_view().is_empty());
    }

    #[test]
    fn append_preserves_arrival_order() {
        let a = doc("a.json", &[("A", "1")]);
        let b = doc("b.json", &[("B", "2")]);
        let s = Session::new()
            .append_documents(vec![a.clone()])
            .append_documents(vec![b.clone()]);
        assert_eq!(s.documents(), &[a, b]);
    }

    #[test]
    fn append_keeps_same_named_documents() {
        let first = doc("script.json", &[("A", "1")]);
        let second = doc("script.json", &[("B", "2")]);
        let s = Session::new().append_documents(vec![first, second]);
        assert_eq!(s.documents().len(), 2);
        assert_eq!(s.filtered_view().len(), 2);
    }

    #[test]
    fn append_empty_is_noop() {
        let s = Session::new()
            .append_documents(vec![doc("a.json", &[("A", "1")])])
            .append_failures(vec![failure("x.json")]);
        let before = s.clone();
        let after = s.append_documents(Vec::new()).append_failures(Vec::new());
        assert_eq!(after, before);
    }

    #[test]
    fn dismiss_clears_failures_only() {
        let s = Session::new()
            .append_documents(vec![doc("a.json", &[("A", "1")])])
            .append_failures(vec![failure("x.json")])
            .append_failures(vec![failure("y.json")])
            .toggle_speaker("A");
        assert_eq!(s.failure_count(), 2);
        let docs_before = s.documents().to_vec();

        let s = s.dismiss_failures();
        assert!(s.failures().is_empty());
        assert_eq!(s.documents(), docs_before.as_slice());
        assert_eq!(s.speaker_filter(), &filter_of(&["A"]));
    }

    #[test]
    fn failures_append_in_order() {
        let s = Session::new()
            .append_failures(vec![failure("1.json"), failure("2.json")])
            .append_failures(vec![failure("3.json")]);
        let names: Vec<&str> = s.failures().iter().map(|f| f.source_name.as_str()).collect();
        assert_eq!(names, vec!["1.json", "2.json", "3.json"]);
    }

    #[test]
    fn toggle_twice_is_identity() {
        let s = Session::new()
            .append_documents(vec![doc("a.json", &[("A", "1"), ("B", "2")])])
            .toggle_speaker("B");
        let again = s.clone().toggle_speaker("A").toggle_speaker("A");
        assert_eq!(again, s);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let s = Session::new().toggle_speaker("A");
        assert_eq!(s.speaker_filter(), &filter_of(&["A"]));
        assert!(s.is_filtering());
        let s = s.toggle_speaker("B");
        assert_eq!(s.speaker_filter(), &filter_of(&["A", "B"]));
        let s = s.toggle_speaker("A");
        assert_eq!(s.speaker_filter(), &filter_of(&["B"]));
    }

    #[test]
    fn set_filter_replaces_wholesale() {
        let s = Session::new()
            .set_filter(filter_of(&["A", "B"]))
            .set_filter(filter_of(&["C"]));
        assert_eq!(s.speaker_filter(), &filter_of(&["C"]));
        let s = s.clear_filter();
        assert!(!s.is_filtering());
    }

    #[test]
    fn speaker_index_first_occurrence() {
        let s = Session::new()
            .append_documents(vec![doc("1.json", &[("A", "x"), ("B", "y"), ("A", "z")])])
            .append_documents(vec![doc("2.json", &[("C", "w")])]);
        assert_eq!(s.speaker_index(), vec!["A", "B", "C"]);
    }

    #[test]
    fn speaker_index_recomputed_after_append() {
        let s = Session::new().append_documents(vec![doc("1.json", &[("B", "x")])]);
        assert_eq!(s.speaker_index(), vec!["B"]);
        let s = s.append_documents(vec![doc("2.json", &[("A", "y"), ("B", "z")])]);
        assert_eq!(s.speaker_index(), vec!["B", "A"]);
    }

    #[test]
    fn speaker_index_alphabetical() {
        let s = Session::new().append_documents(vec![doc(
            "1.json",
            &[("Charlie", "x"), ("Alice", "y"), ("Bob", "z")],
        )]);
        assert_eq!(
            s.speaker_index_by(SpeakerOrder::Alphabetical),
            vec!["Alice", "Bob", "Charlie"]
        );
        assert_eq!(
            s.speaker_index_by(SpeakerOrder::FirstSeen),
            vec!["Charlie", "Alice", "Bob"]
        );
    }

    #[test]
    fn alphabetical_sorts_by_utf16_units() {
        // U+1F600 encodes as a D83D surrogate, below U+FF21.
        let s = Session::new().append_documents(vec![doc(
            "1.json",
            &[("\u{ff21}", "x"), ("\u{1f600}", "y"), ("A", "z")],
        )]);
        assert_eq!(
            s.speaker_index_by(SpeakerOrder::Alphabetical),
            vec!["A", "\u{1f600}", "\u{ff21}"]
        );
    }

    #[test]
    fn speaker_matching_is_exact() {
        let s = Session::new()
            .append_documents(vec![doc("1.json", &[("Alice", "x"), ("alice", "y")])])
            .toggle_speaker("Alice");
        assert_eq!(s.speaker_index(), vec!["Alice", "alice"]);
        let view = s.filtered_view();
        assert_eq!(view.record_count(), 1);
        assert_eq!(view.sections()[0].records[0].line, "x");
    }

    #[test]
    fn filtered_view_omits_empty_sections() {
        let doc1 = doc("doc1", &[("A", "hi"), ("B", "yo")]);
        let doc2 = doc("doc2", &[("C", "x")]);
        let s = Session::new()
            .append_documents(vec![doc1.clone(), doc2])
            .set_filter(filter_of(&["A"]));
        let view = s.filtered_view();
        assert_eq!(view.len(), 1);
        let section = &view.sections()[0];
        assert_eq!(section.document, &doc1);
        assert_eq!(section.records, vec![&DialogueRecord::new("A", "hi")]);
    }

    #[test]
    fn unfiltered_view_shows_everything_except_empty_documents() {
        let s = Session::new().append_documents(vec![
            doc("a", &[("A", "1"), ("B", "2")]),
            doc("empty", &[]),
            doc("b", &[("C", "3")]),
        ]);
        let view = s.filtered_view();
        let names: Vec<&str> = view
            .iter()
            .map(|sec| sec.document.source_name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(view.record_count(), 3);
    }

    #[test]
    fn filter_excluding_everything_is_nothing_to_show() {
        let s = Session::new()
            .append_documents(vec![doc("a", &[("A", "1")])])
            .toggle_speaker("Z");
        assert!(s.has_documents());
        assert!(s.filtered_view().is_empty());
    }

    #[test]
    fn filter_keeps_record_order_within_document() {
        let s = Session::new()
            .append_documents(vec![doc(
                "a",
                &[("A", "1"), ("B", "2"), ("A", "3"), ("C", "4"), ("B", "5")],
            )])
            .set_filter(filter_of(&["A", "B"]));
        let lines: Vec<&str> = s.filtered_view().sections()[0]
            .records
            .iter()
            .map(|r| r.line.as_str())
            .collect();
        assert_eq!(lines, vec!["1", "2", "3", "5"]);
    }
}
