use scriptview_core::{DialogueRecord, ScriptDocument};

/// One document's records that pass the speaker filter. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredSection<'a> {
    pub document: &'a ScriptDocument,
    pub records: Vec<&'a DialogueRecord>,
}

/// Filtered transcript, one section per document in arrival order.
///
/// Documents with no passing records are omitted. An empty view is the
/// "nothing to show" state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView<'a> {
    sections: Vec<FilteredSection<'a>>,
}

impl<'a> FilteredView<'a> {
    pub(crate) fn new(sections: Vec<FilteredSection<'a>>) -> Self {
        debug_assert!(sections.iter().all(|s| !s.records.is_empty()));
        Self { sections }
    }

    pub fn sections(&self) -> &[FilteredSection<'a>] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Total records across all sections.
    pub fn record_count(&self) -> usize {
        self.sections.iter().map(|s| s.records.len()).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilteredSection<'a>> {
        self.sections.iter()
    }
}

impl<'a> IntoIterator for FilteredView<'a> {
    type Item = FilteredSection<'a>;
    type IntoIter = std::vec::IntoIter<FilteredSection<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.into_iter()
    }
}
