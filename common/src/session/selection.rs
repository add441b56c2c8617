use crate::model::{FormValues, TemplateDefinition};
use crate::requests::GenerateArchiveRequest;
use std::collections::{BTreeMap, BTreeSet};

/// Which formats of one template go into the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub original: bool,
    pub pdf: bool,
}

impl FormatFlags {
    pub fn new(original: bool, pdf: bool) -> Self {
        Self { original, pdf }
    }

    pub fn any(&self) -> bool {
        self.original || self.pdf
    }

    pub fn file_count(&self) -> usize {
        usize::from(self.original) + usize::from(self.pdf)
    }
}

/// Ids of the templates the server reported as generatable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilitySet(BTreeSet<String>);

impl AvailabilitySet {
    pub fn from_templates(templates: &[TemplateDefinition]) -> Self {
        Self(templates.iter().map(|t| t.id.clone()).collect())
    }

    pub fn contains(&self, template_id: &str) -> bool {
        self.0.contains(template_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for AvailabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Templates chosen for bulk export. A template is a member only while at least one of its
/// flags is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSelection {
    entries: BTreeMap<String, FormatFlags>,
}

impl ArchiveSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, template_id: &str, original: bool, pdf: bool) {
        let flags = FormatFlags::new(original, pdf);
        if flags.any() {
            self.entries.insert(template_id.to_string(), flags);
        } else {
            self.entries.remove(template_id);
        }
    }

    /// Drops every template that is no longer available and returns the dropped ids.
    pub fn reconcile(&mut self, available: &AvailabilitySet) -> Vec<String> {
        let evicted: Vec<String> = self
            .entries
            .keys()
            .filter(|id| !available.contains(id))
            .cloned()
            .collect();
        for id in &evicted {
            self.entries.remove(id);
        }
        evicted
    }

    pub fn flags(&self, template_id: &str) -> FormatFlags {
        self.entries.get(template_id).copied().unwrap_or_default()
    }

    pub fn contains(&self, template_id: &str) -> bool {
        self.entries.contains_key(template_id)
    }

    /// Number of files the archive will hold.
    pub fn file_count(&self) -> usize {
        self.entries.values().map(FormatFlags::file_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn template_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn archive_request(&self, form_data: FormValues) -> GenerateArchiveRequest {
        let mut request = GenerateArchiveRequest {
            form_data,
            ..Default::default()
        };
        for (id, flags) in &self.entries {
            request.template_ids.push(id.clone());
            request.original_flags.insert(id.clone(), flags.original);
            request.pdf_flags.insert(id.clone(), flags.pdf);
        }
        request
    }
}

pub fn reconcile_selection(
    available: &AvailabilitySet,
    selection: &ArchiveSelection,
) -> ArchiveSelection {
    let mut reconciled = selection.clone();
    reconciled.reconcile(available);
    reconciled
}

/// Label shown next to the bulk export control.
pub fn file_count_label(count: usize) -> String {
    match count {
        0 => "No files selected".to_string(),
        1 => "1 file selected".to_string(),
        n => format!("{n} files selected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::{btree_set, vec};
    use proptest::prelude::*;

    #[test]
    fn toggle_without_flags_removes() {
        let mut selection = ArchiveSelection::new();
        selection.toggle("T", true, true);
        assert_eq!(selection.file_count(), 2);

        selection.toggle("T", false, false);
        assert!(!selection.contains("T"));
        assert!(selection.is_empty());

        selection.toggle("never-selected", false, false);
        assert!(selection.is_empty());
    }

    #[test]
    fn archive_request_carries_flags() {
        let mut selection = ArchiveSelection::new();
        selection.toggle("T", true, false);
        selection.toggle("V", false, true);

        let request = selection.archive_request(FormValues::new());
        assert_eq!(request.template_ids, ["T", "V"]);
        assert!(request.wants_original("T") && !request.wants_pdf("T"));
        assert!(!request.wants_original("V") && request.wants_pdf("V"));
    }

    #[test]
    fn labels() {
        assert_eq!(file_count_label(0), "No files selected");
        assert_eq!(file_count_label(1), "1 file selected");
        assert_eq!(file_count_label(4), "4 files selected");
    }

    fn toggles() -> impl Strategy<Value = Vec<(u8, bool, bool)>> {
        vec((0u8..8, any::<bool>(), any::<bool>()), 0..24)
    }

    fn build(toggles: &[(u8, bool, bool)]) -> ArchiveSelection {
        let mut selection = ArchiveSelection::new();
        for (id, original, pdf) in toggles {
            selection.toggle(&format!("t{id}"), *original, *pdf);
        }
        selection
    }

    proptest! {
        #[test]
        fn reconciled_selection_is_subset_of_available(
            toggles in toggles(),
            available in btree_set(0u8..8, 0..8),
        ) {
            let available: AvailabilitySet = available.iter().map(|id| format!("t{id}")).collect();
            let reconciled = reconcile_selection(&available, &build(&toggles));
            for id in reconciled.template_ids() {
                prop_assert!(available.contains(id));
            }
        }

        #[test]
        fn reconcile_is_idempotent(
            toggles in toggles(),
            available in btree_set(0u8..8, 0..8),
        ) {
            let available: AvailabilitySet = available.iter().map(|id| format!("t{id}")).collect();
            let once = reconcile_selection(&available, &build(&toggles));
            let twice = reconcile_selection(&available, &once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn file_count_matches_set_flags(toggles in toggles()) {
            let mut last = BTreeMap::new();
            for (id, original, pdf) in &toggles {
                last.insert(*id, (*original, *pdf));
            }
            let expected: usize = last
                .values()
                .map(|(original, pdf)| usize::from(*original) + usize::from(*pdf))
                .sum();

            let selection = build(&toggles);
            prop_assert_eq!(selection.file_count(), expected);
            prop_assert!(selection.template_ids().all(|id| selection.flags(id).any()));
        }

        #[test]
        fn clearing_both_flags_always_removes(toggles in toggles(), id in 0u8..8) {
            let mut selection = build(&toggles);
            let id = format!("t{id}");
            selection.toggle(&id, false, false);
            prop_assert!(!selection.contains(&id));
        }
    }
}
