use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Previously submitted values per field id, most recent first.
///
/// The server owns the history; clients only mirror it. A field whose last value is removed
/// disappears from the map, so an empty history and an absent one look the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct ValueHistory(BTreeMap<String, Vec<String>>);

impl From<BTreeMap<String, Vec<String>>> for ValueHistory {
    fn from(entries: BTreeMap<String, Vec<String>>) -> Self {
        ValueHistory::new(entries)
    }
}

impl From<ValueHistory> for BTreeMap<String, Vec<String>> {
    fn from(history: ValueHistory) -> Self {
        history.0
    }
}

impl ValueHistory {
    pub fn new(entries: BTreeMap<String, Vec<String>>) -> Self {
        let mut entries = entries;
        entries.retain(|_, values| !values.is_empty());
        Self(entries)
    }

    /// Suggestions for one field, empty when the field has none.
    pub fn values(&self, field_id: &str) -> &[String] {
        self.0.get(field_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drops `value` from the field's history. Returns false when it was not there.
    pub fn remove(&mut self, field_id: &str, value: &str) -> bool {
        let Some(values) = self.0.get_mut(field_id) else {
            return false;
        };
        let before = values.len();
        values.retain(|v| v != value);
        let removed = values.len() != before;
        if values.is_empty() {
            self.0.remove(field_id);
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> ValueHistory {
        let mut entries = BTreeMap::new();
        entries.insert(
            "vehicle".to_string(),
            vec!["AA1234BB".to_string(), "BC0001AA".to_string()],
        );
        entries.insert("empty".to_string(), vec![]);
        ValueHistory::new(entries)
    }

    #[test]
    fn empty_entries_are_dropped_on_construction() {
        let history = history();
        assert!(history.values("empty").is_empty());
        assert_eq!(history.iter().count(), 1);
    }

    #[test]
    fn removing_last_value_drops_the_field() {
        let mut history = history();
        assert!(history.remove("vehicle", "AA1234BB"));
        assert_eq!(history.values("vehicle"), ["BC0001AA".to_string()]);
        assert!(history.remove("vehicle", "BC0001AA"));
        assert!(history.is_empty());
        assert!(!history.remove("vehicle", "BC0001AA"));
    }

    #[test]
    fn decodes_plain_map() {
        let history: ValueHistory =
            serde_json::from_str(r#"{"consignee":["ACME Ltd"]}"#).unwrap();
        assert_eq!(history.values("consignee"), ["ACME Ltd".to_string()]);
    }

    #[test]
    fn decoded_empty_entries_are_dropped() {
        let history: ValueHistory =
            serde_json::from_str(r#"{"x":[],"consignee":["ACME Ltd"]}"#).unwrap();
        assert_eq!(history.iter().count(), 1);

        let history: ValueHistory = serde_json::from_str(r#"{"x":[]}"#).unwrap();
        assert!(history.is_empty());
        assert_eq!(serde_json::to_string(&history).unwrap(), "{}");
    }
}
