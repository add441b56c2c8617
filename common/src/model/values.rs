use std::collections::BTreeMap;

/// Placeholder → raw value as typed by the user. Sparse: untouched fields are absent.
pub type FormValues = BTreeMap<String, String>;

/// Formula placeholder → formatted result (or [`crate::formula::ERROR_SENTINEL`]).
pub type ComputedValues = BTreeMap<String, String>;

/// Blank values count as "unset" for availability and submission gating.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// FormValues ∪ ComputedValues, computed entries winning on key collisions.
pub fn merge_values(values: &FormValues, computed: &ComputedValues) -> FormValues {
    let mut merged = values.clone();
    merged.extend(computed.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Looks up a placeholder by its exact key, then by its other spelling: `NAME` is also
/// found under `{{NAME}}` and `{{NAME}}` under `NAME`.
pub fn resolve<'a>(values: &'a FormValues, name: &str) -> Option<&'a str> {
    if let Some(value) = values.get(name) {
        return Some(value.as_str());
    }
    let alternative = match name
        .strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
    {
        Some(inner) => inner.trim().to_string(),
        None => format!("{{{{{}}}}}", name),
    };
    values.get(&alternative).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_accepts_both_spellings() {
        let mut values = FormValues::new();
        values.insert("{{WEIGHT}}".to_string(), "12".to_string());
        values.insert("QTY".to_string(), "3".to_string());

        assert_eq!(resolve(&values, "WEIGHT"), Some("12"));
        assert_eq!(resolve(&values, "{{WEIGHT}}"), Some("12"));
        assert_eq!(resolve(&values, "{{QTY}}"), Some("3"));
        assert_eq!(resolve(&values, "PRICE"), None);
    }

    #[test]
    fn computed_values_override_submitted_ones() {
        let mut values = FormValues::new();
        values.insert("B".to_string(), "stale".to_string());
        values.insert("A".to_string(), "3".to_string());
        let mut computed = ComputedValues::new();
        computed.insert("B".to_string(), "6.00".to_string());

        let merged = merge_values(&values, &computed);
        assert_eq!(merged.get("B").map(String::as_str), Some("6.00"));
        assert_eq!(merged.get("A").map(String::as_str), Some("3"));
    }

    #[test]
    fn whitespace_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("  \t"));
        assert!(!is_blank(" 0 "));
    }
}
