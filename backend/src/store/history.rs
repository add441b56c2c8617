use super::{Store, StoreError};
use common::model::values::{is_blank, resolve};
use common::model::{FormConfig, FormValues, ValueHistory};
use log::debug;
use rusqlite::params;
use std::collections::BTreeMap;

/// Values kept per field, most recent first.
pub const HISTORY_LIMIT: usize = 50;

impl Store {
    pub fn history(&self) -> Result<ValueHistory, StoreError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT field_id, value FROM field_history ORDER BY field_id, seq DESC")?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get(1)?)))?;
            let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for row in rows {
                let (field_id, value) = row?;
                entries.entry(field_id).or_default().push(value);
            }
            Ok(ValueHistory::new(entries))
        })
    }

    /// Records the submitted values of every field flagged `rememberValues`. A value that
    /// is already known moves to the front. Returns the number of values recorded.
    pub fn remember_values(&self, config: &FormConfig, values: &FormValues) -> Result<usize, StoreError> {
        let remembered: Vec<(&str, &str)> = config
            .fields
            .iter()
            .filter(|field| field.remember_values)
            .filter_map(|field| {
                resolve(values, &field.placeholder)
                    .filter(|value| !is_blank(value))
                    .map(|value| (field.id.as_str(), value.trim()))
            })
            .collect();
        if remembered.is_empty() {
            return Ok(0);
        }

        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            for (field_id, value) in &remembered {
                tx.execute(
                    "INSERT OR REPLACE INTO field_history (field_id, value) VALUES (?1, ?2)",
                    params![field_id, value],
                )?;
                tx.execute(
                    "DELETE FROM field_history
                     WHERE field_id = ?1 AND seq NOT IN (
                         SELECT seq FROM field_history WHERE field_id = ?1
                         ORDER BY seq DESC LIMIT ?2
                     )",
                    params![field_id, HISTORY_LIMIT as i64],
                )?;
            }
            tx.commit()?;
            debug!("Remembered {} field values", remembered.len());
            Ok(remembered.len())
        })
    }

    /// Returns false when the value was not in the field's history.
    pub fn remove_history_value(&self, field_id: &str, value: &str) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM field_history WHERE field_id = ?1 AND value = ?2",
                params![field_id, value],
            )?;
            Ok(removed > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::{FieldDefinition, FieldType};

    fn config() -> FormConfig {
        let field = |id: &str, remember: bool| FieldDefinition {
            id: id.to_string(),
            display_name: id.to_string(),
            placeholder: format!("{{{{{id}}}}}"),
            field_type: FieldType::Text,
            order: 0,
            required: false,
            remember_values: remember,
            formula: None,
            decimal_places: None,
        };
        FormConfig {
            fields: vec![field("vehicle", true), field("note", false)],
            templates: vec![],
        }
    }

    fn submit(store: &Store, vehicle: &str) {
        let mut values = FormValues::new();
        values.insert("{{vehicle}}".to_string(), vehicle.to_string());
        values.insert("{{note}}".to_string(), "not remembered".to_string());
        store.remember_values(&config(), &values).unwrap();
    }

    #[test]
    fn most_recent_first_without_duplicates() {
        let store = Store::open_in_memory().unwrap();
        submit(&store, "AA1234BB");
        submit(&store, " BC0001AA ");
        submit(&store, "AA1234BB");
        submit(&store, "   ");

        let history = store.history().unwrap();
        assert_eq!(history.values("vehicle"), ["AA1234BB", "BC0001AA"]);
        assert!(history.values("note").is_empty());
    }

    #[test]
    fn history_is_capped() {
        let store = Store::open_in_memory().unwrap();
        for n in 0..(HISTORY_LIMIT + 5) {
            submit(&store, &format!("V{n}"));
        }
        let history = store.history().unwrap();
        let values = history.values("vehicle");
        assert_eq!(values.len(), HISTORY_LIMIT);
        assert_eq!(values[0], format!("V{}", HISTORY_LIMIT + 4));
    }

    #[test]
    fn removing_the_last_value_drops_the_field() {
        let store = Store::open_in_memory().unwrap();
        submit(&store, "AA1234BB");

        assert!(store.remove_history_value("vehicle", "AA1234BB").unwrap());
        assert!(!store.remove_history_value("vehicle", "AA1234BB").unwrap());
        assert!(store.history().unwrap().is_empty());
    }
}
