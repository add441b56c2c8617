use super::{Store, StoreError};
use common::model::{FieldDefinition, FieldType, FormConfig, TemplateDefinition};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use uuid::Uuid;

pub(super) fn load(conn: &Connection) -> Result<FormConfig, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, display_name, placeholder, field_type, sort_order, required,
                remember_values, formula, decimal_places
         FROM fields ORDER BY position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            FieldDefinition {
                id: row.get(0)?,
                display_name: row.get(1)?,
                placeholder: row.get(2)?,
                field_type: FieldType::Text,
                order: row.get(4)?,
                required: row.get(5)?,
                remember_values: row.get(6)?,
                formula: row.get(7)?,
                decimal_places: row.get(8)?,
            },
            row.get::<_, String>(3)?,
        ))
    })?;
    let mut fields = Vec::new();
    for row in rows {
        let (mut field, kind) = row?;
        field.field_type = FieldType::from_name(&kind).ok_or(StoreError::FieldType(kind))?;
        fields.push(field);
    }

    let mut stmt = conn.prepare(
        "SELECT id, display_name, file_name, download_pattern, required_field_ids
         FROM templates ORDER BY position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            TemplateDefinition {
                id: row.get(0)?,
                display_name: row.get(1)?,
                file_name: row.get(2)?,
                download_pattern: row.get(3)?,
                required_field_ids: Vec::new(),
            },
            row.get::<_, String>(4)?,
        ))
    })?;
    let mut templates = Vec::new();
    for row in rows {
        let (mut template, required) = row?;
        template.required_field_ids = serde_json::from_str(&required)?;
        templates.push(template);
    }

    Ok(FormConfig { fields, templates })
}

fn next_position(tx: &Transaction, table: &str) -> Result<i64, StoreError> {
    let sql = format!("SELECT COALESCE(MAX(position), -1) + 1 FROM {table}");
    Ok(tx.query_row(&sql, [], |row| row.get(0))?)
}

fn exists(tx: &Transaction, table: &str, id: &str) -> Result<bool, StoreError> {
    let sql = format!("SELECT 1 FROM {table} WHERE id = ?1");
    Ok(tx
        .query_row(&sql, params![id], |_| Ok(()))
        .optional()?
        .is_some())
}

fn write_field(
    tx: &Transaction,
    field: &FieldDefinition,
    position: i64,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT INTO fields (id, position, display_name, placeholder, field_type, sort_order,
                             required, remember_values, formula, decimal_places)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            field.id,
            position,
            field.display_name,
            field.placeholder,
            field.field_type.as_str(),
            field.order,
            field.required,
            field.remember_values,
            field.formula,
            field.decimal_places,
        ],
    )?;
    Ok(())
}

fn write_template(
    tx: &Transaction,
    template: &TemplateDefinition,
    position: i64,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT INTO templates (id, position, display_name, file_name, download_pattern,
                                required_field_ids)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            template.id,
            position,
            template.display_name,
            template.file_name,
            template.download_pattern,
            serde_json::to_string(&template.required_field_ids)?,
        ],
    )?;
    Ok(())
}

fn position_of(tx: &Transaction, table: &str, id: &str) -> Result<Option<i64>, StoreError> {
    let sql = format!("SELECT position FROM {table} WHERE id = ?1");
    Ok(tx.query_row(&sql, params![id], |row| row.get(0)).optional()?)
}

/// Commits only when the resulting schema is valid.
fn commit_validated(tx: Transaction) -> Result<FormConfig, StoreError> {
    let config = load(&tx)?;
    config.validate()?;
    tx.commit()?;
    Ok(config)
}

fn assign_id(id: &mut String) {
    if id.trim().is_empty() {
        *id = Uuid::new_v4().to_string();
    } else {
        *id = id.trim().to_string();
    }
}

impl Store {
    pub fn replace_config(&self, config: &FormConfig) -> Result<FormConfig, StoreError> {
        config.validate()?;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM fields", [])?;
            tx.execute("DELETE FROM templates", [])?;
            for (position, field) in config.fields.iter().enumerate() {
                write_field(&tx, field, position as i64)?;
            }
            for (position, template) in config.templates.iter().enumerate() {
                write_template(&tx, template, position as i64)?;
            }
            let stored = commit_validated(tx)?;
            info!(
                "Configuration replaced: {} fields, {} templates",
                stored.fields.len(),
                stored.templates.len()
            );
            Ok(stored)
        })
    }

    pub fn template(&self, id: &str) -> Result<Option<TemplateDefinition>, StoreError> {
        let config = self.load_config()?;
        Ok(config.templates.into_iter().find(|template| template.id == id))
    }

    /// Adds a field; a blank id is replaced by a fresh UUID.
    pub fn create_field(&self, mut field: FieldDefinition) -> Result<FormConfig, StoreError> {
        assign_id(&mut field.id);
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            if exists(&tx, "fields", &field.id)? {
                return Err(StoreError::Conflict {
                    kind: "field",
                    id: field.id,
                });
            }
            let position = next_position(&tx, "fields")?;
            write_field(&tx, &field, position)?;
            let config = commit_validated(tx)?;
            info!("Field '{}' created", field.id);
            Ok(config)
        })
    }

    /// Replaces the field stored under `id`. The field keeps its position; a different id
    /// in the payload renames it.
    pub fn update_field(&self, id: &str, mut field: FieldDefinition) -> Result<FormConfig, StoreError> {
        if field.id.trim().is_empty() {
            field.id = id.to_string();
        }
        assign_id(&mut field.id);
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let position = position_of(&tx, "fields", id)?.ok_or_else(|| StoreError::NotFound {
                kind: "field",
                id: id.to_string(),
            })?;
            if field.id != id && exists(&tx, "fields", &field.id)? {
                return Err(StoreError::Conflict {
                    kind: "field",
                    id: field.id,
                });
            }
            tx.execute("DELETE FROM fields WHERE id = ?1", params![id])?;
            write_field(&tx, &field, position)?;
            let config = commit_validated(tx)?;
            info!("Field '{}' updated", id);
            Ok(config)
        })
    }

    /// Removes a field and its remembered values. Unknown ids are not an error.
    pub fn delete_field(&self, id: &str) -> Result<FormConfig, StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM fields WHERE id = ?1", params![id])?;
            tx.execute("DELETE FROM field_history WHERE field_id = ?1", params![id])?;
            let config = commit_validated(tx)?;
            if removed > 0 {
                info!("Field '{}' deleted", id);
            }
            Ok(config)
        })
    }

    pub fn create_template(&self, mut template: TemplateDefinition) -> Result<FormConfig, StoreError> {
        assign_id(&mut template.id);
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            if exists(&tx, "templates", &template.id)? {
                return Err(StoreError::Conflict {
                    kind: "template",
                    id: template.id,
                });
            }
            let position = next_position(&tx, "templates")?;
            write_template(&tx, &template, position)?;
            let config = commit_validated(tx)?;
            info!("Template '{}' created", template.id);
            Ok(config)
        })
    }

    /// Replaces the template stored under `id` and returns the refreshed configuration
    /// together with the template as it was before the update.
    pub fn update_template(
        &self,
        id: &str,
        mut template: TemplateDefinition,
    ) -> Result<(FormConfig, TemplateDefinition), StoreError> {
        if template.id.trim().is_empty() {
            template.id = id.to_string();
        }
        assign_id(&mut template.id);
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let not_found = || StoreError::NotFound {
                kind: "template",
                id: id.to_string(),
            };
            let previous = load(&tx)?
                .templates
                .into_iter()
                .find(|t| t.id == id)
                .ok_or_else(not_found)?;
            let position = position_of(&tx, "templates", id)?.ok_or_else(not_found)?;
            if template.id != id && exists(&tx, "templates", &template.id)? {
                return Err(StoreError::Conflict {
                    kind: "template",
                    id: template.id,
                });
            }
            tx.execute("DELETE FROM templates WHERE id = ?1", params![id])?;
            write_template(&tx, &template, position)?;
            let config = commit_validated(tx)?;
            info!("Template '{}' updated", id);
            Ok((config, previous))
        })
    }

    /// Removes a template. Returns the refreshed configuration and the removed template,
    /// if there was one.
    pub fn delete_template(
        &self,
        id: &str,
    ) -> Result<(FormConfig, Option<TemplateDefinition>), StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let removed = load(&tx)?.templates.into_iter().find(|t| t.id == id);
            tx.execute("DELETE FROM templates WHERE id = ?1", params![id])?;
            let config = commit_validated(tx)?;
            if removed.is_some() {
                info!("Template '{}' deleted", id);
            }
            Ok((config, removed))
        })
    }
}
