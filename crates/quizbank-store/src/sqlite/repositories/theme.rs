//! Theme repository: CRUD for the `themes` table.
//!
//! Names are trimmed and must be non-empty. Uniqueness is enforced by the
//! schema (`UNIQUE COLLATE NOCASE`); violations come back as
//! [`StoreError::NameConflict`]. Question counts are computed on read.

use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::errors::{Result, StoreError};
use crate::types::{DEFAULT_THEME_COLOR, NewTheme, Theme, ThemeId, ThemeUpdate, normalize_optional};

/// Stateless theme repository.
pub struct ThemeRepo;

impl ThemeRepo {
    /// All themes ordered by name (ignoring case), with live question counts.
    pub fn list(conn: &Connection) -> Result<Vec<Theme>> {
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, t.description, t.color, t.created_at, IFNULL(q.total, 0)
             FROM themes t
             LEFT JOIN (
                 SELECT theme_id, COUNT(*) AS total
                 FROM questions
                 GROUP BY theme_id
             ) q ON q.theme_id = t.id
             ORDER BY t.name COLLATE NOCASE, t.id",
        )?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Insert a theme and return the stored row.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] for a blank name, [`StoreError::NameConflict`]
    /// when the name is taken.
    pub fn create(conn: &Connection, theme: &NewTheme) -> Result<Theme> {
        let name = required_name(&theme.name)?;
        let description = normalize_optional(theme.description.as_deref());
        let color = theme_color(theme.color.as_deref());

        let _ = conn
            .execute(
                "INSERT INTO themes (name, description, color) VALUES (?1, ?2, ?3)",
                params![name, description, color],
            )
            .map_err(|e| StoreError::from_theme_write(e, &name))?;
        let id = conn.last_insert_rowid();
        debug!(theme_id = id, name = %name, "theme created");

        Self::get(conn, id)?
            .ok_or_else(|| StoreError::Internal(format!("theme {id} missing after insert")))
    }

    /// Apply a partial update. Returns the refreshed theme, or `None` if no
    /// theme has this id. An empty update changes nothing.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] for a blank name or color,
    /// [`StoreError::NameConflict`] when renaming onto a taken name.
    pub fn update(conn: &Connection, id: ThemeId, update: &ThemeUpdate) -> Result<Option<Theme>> {
        let mut fields: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        let name = update.name.as_deref().map(required_name).transpose()?;
        if let Some(name) = &name {
            fields.push("name");
            values.push(Box::new(name.clone()));
        }
        if let Some(description) = &update.description {
            fields.push("description");
            values.push(Box::new(normalize_optional(description.as_deref())));
        }
        if let Some(color) = &update.color {
            let color = color.trim();
            if color.is_empty() {
                return Err(StoreError::Validation("theme color must not be empty".into()));
            }
            fields.push("color");
            values.push(Box::new(color.to_string()));
        }

        if fields.is_empty() {
            return Self::get(conn, id);
        }

        let assignments = fields
            .iter()
            .enumerate()
            .map(|(i, field)| format!("{field} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE themes SET {assignments} WHERE id = ?{}", values.len() + 1);
        values.push(Box::new(id));

        let params: Vec<&dyn ToSql> = values.iter().map(AsRef::as_ref).collect();
        let changed = conn.execute(&sql, params.as_slice()).map_err(|e| {
            StoreError::from_theme_write(e, name.as_deref().unwrap_or_default())
        })?;
        if changed == 0 {
            return Ok(None);
        }
        debug!(theme_id = id, fields = ?fields, "theme updated");

        Self::get(conn, id)
    }

    /// Delete a theme. Its questions and their alternatives go with it.
    /// Returns whether a row was removed.
    pub fn delete(conn: &Connection, id: ThemeId) -> Result<bool> {
        let changed = conn.execute("DELETE FROM themes WHERE id = ?1", params![id])?;
        if changed > 0 {
            debug!(theme_id = id, "theme deleted");
        }
        Ok(changed > 0)
    }

    /// Get a theme by ID.
    pub fn get(conn: &Connection, id: ThemeId) -> Result<Option<Theme>> {
        let row = conn
            .query_row(
                "SELECT t.id, t.name, t.description, t.color, t.created_at,
                        (SELECT COUNT(*) FROM questions q WHERE q.theme_id = t.id)
                 FROM themes t WHERE t.id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Map a rusqlite row to [`Theme`].
    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Theme> {
        Ok(Theme {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            color: row.get(3)?,
            created_at: row.get(4)?,
            question_count: row.get(5)?,
        })
    }
}

fn required_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::Validation("theme name must not be empty".into()));
    }
    Ok(name.to_string())
}

fn theme_color(color: Option<&str>) -> String {
    color
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_THEME_COLOR)
        .to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
