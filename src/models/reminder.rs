//! Reminder model
//!
//! Stored notification schedules. Nutrack manages the schedules; actual
//! delivery belongs to the platform notification service.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Reminder category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Meal,
    Water,
    Exercise,
    Custom,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Meal => "meal",
            ReminderKind::Water => "water",
            ReminderKind::Exercise => "exercise",
            ReminderKind::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "meal" => Some(ReminderKind::Meal),
            "water" => Some(ReminderKind::Water),
            "exercise" => Some(ReminderKind::Exercise),
            "custom" => Some(ReminderKind::Custom),
            _ => None,
        }
    }
}

/// A scheduled reminder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub time: String, // "HH:MM" 24h
    pub kind: ReminderKind,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a reminder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderCreate {
    pub title: String,
    pub body: String,
    pub time: String,
    pub kind: ReminderKind,
    pub enabled: bool,
}

/// Data for updating a reminder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReminderUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub time: Option<String>,
    pub kind: Option<ReminderKind>,
}

/// Validate a "HH:MM" 24-hour time string
pub fn is_valid_time(time: &str) -> bool {
    let mut parts = time.splitn(2, ':');
    let (Some(h), Some(m)) = (parts.next(), parts.next()) else {
        return false;
    };
    if h.len() != 2 || m.len() != 2 {
        return false;
    }
    match (h.parse::<u8>(), m.parse::<u8>()) {
        (Ok(h), Ok(m)) => h < 24 && m < 60,
        _ => false,
    }
}

impl Reminder {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let kind_str: String = row.get("kind")?;
        let kind = ReminderKind::parse(&kind_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown reminder kind: {}", kind_str).into(),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            body: row.get("body")?,
            time: row.get("time")?,
            kind,
            enabled: row.get::<_, i64>("enabled")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Create a new reminder
    pub fn create(conn: &Connection, data: &ReminderCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO reminders (title, body, time, kind, enabled)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.title,
                data.body,
                data.time,
                data.kind.as_str(),
                data.enabled as i64,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a reminder by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM reminders WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(reminder) => Ok(Some(reminder)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List reminders ordered by time of day
    pub fn list(
        conn: &Connection,
        kind: Option<ReminderKind>,
        enabled_only: bool,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM reminders WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(kind) = kind {
            params_vec.push(Box::new(kind.as_str().to_string()));
            sql.push_str(&format!(" AND kind = ?{}", params_vec.len()));
        }
        if enabled_only {
            sql.push_str(" AND enabled = 1");
        }

        sql.push_str(" ORDER BY time, id");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let reminders = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(reminders)
    }

    /// Count all reminders
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM reminders", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Update a reminder with the provided fields
    pub fn update(conn: &Connection, id: i64, data: &ReminderUpdate) -> DbResult<Option<Self>> {
        if Self::get_by_id(conn, id)?.is_none() {
            return Ok(None);
        }

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref title) = data.title {
            params_vec.push(Box::new(title.clone()));
            updates.push(format!("title = ?{}", params_vec.len()));
        }
        if let Some(ref body) = data.body {
            params_vec.push(Box::new(body.clone()));
            updates.push(format!("body = ?{}", params_vec.len()));
        }
        if let Some(ref time) = data.time {
            params_vec.push(Box::new(time.clone()));
            updates.push(format!("time = ?{}", params_vec.len()));
        }
        if let Some(kind) = data.kind {
            params_vec.push(Box::new(kind.as_str().to_string()));
            updates.push(format!("kind = ?{}", params_vec.len()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE reminders SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Enable or disable a reminder
    pub fn set_enabled(conn: &Connection, id: i64, enabled: bool) -> DbResult<Option<Self>> {
        conn.execute(
            "UPDATE reminders SET enabled = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![enabled as i64, id],
        )?;

        Self::get_by_id(conn, id)
    }

    /// Delete a reminder
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM reminders WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::test_support::memory_db;

    #[test]
    fn test_time_validation() {
        assert!(is_valid_time("08:30"));
        assert!(is_valid_time("00:00"));
        assert!(is_valid_time("23:59"));

        assert!(!is_valid_time("24:00"));
        assert!(!is_valid_time("12:60"));
        assert!(!is_valid_time("8:30"));
        assert!(!is_valid_time("0830"));
        assert!(!is_valid_time("noon"));
    }

    #[test]
    fn test_crud_and_toggle() {
        let conn = memory_db();

        let reminder = Reminder::create(
            &conn,
            &ReminderCreate {
                title: "Lunch time".to_string(),
                body: "Log your lunch".to_string(),
                time: "12:30".to_string(),
                kind: ReminderKind::Meal,
                enabled: true,
            },
        )
        .unwrap();

        let off = Reminder::set_enabled(&conn, reminder.id, false)
            .unwrap()
            .unwrap();
        assert!(!off.enabled);

        assert!(Reminder::list(&conn, None, true).unwrap().is_empty());
        assert_eq!(Reminder::list(&conn, Some(ReminderKind::Meal), false).unwrap().len(), 1);

        assert!(Reminder::delete(&conn, reminder.id).unwrap());
    }
}
