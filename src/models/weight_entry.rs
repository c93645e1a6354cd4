//! Weight Entry model
//!
//! Body weight log used for progress charts and reports.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A body weight reading, one per date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: i64,
    pub date: String, // ISO date
    pub weight_kg: f64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl WeightEntry {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            weight_kg: row.get("weight_kg")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert or replace the reading for a date
    pub fn upsert(
        conn: &Connection,
        date: &str,
        weight_kg: f64,
        notes: Option<&str>,
    ) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO weight_entries (date, weight_kg, notes)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(date) DO UPDATE SET
                weight_kg = excluded.weight_kg,
                notes = excluded.notes,
                updated_at = datetime('now')
            "#,
            params![date, weight_kg, notes],
        )?;

        Self::get_by_date(conn, date)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get the reading for a date
    pub fn get_by_date(conn: &Connection, date: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM weight_entries WHERE date = ?1")?;

        let result = stmt.query_row([date], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List readings in a date range, oldest first (chart order)
    pub fn list(
        conn: &Connection,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: i64,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM weight_entries WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(start) = start_date {
            params_vec.push(Box::new(start.to_string()));
            sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
        }

        if let Some(end) = end_date {
            params_vec.push(Box::new(end.to_string()));
            sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY date ASC");

        params_vec.push(Box::new(limit));
        sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let entries = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// The most recent reading
    pub fn latest(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM weight_entries ORDER BY date DESC LIMIT 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The oldest reading (starting point for progress deltas)
    pub fn earliest(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM weight_entries ORDER BY date ASC LIMIT 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Count all readings
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM weight_entries", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete the reading for a date
    pub fn delete_by_date(conn: &Connection, date: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM weight_entries WHERE date = ?1", [date])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::test_support::memory_db;

    #[test]
    fn test_upsert_replaces_same_date() {
        let conn = memory_db();

        WeightEntry::upsert(&conn, "2026-08-01", 80.0, None).unwrap();
        let updated = WeightEntry::upsert(&conn, "2026-08-01", 79.4, Some("morning")).unwrap();

        assert_eq!(updated.weight_kg, 79.4);
        assert_eq!(WeightEntry::count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_list_is_chart_ordered() {
        let conn = memory_db();
        WeightEntry::upsert(&conn, "2026-08-03", 79.0, None).unwrap();
        WeightEntry::upsert(&conn, "2026-08-01", 80.0, None).unwrap();
        WeightEntry::upsert(&conn, "2026-08-02", 79.5, None).unwrap();

        let all = WeightEntry::list(&conn, None, None, 100).unwrap();
        let dates: Vec<&str> = all.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-08-01", "2026-08-02", "2026-08-03"]);

        assert_eq!(WeightEntry::latest(&conn).unwrap().unwrap().weight_kg, 79.0);
        assert_eq!(WeightEntry::earliest(&conn).unwrap().unwrap().weight_kg, 80.0);
    }
}
