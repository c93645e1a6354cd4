//! Profile model
//!
//! Single-row table holding the signed-in user's identity, body metrics,
//! and the computed daily energy targets.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::{ActivityLevel, BodyMetrics, EnergyTarget, Goal};

/// The user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<Goal>,
    pub target: Option<EnergyTarget>,
    pub onboarding_complete: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Profile {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let activity_level = row
            .get::<_, Option<String>>("activity_level")?
            .map(|s| parse_column("activity_level", ActivityLevel::parse(&s)))
            .transpose()?;
        let goal = row
            .get::<_, Option<String>>("goal")?
            .map(|s| parse_column("goal", Goal::parse(&s)))
            .transpose()?;

        // The four target columns are written together; treat a missing
        // calorie column as "no target yet"
        let target = match (
            row.get::<_, Option<i64>>("daily_calories")?,
            row.get::<_, Option<i64>>("daily_protein")?,
            row.get::<_, Option<i64>>("daily_carbs")?,
            row.get::<_, Option<i64>>("daily_fat")?,
        ) {
            (Some(calories), Some(protein), Some(carbs), Some(fat)) => Some(EnergyTarget {
                daily_calories: calories,
                daily_protein: protein,
                daily_carbs: carbs,
                daily_fat: fat,
            }),
            _ => None,
        };

        Ok(Self {
            id: row.get("id")?,
            email: row.get("email")?,
            name: row.get("name")?,
            age: row.get::<_, Option<i64>>("age")?.map(|a| a as u32),
            weight_kg: row.get("weight_kg")?,
            height_cm: row.get("height_cm")?,
            activity_level,
            goal,
            target,
            onboarding_complete: row.get::<_, i64>("onboarding_complete")? != 0,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// The estimator inputs, if every metric has been collected
    pub fn metrics(&self) -> Option<BodyMetrics> {
        Some(BodyMetrics {
            age: self.age?,
            weight_kg: self.weight_kg?,
            height_cm: self.height_cm?,
            activity_level: self.activity_level?,
            goal: self.goal?,
        })
    }

    /// Get the profile (single row table)
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profile WHERE id = 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Sign in with an email and display name.
    ///
    /// Signing in with the stored email keeps the existing metrics and
    /// targets; a different email replaces the row wholesale, since this
    /// is a single-user store.
    pub fn sign_in(conn: &Connection, email: &str, name: &str) -> DbResult<Self> {
        match Self::get(conn)? {
            Some(existing) if existing.email == email => {
                conn.execute(
                    "UPDATE profile SET name = ?1, updated_at = datetime('now') WHERE id = 1",
                    params![name],
                )?;
            }
            _ => {
                conn.execute(
                    r#"
                    INSERT INTO profile (id, email, name)
                    VALUES (1, ?1, ?2)
                    ON CONFLICT(id) DO UPDATE SET
                        email = excluded.email,
                        name = excluded.name,
                        age = NULL,
                        weight_kg = NULL,
                        height_cm = NULL,
                        activity_level = NULL,
                        goal = NULL,
                        daily_calories = NULL,
                        daily_protein = NULL,
                        daily_carbs = NULL,
                        daily_fat = NULL,
                        onboarding_complete = 0,
                        updated_at = datetime('now')
                    "#,
                    params![email, name],
                )?;
            }
        }

        Self::get(conn)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Persist body metrics together with their freshly computed targets.
    ///
    /// The four target columns are always overwritten as a unit; there is
    /// no partial target update.
    pub fn save_metrics(
        conn: &Connection,
        metrics: &BodyMetrics,
        target: &EnergyTarget,
    ) -> DbResult<Self> {
        conn.execute(
            r#"
            UPDATE profile SET
                age = ?1,
                weight_kg = ?2,
                height_cm = ?3,
                activity_level = ?4,
                goal = ?5,
                daily_calories = ?6,
                daily_protein = ?7,
                daily_carbs = ?8,
                daily_fat = ?9,
                onboarding_complete = 1,
                updated_at = datetime('now')
            WHERE id = 1
            "#,
            params![
                metrics.age as i64,
                metrics.weight_kg,
                metrics.height_cm,
                metrics.activity_level.as_str(),
                metrics.goal.as_str(),
                target.daily_calories,
                target.daily_protein,
                target.daily_carbs,
                target.daily_fat,
            ],
        )?;

        Self::get(conn)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Update display name and/or email without touching metrics
    pub fn set_identity(
        conn: &Connection,
        name: Option<&str>,
        email: Option<&str>,
    ) -> DbResult<Option<Self>> {
        if Self::get(conn)?.is_none() {
            return Ok(None);
        }

        if let Some(name) = name {
            conn.execute(
                "UPDATE profile SET name = ?1, updated_at = datetime('now') WHERE id = 1",
                params![name],
            )?;
        }
        if let Some(email) = email {
            conn.execute(
                "UPDATE profile SET email = ?1, updated_at = datetime('now') WHERE id = 1",
                params![email],
            )?;
        }

        Self::get(conn)
    }

    /// Remove the profile row
    pub fn delete(conn: &Connection) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM profile WHERE id = 1", [])?;
        Ok(rows > 0)
    }
}

/// Map a domain parse failure onto the rusqlite error surface
fn parse_column<T>(
    column: &'static str,
    parsed: Result<T, crate::nutrition::InvalidInput>,
) -> rusqlite::Result<T> {
    parsed.map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("{}: {}", column, e).into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::test_support::memory_db;
    use crate::nutrition::compute_energy_target;

    #[test]
    fn test_sign_in_creates_and_preserves() {
        let conn = memory_db();

        let profile = Profile::sign_in(&conn, "ana@example.com", "Ana").unwrap();
        assert_eq!(profile.email, "ana@example.com");
        assert!(!profile.onboarding_complete);
        assert!(profile.target.is_none());

        // Complete onboarding, then sign in again with the same email
        let metrics = BodyMetrics {
            age: 30,
            weight_kg: 70.0,
            height_cm: 175.0,
            activity_level: ActivityLevel::Sedentary,
            goal: Goal::Maintain,
        };
        let target = compute_energy_target(&metrics).unwrap();
        Profile::save_metrics(&conn, &metrics, &target).unwrap();

        let back = Profile::sign_in(&conn, "ana@example.com", "Ana M.").unwrap();
        assert_eq!(back.name, "Ana M.");
        assert!(back.onboarding_complete);
        assert_eq!(back.target.unwrap().daily_calories, 2035);
    }

    #[test]
    fn test_sign_in_new_email_resets() {
        let conn = memory_db();

        Profile::sign_in(&conn, "ana@example.com", "Ana").unwrap();
        let metrics = BodyMetrics {
            age: 30,
            weight_kg: 70.0,
            height_cm: 175.0,
            activity_level: ActivityLevel::Light,
            goal: Goal::Lose,
        };
        let target = compute_energy_target(&metrics).unwrap();
        Profile::save_metrics(&conn, &metrics, &target).unwrap();

        let other = Profile::sign_in(&conn, "bo@example.com", "Bo").unwrap();
        assert_eq!(other.email, "bo@example.com");
        assert!(!other.onboarding_complete);
        assert!(other.target.is_none());
        assert!(other.metrics().is_none());
    }

    #[test]
    fn test_save_metrics_round_trips_enums() {
        let conn = memory_db();
        Profile::sign_in(&conn, "ana@example.com", "Ana").unwrap();

        let metrics = BodyMetrics {
            age: 41,
            weight_kg: 82.5,
            height_cm: 180.0,
            activity_level: ActivityLevel::VeryActive,
            goal: Goal::Gain,
        };
        let target = compute_energy_target(&metrics).unwrap();
        Profile::save_metrics(&conn, &metrics, &target).unwrap();

        let stored = Profile::get(&conn).unwrap().unwrap();
        assert_eq!(stored.activity_level, Some(ActivityLevel::VeryActive));
        assert_eq!(stored.goal, Some(Goal::Gain));
        assert_eq!(stored.metrics(), Some(metrics));
    }
}
