//! Reminder Tools
//!
//! Manage stored notification schedules. Delivery is the platform
//! notification service's job; these tools only own the schedule data.

use serde::Serialize;

use crate::db::Database;
use crate::models::{is_valid_time, Reminder, ReminderCreate, ReminderKind, ReminderUpdate};

/// Response for list_reminders
#[derive(Debug, Serialize)]
pub struct ListRemindersResponse {
    pub reminders: Vec<Reminder>,
    pub total: i64,
}

/// Response for delete_reminder
#[derive(Debug, Serialize)]
pub struct DeleteReminderResponse {
    pub success: bool,
    pub message: String,
}

/// Response for seed_default_reminders
#[derive(Debug, Serialize)]
pub struct SeedRemindersResponse {
    pub added: i64,
}

fn parse_kind(kind: &str) -> Result<ReminderKind, String> {
    ReminderKind::parse(kind)
        .ok_or_else(|| format!("Unknown reminder kind: {} (use meal, water, exercise, or custom)", kind))
}

/// Schedule a new reminder
pub fn schedule_reminder(
    db: &Database,
    title: &str,
    body: &str,
    time: &str,
    kind: &str,
    enabled: bool,
) -> Result<Reminder, String> {
    if title.trim().is_empty() {
        return Err("Title must not be empty".to_string());
    }
    if !is_valid_time(time) {
        return Err(format!("Invalid time (expected HH:MM 24h): {}", time));
    }
    let kind = parse_kind(kind)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Reminder::create(
        &conn,
        &ReminderCreate {
            title: title.trim().to_string(),
            body: body.trim().to_string(),
            time: time.to_string(),
            kind,
            enabled,
        },
    )
    .map_err(|e| format!("Failed to schedule reminder: {}", e))
}

/// List reminders, optionally filtered by kind or enabled state
pub fn list_reminders(
    db: &Database,
    kind: Option<&str>,
    enabled_only: bool,
) -> Result<ListRemindersResponse, String> {
    let kind = match kind {
        Some(k) => Some(parse_kind(k)?),
        None => None,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let reminders = Reminder::list(&conn, kind, enabled_only)
        .map_err(|e| format!("Failed to list reminders: {}", e))?;
    let total = Reminder::count(&conn).map_err(|e| format!("Failed to count reminders: {}", e))?;

    Ok(ListRemindersResponse { reminders, total })
}

/// Update a reminder's fields
pub fn update_reminder(
    db: &Database,
    id: i64,
    title: Option<String>,
    body: Option<String>,
    time: Option<String>,
    kind: Option<&str>,
) -> Result<Option<Reminder>, String> {
    if let Some(ref time) = time {
        if !is_valid_time(time) {
            return Err(format!("Invalid time (expected HH:MM 24h): {}", time));
        }
    }
    let kind = match kind {
        Some(k) => Some(parse_kind(k)?),
        None => None,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Reminder::update(
        &conn,
        id,
        &ReminderUpdate {
            title,
            body,
            time,
            kind,
        },
    )
    .map_err(|e| format!("Failed to update reminder: {}", e))
}

/// Enable or disable a reminder
pub fn set_reminder_enabled(
    db: &Database,
    id: i64,
    enabled: bool,
) -> Result<Option<Reminder>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Reminder::set_enabled(&conn, id, enabled)
        .map_err(|e| format!("Failed to toggle reminder: {}", e))
}

/// Delete a reminder
pub fn delete_reminder(db: &Database, id: i64) -> Result<DeleteReminderResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted =
        Reminder::delete(&conn, id).map_err(|e| format!("Failed to delete reminder: {}", e))?;

    Ok(DeleteReminderResponse {
        success: deleted,
        message: if deleted {
            "Reminder deleted".to_string()
        } else {
            format!("Reminder not found with id: {}", id)
        },
    })
}

/// Seed the default meal and hydration reminders into an empty schedule
pub fn seed_default_reminders(db: &Database) -> Result<SeedRemindersResponse, String> {
    let defaults: [(&str, &str, &str, ReminderKind); 4] = [
        ("Breakfast time", "Log your breakfast", "08:00", ReminderKind::Meal),
        ("Lunch time", "Log your lunch", "12:30", ReminderKind::Meal),
        ("Dinner time", "Log your dinner", "19:00", ReminderKind::Meal),
        ("Hydration check", "Drink a glass of water", "10:00", ReminderKind::Water),
    ];

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let existing = Reminder::count(&conn).map_err(|e| format!("Count failed: {}", e))?;
    if existing > 0 {
        return Ok(SeedRemindersResponse { added: 0 });
    }

    for (title, body, time, kind) in defaults {
        Reminder::create(
            &conn,
            &ReminderCreate {
                title: title.to_string(),
                body: body.to_string(),
                time: time.to_string(),
                kind,
                enabled: true,
            },
        )
        .map_err(|e| format!("Seed failed: {}", e))?;
    }

    Ok(SeedRemindersResponse { added: 4 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn test_db(name: &str) -> Database {
        let db = Database::new_in_memory(name).unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    #[test]
    fn test_schedule_validates_time_and_kind() {
        let db = test_db("reminders_validate");

        assert!(schedule_reminder(&db, "Lunch", "Log it", "25:00", "meal", true).is_err());
        assert!(schedule_reminder(&db, "Lunch", "Log it", "12:30", "nap", true).is_err());
        assert!(schedule_reminder(&db, "", "Log it", "12:30", "meal", true).is_err());

        let reminder = schedule_reminder(&db, "Lunch", "Log it", "12:30", "meal", true).unwrap();
        assert_eq!(reminder.kind, ReminderKind::Meal);
    }

    #[test]
    fn test_defaults_seed_once() {
        let db = test_db("reminders_seed");

        assert_eq!(seed_default_reminders(&db).unwrap().added, 4);
        assert_eq!(seed_default_reminders(&db).unwrap().added, 0);

        let listed = list_reminders(&db, Some("meal"), false).unwrap();
        assert_eq!(listed.reminders.len(), 3);
        assert_eq!(listed.total, 4);
    }

    #[test]
    fn test_sorted_by_time() {
        let db = test_db("reminders_sorted");
        seed_default_reminders(&db).unwrap();

        let listed = list_reminders(&db, None, false).unwrap();
        let times: Vec<&str> = listed.reminders.iter().map(|r| r.time.as_str()).collect();
        assert_eq!(times, vec!["08:00", "10:00", "12:30", "19:00"]);
    }
}
