//! Nutrack Status Tool
//!
//! Runtime status information plus workflow instructions for MCP clients.

use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::Database;

/// Onboarding instructions for AI assistants
pub const ONBOARDING_INSTRUCTIONS: &str = r#"
# Nutrack Onboarding Instructions

How to set up a user so daily targets and the dashboard work.

## Step 1: Sign in

```
sign_in(email: "ana@example.com", name: "Ana")
```

The response tells you whether onboarding is already complete. Signing in
with a different email replaces the stored profile (single-user store).

## Step 2: Complete onboarding

Collect all five values from the user, then call:

```
complete_onboarding(
  age: 30,                    // years, > 0
  weight_kg: 70,              // kilograms, > 0
  height_cm: 175,             // centimeters, > 0
  activity_level: "sedentary", // sedentary | light | moderate | active | very_active
  goal: "maintain"            // lose | maintain | gain
)
```

The server computes the daily calorie target and macro split and stores
them on the profile. Invalid input fails the whole call and stores
nothing - re-prompt the user and try again.

## Step 3: Verify

`get_profile` returns the stored profile with its targets. The
dashboard (`get_dashboard`) and the chat assistant use those targets, so
check they exist before answering questions about goals.

## Editing later

`update_profile` accepts any subset of fields. Changing age, weight,
height, activity level, or goal recomputes the targets from scratch;
changing only name or email leaves them untouched.
"#;

/// Meal logging instructions for AI assistants
pub const LOGGING_INSTRUCTIONS: &str = r#"
# Nutrack Meal Logging Instructions

How to log what the user ate.

## Find the food first

```
search_foods(query: "chicken")
```

Search needs at least 2 characters and matches name and brand. If the
food is missing, add it with `add_food` (per-serving nutrition, positive
serving_size). `scan_food_photo(photo_path)` can suggest candidates from
a photo file name.

## Log the meal

```
log_meal(
  date: "2026-08-06",        // YYYY-MM-DD
  meal_type: "lunch",        // breakfast | lunch | dinner | snack
  food_id: 12,
  quantity: 1.5              // servings of the food item, > 0
)
```

The response includes the consumed nutrition and the new day total. Use
`update_meal_entry` / `delete_meal_entry` to fix mistakes - day totals
recalculate automatically.

## Reading back

- `get_day(date)` - meals grouped by type plus totals
- `get_dashboard(date)` - consumption vs. the profile targets
- `list_days(start_date, end_date)` - summaries, newest first
- `get_progress_series(start_date, end_date)` - chart-ready history

## Weight and reports

Log weight with `log_weight(date, weight_kg)` (same-date logs replace).
`generate_progress_report` writes a PDF with weight and calorie charts.
"#;

/// Nutrack status response
#[derive(Debug, Serialize)]
pub struct NutrackStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
    pub counts: Option<StoreCounts>,
}

/// Row counts for the main tables
#[derive(Debug, Serialize)]
pub struct StoreCounts {
    pub foods: i64,
    pub days: i64,
    pub meal_entries: i64,
    pub weight_entries: i64,
    pub reminders: i64,
    pub chat_messages: i64,
}

/// Tracks uptime and database location for the status tool
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database) -> NutrackStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path).ok().map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NutrackStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
            counts: store_counts(db).ok(),
        }
    }
}

/// Count rows in the main tables
fn store_counts(db: &Database) -> Result<StoreCounts, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let count = |table: &str| -> Result<i64, String> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .map_err(|e| format!("Count failed for {}: {}", table, e))
    };

    Ok(StoreCounts {
        foods: count("food_items")?,
        days: count("days")?,
        meal_entries: count("meal_entries")?,
        weight_entries: count("weight_entries")?,
        reminders: count("reminders")?,
        chat_messages: count("chat_messages")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_status_includes_counts() {
        let db = Database::new_in_memory("status_counts").unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();

        let tracker = StatusTracker::new(PathBuf::from("/tmp/nutrack-test.db"));
        let status = tracker.get_status(&db);

        let counts = status.counts.expect("counts present");
        assert_eq!(counts.foods, 0);
        assert_eq!(counts.meal_entries, 0);
        assert_eq!(status.version, crate::build_info::VERSION);
    }
}
