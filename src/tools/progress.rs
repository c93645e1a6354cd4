//! Progress Tools
//!
//! Weight logging and per-day history series for charts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::Database;
use crate::models::{Day, Profile, WeightEntry};

/// One point in the progress series
#[derive(Debug, Serialize)]
pub struct ProgressPoint {
    pub date: String,
    pub weight_kg: Option<f64>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Response for get_progress_series
#[derive(Debug, Serialize)]
pub struct ProgressSeriesResponse {
    pub start_date: String,
    pub end_date: String,
    pub points: Vec<ProgressPoint>,
}

/// Response for weight summary numbers
#[derive(Debug, Serialize)]
pub struct WeightSummary {
    pub start_weight_kg: Option<f64>,
    pub current_weight_kg: Option<f64>,
    pub change_kg: Option<f64>,
    pub readings: i64,
    pub goal: Option<String>,
}

fn validate_date(date: &str) -> Result<(), String> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| format!("Invalid date (expected YYYY-MM-DD): {}", date))
}

/// Record a body weight reading (one per date; same-date logs replace)
pub fn log_weight(
    db: &Database,
    date: &str,
    weight_kg: f64,
    notes: Option<&str>,
) -> Result<WeightEntry, String> {
    validate_date(date)?;
    if weight_kg <= 0.0 || !weight_kg.is_finite() {
        return Err("Weight must be greater than 0".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    WeightEntry::upsert(&conn, date, weight_kg, notes)
        .map_err(|e| format!("Failed to log weight: {}", e))
}

/// List weight readings in a range, oldest first
pub fn list_weights(
    db: &Database,
    start_date: Option<&str>,
    end_date: Option<&str>,
    limit: i64,
) -> Result<Vec<WeightEntry>, String> {
    let limit = limit.clamp(1, 500);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    WeightEntry::list(&conn, start_date, end_date, limit)
        .map_err(|e| format!("Failed to list weights: {}", e))
}

/// Delete the weight reading for a date
pub fn delete_weight(db: &Database, date: &str) -> Result<bool, String> {
    validate_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    WeightEntry::delete_by_date(&conn, date)
        .map_err(|e| format!("Failed to delete weight: {}", e))
}

/// First/latest weight and total change, for the progress header
pub fn weight_summary(db: &Database) -> Result<WeightSummary, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let earliest =
        WeightEntry::earliest(&conn).map_err(|e| format!("Failed to read weights: {}", e))?;
    let latest =
        WeightEntry::latest(&conn).map_err(|e| format!("Failed to read weights: {}", e))?;
    let readings =
        WeightEntry::count(&conn).map_err(|e| format!("Failed to count weights: {}", e))?;
    let profile = Profile::get(&conn).map_err(|e| format!("Failed to load profile: {}", e))?;

    let start = earliest.map(|e| e.weight_kg);
    let current = latest.map(|e| e.weight_kg);

    Ok(WeightSummary {
        start_weight_kg: start,
        current_weight_kg: current,
        change_kg: match (start, current) {
            (Some(s), Some(c)) => Some(c - s),
            _ => None,
        },
        readings,
        goal: profile.and_then(|p| p.goal).map(|g| g.as_str().to_string()),
    })
}

/// Per-day calories/macros joined with weight readings over a date range.
///
/// Days appear if they have either logged meals or a weight reading;
/// weight is carried as None on days without a reading.
pub fn get_progress_series(
    db: &Database,
    start_date: &str,
    end_date: &str,
) -> Result<ProgressSeriesResponse, String> {
    validate_date(start_date)?;
    validate_date(end_date)?;
    if start_date > end_date {
        return Err("start_date must not be after end_date".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    // High limit: a range query over local data, not a pagination surface
    let days = Day::list(&conn, Some(start_date), Some(end_date), 1000, 0)
        .map_err(|e| format!("Failed to list days: {}", e))?;
    let weights = WeightEntry::list(&conn, Some(start_date), Some(end_date), 1000)
        .map_err(|e| format!("Failed to list weights: {}", e))?;

    let mut by_date: BTreeMap<String, ProgressPoint> = BTreeMap::new();

    for day in days {
        by_date.insert(
            day.date.clone(),
            ProgressPoint {
                date: day.date,
                weight_kg: None,
                calories: day.cached_nutrition.calories,
                protein: day.cached_nutrition.protein,
                carbs: day.cached_nutrition.carbs,
                fat: day.cached_nutrition.fat,
            },
        );
    }

    for weight in weights {
        by_date
            .entry(weight.date.clone())
            .or_insert_with(|| ProgressPoint {
                date: weight.date.clone(),
                weight_kg: None,
                calories: 0.0,
                protein: 0.0,
                carbs: 0.0,
                fat: 0.0,
            })
            .weight_kg = Some(weight.weight_kg);
    }

    Ok(ProgressSeriesResponse {
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
        points: by_date.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::tools::days::log_meal;
    use crate::tools::food_items::seed_starter_catalog;

    fn test_db(name: &str) -> Database {
        let db = Database::new_in_memory(name).unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    #[test]
    fn test_series_merges_meals_and_weights() {
        let db = test_db("progress_series");
        seed_starter_catalog(&db).unwrap();
        let banana = crate::tools::food_items::search_foods(&db, "banana", 5)
            .unwrap()
            .results[0]
            .id;

        log_meal(&db, "2026-08-01", "breakfast", banana, 1.0, None).unwrap();
        log_weight(&db, "2026-08-01", 80.0, None).unwrap();
        log_weight(&db, "2026-08-02", 79.6, None).unwrap();

        let series = get_progress_series(&db, "2026-08-01", "2026-08-07").unwrap();
        assert_eq!(series.points.len(), 2);

        let first = &series.points[0];
        assert_eq!(first.date, "2026-08-01");
        assert_eq!(first.weight_kg, Some(80.0));
        assert!((first.calories - 89.0).abs() < 1e-9);

        let second = &series.points[1];
        assert_eq!(second.weight_kg, Some(79.6));
        assert_eq!(second.calories, 0.0);
    }

    #[test]
    fn test_weight_summary_change() {
        let db = test_db("progress_summary");
        log_weight(&db, "2026-08-01", 80.0, None).unwrap();
        log_weight(&db, "2026-08-15", 78.5, None).unwrap();

        let summary = weight_summary(&db).unwrap();
        assert_eq!(summary.start_weight_kg, Some(80.0));
        assert_eq!(summary.current_weight_kg, Some(78.5));
        assert!((summary.change_kg.unwrap() + 1.5).abs() < 1e-9);
        assert_eq!(summary.readings, 2);
    }

    #[test]
    fn test_rejects_invalid_ranges() {
        let db = test_db("progress_invalid");
        assert!(get_progress_series(&db, "2026-08-07", "2026-08-01").is_err());
        assert!(log_weight(&db, "2026-08-01", -1.0, None).is_err());
    }
}
