//! Share Tools
//!
//! Builds share-sheet text for progress, meal plans, and invites. The
//! platform share dialog itself is outside this process; these tools
//! return ready-to-send strings.

use serde::Serialize;

use crate::db::Database;
use crate::models::{Day, MealEntry, Profile, WeightEntry};

/// App name used in outgoing share text
const APP_NAME: &str = "Nutrack";

/// Response wrapping a share payload
#[derive(Debug, Serialize)]
pub struct ShareTextResponse {
    pub title: String,
    pub message: String,
}

/// Progress share text from raw numbers
pub fn build_progress_message(
    current_weight_kg: f64,
    start_weight_kg: Option<f64>,
    days_tracking: i64,
    calories_today: f64,
) -> String {
    let mut message = format!(
        "My {} progress:\n\n\
         {} days of tracking\n\
         Current weight: {:.1} kg\n",
        APP_NAME, days_tracking, current_weight_kg
    );

    if let Some(start) = start_weight_kg {
        let change = current_weight_kg - start;
        if change.abs() >= 0.05 {
            let direction = if change < 0.0 { "down" } else { "up" };
            message.push_str(&format!("{:.1} kg {} since I started\n", change.abs(), direction));
        }
    }

    message.push_str(&format!(
        "Calories today: {:.0} kcal\n\n\
         Get {} and start your own streak!",
        calories_today, APP_NAME
    ));

    message
}

/// Meal plan share text from (name, calories) pairs
pub fn build_meal_plan_message(meals: &[(String, f64)]) -> String {
    let list = meals
        .iter()
        .enumerate()
        .map(|(i, (name, calories))| format!("{}. {} ({:.0} kcal)", i + 1, name, calories))
        .collect::<Vec<_>>()
        .join("\n");

    let total: f64 = meals.iter().map(|(_, calories)| calories).sum();

    format!(
        "My meals today:\n\n{}\n\nTotal: {:.0} kcal\n\nPlanned with {}",
        list, total, APP_NAME
    )
}

/// Invite text for sharing the app itself
pub fn build_invite_message() -> String {
    format!(
        "Discover {}!\n\n\
         Track meals, hit your macro targets, and watch your progress \
         with charts and a nutrition assistant.\n\n\
         Start your healthy streak today.",
        APP_NAME
    )
}

/// Share text for the current progress state
pub fn share_progress(db: &Database, date: &str) -> Result<ShareTextResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let latest = WeightEntry::latest(&conn)
        .map_err(|e| format!("Failed to read weights: {}", e))?
        .ok_or_else(|| "No weight readings yet; log a weight first".to_string())?;
    let earliest = WeightEntry::earliest(&conn)
        .map_err(|e| format!("Failed to read weights: {}", e))?;
    let days_tracking = Day::count(&conn, None, None)
        .map_err(|e| format!("Failed to count days: {}", e))?;

    let calories_today = Day::get_by_date(&conn, date)
        .map_err(|e| format!("Failed to get day: {}", e))?
        .map(|d| d.cached_nutrition.calories)
        .unwrap_or(0.0);

    Ok(ShareTextResponse {
        title: format!("My Progress - {}", APP_NAME),
        message: build_progress_message(
            latest.weight_kg,
            earliest.map(|e| e.weight_kg),
            days_tracking,
            calories_today,
        ),
    })
}

/// Share text for a day's logged meals
pub fn share_meal_plan(db: &Database, date: &str) -> Result<ShareTextResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let day = Day::get_by_date(&conn, date)
        .map_err(|e| format!("Failed to get day: {}", e))?
        .ok_or_else(|| format!("No meals logged on {}", date))?;

    let entries = MealEntry::get_details_for_day(&conn, day.id)
        .map_err(|e| format!("Failed to get meal entries: {}", e))?;
    if entries.is_empty() {
        return Err(format!("No meals logged on {}", date));
    }

    let meals: Vec<(String, f64)> = entries
        .into_iter()
        .map(|e| (e.food_name, e.nutrition.calories))
        .collect();

    Ok(ShareTextResponse {
        title: format!("My Meal Plan - {}", APP_NAME),
        message: build_meal_plan_message(&meals),
    })
}

/// Share text inviting someone to the app
pub fn share_invite(db: &Database) -> Result<ShareTextResponse, String> {
    // Personalize the title when a profile exists
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = Profile::get(&conn).map_err(|e| format!("Failed to load profile: {}", e))?;

    let title = match profile {
        Some(p) => format!("{} invited you to {}", p.name, APP_NAME),
        None => format!("Try {}", APP_NAME),
    };

    Ok(ShareTextResponse {
        title,
        message: build_invite_message(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_message_direction() {
        let message = build_progress_message(78.5, Some(80.0), 14, 1850.0);
        assert!(message.contains("14 days"));
        assert!(message.contains("78.5 kg"));
        assert!(message.contains("1.5 kg down"));
        assert!(message.contains("1850 kcal"));

        let gained = build_progress_message(81.0, Some(80.0), 5, 2200.0);
        assert!(gained.contains("1.0 kg up"));

        // No start weight: delta line is omitted
        let fresh = build_progress_message(80.0, None, 1, 0.0);
        assert!(!fresh.contains("since I started"));
    }

    #[test]
    fn test_meal_plan_message_totals() {
        let meals = vec![
            ("Oats".to_string(), 389.0),
            ("Grilled Chicken Breast".to_string(), 330.0),
        ];
        let message = build_meal_plan_message(&meals);
        assert!(message.contains("1. Oats (389 kcal)"));
        assert!(message.contains("2. Grilled Chicken Breast (330 kcal)"));
        assert!(message.contains("Total: 719 kcal"));
    }
}
