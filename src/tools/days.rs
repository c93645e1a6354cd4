//! Day and Meal Entry Tools
//!
//! Tools for logging meals and reading daily summaries.

use serde::Serialize;

use crate::db::Database;
use crate::models::{
    recalculate_day_nutrition, Day, FoodItem, MealEntry, MealEntryCreate, MealEntryDetail,
    MealEntryUpdate, MealType, Nutrition, Profile,
};

/// Day with meal entries for detailed view
#[derive(Debug, Serialize)]
pub struct DayDetail {
    pub id: i64,
    pub date: String,
    pub meals: DayMeals,
    pub nutrition_total: Nutrition,
    pub notes: Option<String>,
}

/// Meals organized by type
#[derive(Debug, Serialize)]
pub struct DayMeals {
    pub breakfast: Vec<MealEntryDetail>,
    pub lunch: Vec<MealEntryDetail>,
    pub dinner: Vec<MealEntryDetail>,
    pub snack: Vec<MealEntryDetail>,
}

/// Day summary for listing
#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub id: i64,
    pub date: String,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub meal_count: usize,
}

/// Response for list_days
#[derive(Debug, Serialize)]
pub struct ListDaysResponse {
    pub days: Vec<DaySummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for log_meal
#[derive(Debug, Serialize)]
pub struct LogMealResponse {
    pub id: i64,
    pub day_id: i64,
    pub date: String,
    pub meal_type: String,
    pub food_name: String,
    pub quantity: f64,
    pub nutrition: Nutrition,
    pub day_total: Nutrition,
}

/// One macro line on the dashboard
#[derive(Debug, Serialize)]
pub struct MacroProgress {
    pub consumed: f64,  // grams
    pub target: Option<i64>,
    pub remaining: Option<f64>,
}

/// Response for get_dashboard
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub date: String,
    pub calories_consumed: f64,
    pub calories_target: Option<i64>,
    pub calories_remaining: Option<f64>,
    /// Percent of the daily target, uncapped (a 110% day reports 110)
    pub percent_of_target: Option<f64>,
    pub protein: MacroProgress,
    pub carbs: MacroProgress,
    pub fat: MacroProgress,
    pub meal_count: usize,
}

/// Check an ISO "YYYY-MM-DD" date string
fn validate_date(date: &str) -> Result<(), String> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| format!("Invalid date (expected YYYY-MM-DD): {}", date))
}

/// Log a meal: food item + quantity attached to a date
pub fn log_meal(
    db: &Database,
    date: &str,
    meal_type: &str,
    food_id: i64,
    quantity: f64,
    notes: Option<String>,
) -> Result<LogMealResponse, String> {
    validate_date(date)?;

    let meal_type = MealType::parse(meal_type)
        .ok_or_else(|| format!("Unknown meal type: {} (use breakfast, lunch, dinner, or snack)", meal_type))?;

    if quantity <= 0.0 || !quantity.is_finite() {
        return Err("Quantity must be greater than 0".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let food = FoodItem::get_by_id(&conn, food_id)
        .map_err(|e| format!("Database error checking food: {}", e))?
        .ok_or_else(|| format!("Food not found with id: {}", food_id))?;

    let day = Day::get_or_create(&conn, date)
        .map_err(|e| format!("Failed to get/create day: {}", e))?;

    let entry = MealEntry::create(
        &conn,
        &MealEntryCreate {
            day_id: day.id,
            meal_type,
            food_item_id: food_id,
            quantity,
            notes,
        },
    )
    .map_err(|e| format!("Failed to log meal: {}", e))?;

    let day = Day::get_by_id(&conn, day.id)
        .map_err(|e| format!("Failed to reload day: {}", e))?
        .ok_or_else(|| "Day disappeared after logging".to_string())?;

    Ok(LogMealResponse {
        id: entry.id,
        day_id: day.id,
        date: day.date,
        meal_type: entry.meal_type.as_str().to_string(),
        food_name: food.name,
        quantity: entry.quantity,
        nutrition: entry.cached_nutrition,
        day_total: day.cached_nutrition,
    })
}

/// Get a day with full details including meals grouped by type
pub fn get_day(db: &Database, date: &str) -> Result<Option<DayDetail>, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let day = Day::get_by_date(&conn, date).map_err(|e| format!("Failed to get day: {}", e))?;

    match day {
        Some(day) => {
            let entries = MealEntry::get_details_for_day(&conn, day.id)
                .map_err(|e| format!("Failed to get meal entries: {}", e))?;

            let mut meals = DayMeals {
                breakfast: Vec::new(),
                lunch: Vec::new(),
                dinner: Vec::new(),
                snack: Vec::new(),
            };

            for entry in entries {
                match entry.meal_type {
                    MealType::Breakfast => meals.breakfast.push(entry),
                    MealType::Lunch => meals.lunch.push(entry),
                    MealType::Dinner => meals.dinner.push(entry),
                    MealType::Snack => meals.snack.push(entry),
                }
            }

            Ok(Some(DayDetail {
                id: day.id,
                date: day.date,
                meals,
                nutrition_total: day.cached_nutrition,
                notes: day.notes,
            }))
        }
        None => Ok(None),
    }
}

/// List days with optional date range
pub fn list_days(
    db: &Database,
    start_date: Option<&str>,
    end_date: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<ListDaysResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let days = Day::list(&conn, start_date, end_date, limit, offset)
        .map_err(|e| format!("Failed to list days: {}", e))?;

    let total = Day::count(&conn, start_date, end_date)
        .map_err(|e| format!("Failed to count days: {}", e))?;

    let mut summaries = Vec::new();
    for day in days {
        let entries = MealEntry::get_for_day(&conn, day.id)
            .map_err(|e| format!("Failed to get meal entries: {}", e))?;

        summaries.push(DaySummary {
            id: day.id,
            date: day.date,
            total_calories: day.cached_nutrition.calories,
            total_protein: day.cached_nutrition.protein,
            total_carbs: day.cached_nutrition.carbs,
            total_fat: day.cached_nutrition.fat,
            meal_count: entries.len(),
        });
    }

    Ok(ListDaysResponse {
        days: summaries,
        total,
        limit,
        offset,
    })
}

/// Get a meal entry by ID
pub fn get_meal_entry(db: &Database, id: i64) -> Result<Option<MealEntryDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    MealEntry::get_detail(&conn, id).map_err(|e| format!("Failed to get meal entry: {}", e))
}

/// Update a meal entry
pub fn update_meal_entry(
    db: &Database,
    id: i64,
    meal_type: Option<&str>,
    quantity: Option<f64>,
    notes: Option<String>,
) -> Result<Option<MealEntryDetail>, String> {
    let meal_type = match meal_type {
        Some(s) => Some(
            MealType::parse(s)
                .ok_or_else(|| format!("Unknown meal type: {}", s))?,
        ),
        None => None,
    };

    if let Some(quantity) = quantity {
        if quantity <= 0.0 || !quantity.is_finite() {
            return Err("Quantity must be greater than 0".to_string());
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = MealEntry::update(
        &conn,
        id,
        &MealEntryUpdate {
            meal_type,
            quantity,
            notes,
        },
    )
    .map_err(|e| format!("Failed to update meal entry: {}", e))?;

    match updated {
        Some(entry) => MealEntry::get_detail(&conn, entry.id)
            .map_err(|e| format!("Failed to load meal entry: {}", e)),
        None => Ok(None),
    }
}

/// Delete a meal entry
pub fn delete_meal_entry(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    MealEntry::delete(&conn, id).map_err(|e| format!("Failed to delete meal entry: {}", e))
}

/// Update a day's notes
pub fn update_day(
    db: &Database,
    date: &str,
    notes: Option<String>,
) -> Result<Option<DayDetail>, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let day = Day::get_by_date(&conn, date).map_err(|e| format!("Failed to get day: {}", e))?;

    match day {
        Some(day) => {
            Day::update_notes(&conn, day.id, notes.as_deref())
                .map_err(|e| format!("Failed to update day: {}", e))?;

            drop(conn);
            get_day(db, date)
        }
        None => Ok(None),
    }
}

/// Delete a day and everything logged on it
pub fn delete_day(db: &Database, date: &str) -> Result<bool, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let day = Day::get_by_date(&conn, date).map_err(|e| format!("Failed to get day: {}", e))?;

    match day {
        Some(day) => Day::delete(&conn, day.id).map_err(|e| format!("Failed to delete day: {}", e)),
        None => Ok(false),
    }
}

/// Force a day's cached totals to be recomputed from its entries
pub fn recalculate_day(db: &Database, date: &str) -> Result<Nutrition, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let day = Day::get_by_date(&conn, date)
        .map_err(|e| format!("Failed to get day: {}", e))?
        .ok_or_else(|| format!("Day not found: {}", date))?;

    recalculate_day_nutrition(&conn, day.id)
        .map_err(|e| format!("Failed to recalculate nutrition: {}", e))
}

/// Today's consumption vs. the profile targets
pub fn get_dashboard(db: &Database, date: &str) -> Result<DashboardResponse, String> {
    validate_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = Profile::get(&conn).map_err(|e| format!("Failed to load profile: {}", e))?;
    let target = profile.and_then(|p| p.target);

    let (consumed, meal_count) = match Day::get_by_date(&conn, date)
        .map_err(|e| format!("Failed to get day: {}", e))?
    {
        Some(day) => {
            let entries = MealEntry::get_for_day(&conn, day.id)
                .map_err(|e| format!("Failed to get meal entries: {}", e))?;
            (day.cached_nutrition, entries.len())
        }
        None => (Nutrition::zero(), 0),
    };

    let macro_progress = |consumed: f64, target_g: Option<i64>| MacroProgress {
        consumed,
        target: target_g,
        remaining: target_g.map(|t| (t as f64 - consumed).max(0.0)),
    };

    let calories_target = target.map(|t| t.daily_calories);

    Ok(DashboardResponse {
        date: date.to_string(),
        calories_consumed: consumed.calories,
        calories_target,
        calories_remaining: calories_target.map(|t| (t as f64 - consumed.calories).max(0.0)),
        percent_of_target: calories_target.and_then(|t| {
            if t > 0 {
                Some(consumed.calories / t as f64 * 100.0)
            } else {
                None
            }
        }),
        protein: macro_progress(consumed.protein, target.map(|t| t.daily_protein)),
        carbs: macro_progress(consumed.carbs, target.map(|t| t.daily_carbs)),
        fat: macro_progress(consumed.fat, target.map(|t| t.daily_fat)),
        meal_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::tools::food_items::seed_starter_catalog;
    use crate::tools::profile::{complete_onboarding, sign_in, Session};

    fn test_db(name: &str) -> Database {
        let db = Database::new_in_memory(name).unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn find_food(db: &Database, name: &str) -> i64 {
        let response = crate::tools::food_items::search_foods(db, name, 10).unwrap();
        response.results[0].id
    }

    #[test]
    fn test_log_meal_and_day_view() {
        let db = test_db("days_log");
        seed_starter_catalog(&db).unwrap();
        let banana = find_food(&db, "banana");

        let logged = log_meal(&db, "2026-08-06", "breakfast", banana, 2.0, None).unwrap();
        assert_eq!(logged.food_name, "Banana");
        assert!((logged.nutrition.calories - 178.0).abs() < 1e-9);
        assert!((logged.day_total.calories - 178.0).abs() < 1e-9);

        let day = get_day(&db, "2026-08-06").unwrap().unwrap();
        assert_eq!(day.meals.breakfast.len(), 1);
        assert!(day.meals.lunch.is_empty());
        assert!((day.nutrition_total.calories - 178.0).abs() < 1e-9);
    }

    #[test]
    fn test_log_meal_rejects_bad_input() {
        let db = test_db("days_bad");
        seed_starter_catalog(&db).unwrap();
        let banana = find_food(&db, "banana");

        assert!(log_meal(&db, "not-a-date", "breakfast", banana, 1.0, None).is_err());
        assert!(log_meal(&db, "2026-08-06", "brunch", banana, 1.0, None).is_err());
        assert!(log_meal(&db, "2026-08-06", "breakfast", banana, 0.0, None).is_err());
        assert!(log_meal(&db, "2026-08-06", "breakfast", 9999, 1.0, None).is_err());
    }

    #[test]
    fn test_dashboard_against_targets() {
        let db = test_db("days_dashboard");
        seed_starter_catalog(&db).unwrap();

        let mut session = Session::new();
        sign_in(&db, &mut session, "ana@example.com", "Ana").unwrap();
        complete_onboarding(&db, &mut session, 30, 70.0, 175.0, "sedentary", "maintain").unwrap();

        let chicken = find_food(&db, "chicken");
        log_meal(&db, "2026-08-06", "lunch", chicken, 2.0, None).unwrap();

        let dashboard = get_dashboard(&db, "2026-08-06").unwrap();
        assert_eq!(dashboard.calories_target, Some(2035));
        assert!((dashboard.calories_consumed - 330.0).abs() < 1e-9);
        assert!((dashboard.calories_remaining.unwrap() - 1705.0).abs() < 1e-9);
        assert!(dashboard.percent_of_target.unwrap() > 16.0);
        assert_eq!(dashboard.protein.target, Some(127));
        assert_eq!(dashboard.meal_count, 1);
    }

    #[test]
    fn test_dashboard_without_profile() {
        let db = test_db("days_dashboard_anon");
        let dashboard = get_dashboard(&db, "2026-08-06").unwrap();
        assert_eq!(dashboard.calories_target, None);
        assert_eq!(dashboard.calories_consumed, 0.0);
        assert!(dashboard.percent_of_target.is_none());
    }
}
