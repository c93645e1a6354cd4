//! Meal Entry model
//!
//! A logged portion of a food item attached to a day.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::{Day, FoodItem, Nutrition};
use crate::db::DbResult;

/// Meal type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    /// Parse a meal type; the set is closed, unknown strings are rejected
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// A meal entry representing consumed food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: i64,
    pub day_id: i64,
    pub meal_type: MealType,
    pub food_item_id: i64,
    pub quantity: f64, // servings of the food item
    pub cached_nutrition: Nutrition,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Meal entry joined with its day and food item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealEntryDetail {
    pub id: i64,
    pub day_id: i64,
    pub date: String,
    pub meal_type: MealType,
    pub food_item_id: i64,
    pub food_name: String,
    pub serving_size: f64,
    pub serving_unit: String,
    pub quantity: f64,
    pub nutrition: Nutrition,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Data for creating a meal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealEntryCreate {
    pub day_id: i64,
    pub meal_type: MealType,
    pub food_item_id: i64,
    pub quantity: f64,
    pub notes: Option<String>,
}

/// Data for updating a meal entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealEntryUpdate {
    pub meal_type: Option<MealType>,
    pub quantity: Option<f64>,
    pub notes: Option<String>,
}

impl MealEntry {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_type_str: String = row.get("meal_type")?;
        let meal_type = MealType::parse(&meal_type_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown meal type: {}", meal_type_str).into(),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            day_id: row.get("day_id")?,
            meal_type,
            food_item_id: row.get("food_item_id")?,
            quantity: row.get("quantity")?,
            cached_nutrition: Nutrition {
                calories: row.get("cached_calories")?,
                protein: row.get("cached_protein")?,
                carbs: row.get("cached_carbs")?,
                fat: row.get("cached_fat")?,
                fiber: row.get("cached_fiber")?,
                sugar: row.get("cached_sugar")?,
                sodium: row.get("cached_sodium")?,
            },
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Create a new meal entry and refresh the day totals
    pub fn create(conn: &Connection, data: &MealEntryCreate) -> DbResult<Self> {
        let food_item = FoodItem::get_by_id(conn, data.food_item_id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))?;

        let nutrition = food_item.nutrition.scale(data.quantity);

        conn.execute(
            r#"
            INSERT INTO meal_entries (
                day_id, meal_type, food_item_id, quantity,
                cached_calories, cached_protein, cached_carbs, cached_fat,
                cached_fiber, cached_sugar, cached_sodium, notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                data.day_id,
                data.meal_type.as_str(),
                data.food_item_id,
                data.quantity,
                nutrition.calories,
                nutrition.protein,
                nutrition.carbs,
                nutrition.fat,
                nutrition.fiber,
                nutrition.sugar,
                nutrition.sodium,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        let entry = Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })?;

        recalculate_day_nutrition(conn, data.day_id)?;

        Ok(entry)
    }

    /// Get a meal entry by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meal_entries WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get detailed meal entry with day and food info
    pub fn get_detail(conn: &Connection, id: i64) -> DbResult<Option<MealEntryDetail>> {
        match Self::get_by_id(conn, id)? {
            Some(entry) => {
                let day = Day::get_by_id(conn, entry.day_id)?.ok_or_else(|| {
                    crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
                })?;
                let food_item = FoodItem::get_by_id(conn, entry.food_item_id)?.ok_or_else(|| {
                    crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
                })?;

                Ok(Some(MealEntryDetail {
                    id: entry.id,
                    day_id: entry.day_id,
                    date: day.date,
                    meal_type: entry.meal_type,
                    food_item_id: entry.food_item_id,
                    food_name: food_item.name,
                    serving_size: food_item.serving_size,
                    serving_unit: food_item.serving_unit,
                    quantity: entry.quantity,
                    nutrition: entry.cached_nutrition,
                    notes: entry.notes,
                    created_at: entry.created_at,
                }))
            }
            None => Ok(None),
        }
    }

    /// Get all meal entries for a day
    pub fn get_for_day(conn: &Connection, day_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM meal_entries WHERE day_id = ?1 ORDER BY meal_type, id")?;

        let entries = stmt
            .query_map([day_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Get detailed meal entries for a day
    pub fn get_details_for_day(conn: &Connection, day_id: i64) -> DbResult<Vec<MealEntryDetail>> {
        let entries = Self::get_for_day(conn, day_id)?;
        let day = Day::get_by_id(conn, day_id)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))?;

        let mut details = Vec::new();
        for entry in entries {
            let food_item = FoodItem::get_by_id(conn, entry.food_item_id)?.ok_or_else(|| {
                crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
            })?;

            details.push(MealEntryDetail {
                id: entry.id,
                day_id: entry.day_id,
                date: day.date.clone(),
                meal_type: entry.meal_type,
                food_item_id: entry.food_item_id,
                food_name: food_item.name,
                serving_size: food_item.serving_size,
                serving_unit: food_item.serving_unit,
                quantity: entry.quantity,
                nutrition: entry.cached_nutrition,
                notes: entry.notes,
                created_at: entry.created_at,
            });
        }

        Ok(details)
    }

    /// Update a meal entry; changing the quantity recalculates its cache
    pub fn update(conn: &Connection, id: i64, data: &MealEntryUpdate) -> DbResult<Option<Self>> {
        let entry = match Self::get_by_id(conn, id)? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(meal_type) = data.meal_type {
            params_vec.push(Box::new(meal_type.as_str().to_string()));
            updates.push(format!("meal_type = ?{}", params_vec.len()));
        }
        if let Some(quantity) = data.quantity {
            params_vec.push(Box::new(quantity));
            updates.push(format!("quantity = ?{}", params_vec.len()));
        }
        if let Some(ref notes) = data.notes {
            params_vec.push(Box::new(notes.clone()));
            updates.push(format!("notes = ?{}", params_vec.len()));
        }

        if updates.is_empty() {
            return Ok(Some(entry));
        }

        if let Some(quantity) = data.quantity {
            let food_item = FoodItem::get_by_id(conn, entry.food_item_id)?.ok_or_else(|| {
                crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
            })?;
            let nutrition = food_item.nutrition.scale(quantity);

            for (column, value) in [
                ("cached_calories", nutrition.calories),
                ("cached_protein", nutrition.protein),
                ("cached_carbs", nutrition.carbs),
                ("cached_fat", nutrition.fat),
                ("cached_fiber", nutrition.fiber),
                ("cached_sugar", nutrition.sugar),
                ("cached_sodium", nutrition.sodium),
            ] {
                params_vec.push(Box::new(value));
                updates.push(format!("{} = ?{}", column, params_vec.len()));
            }
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE meal_entries SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        recalculate_day_nutrition(conn, entry.day_id)?;

        Self::get_by_id(conn, id)
    }

    /// Delete a meal entry and refresh the day totals
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let entry = Self::get_by_id(conn, id)?;

        let rows = conn.execute("DELETE FROM meal_entries WHERE id = ?1", [id])?;

        if rows > 0 {
            if let Some(entry) = entry {
                recalculate_day_nutrition(conn, entry.day_id)?;
            }
        }

        Ok(rows > 0)
    }
}

/// Refresh a meal entry's cached nutrition from its food item
fn refresh_meal_entry_nutrition(conn: &Connection, entry: &MealEntry) -> DbResult<Nutrition> {
    let food_item = FoodItem::get_by_id(conn, entry.food_item_id)?
        .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))?;

    let nutrition = food_item.nutrition.scale(entry.quantity);

    conn.execute(
        r#"
        UPDATE meal_entries SET
            cached_calories = ?1,
            cached_protein = ?2,
            cached_carbs = ?3,
            cached_fat = ?4,
            cached_fiber = ?5,
            cached_sugar = ?6,
            cached_sodium = ?7,
            updated_at = datetime('now')
        WHERE id = ?8
        "#,
        params![
            nutrition.calories,
            nutrition.protein,
            nutrition.carbs,
            nutrition.fat,
            nutrition.fiber,
            nutrition.sugar,
            nutrition.sodium,
            entry.id,
        ],
    )?;

    Ok(nutrition)
}

/// Recalculate and update cached nutrition for a day.
///
/// Cascades from source: each meal entry is refreshed from its food item
/// before the day totals are summed, so food edits propagate here.
pub fn recalculate_day_nutrition(conn: &Connection, day_id: i64) -> DbResult<Nutrition> {
    let entries = MealEntry::get_for_day(conn, day_id)?;

    let mut total = Nutrition::zero();
    for entry in &entries {
        let nutrition = refresh_meal_entry_nutrition(conn, entry)?;
        total = total + nutrition;
    }

    Day::update_cached_nutrition(conn, day_id, &total)?;

    Ok(total)
}

/// Recalculate every day that has an entry for the given food item.
/// Returns the number of days refreshed.
pub fn recalculate_days_for_food_item(conn: &Connection, food_item_id: i64) -> DbResult<i64> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT day_id FROM meal_entries WHERE food_item_id = ?1")?;
    let day_ids = stmt
        .query_map([food_item_id], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    for day_id in &day_ids {
        recalculate_day_nutrition(conn, *day_id)?;
    }

    Ok(day_ids.len() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::test_support::memory_db;
    use crate::models::{FoodItemCreate, FoodItemUpdate};

    fn seed_food(conn: &Connection, name: &str, calories: f64) -> FoodItem {
        FoodItem::create(
            conn,
            &FoodItemCreate {
                name: name.to_string(),
                brand: None,
                category: None,
                serving_size: 100.0,
                serving_unit: "g".to_string(),
                calories,
                protein: 10.0,
                carbs: 20.0,
                fat: 5.0,
                fiber: 0.0,
                sugar: 0.0,
                sodium: 0.0,
                notes: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_log_meal_updates_day_totals() {
        let conn = memory_db();
        let food = seed_food(&conn, "Rice", 111.0);
        let day = Day::get_or_create(&conn, "2026-08-06").unwrap();

        MealEntry::create(
            &conn,
            &MealEntryCreate {
                day_id: day.id,
                meal_type: MealType::Lunch,
                food_item_id: food.id,
                quantity: 2.0,
                notes: None,
            },
        )
        .unwrap();

        let day = Day::get_by_id(&conn, day.id).unwrap().unwrap();
        assert!((day.cached_nutrition.calories - 222.0).abs() < 1e-9);
        assert!((day.cached_nutrition.protein - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_quantity_update_rescales_cache() {
        let conn = memory_db();
        let food = seed_food(&conn, "Oats", 389.0);
        let day = Day::get_or_create(&conn, "2026-08-06").unwrap();

        let entry = MealEntry::create(
            &conn,
            &MealEntryCreate {
                day_id: day.id,
                meal_type: MealType::Breakfast,
                food_item_id: food.id,
                quantity: 1.0,
                notes: None,
            },
        )
        .unwrap();

        let updated = MealEntry::update(
            &conn,
            entry.id,
            &MealEntryUpdate {
                quantity: Some(0.5),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

        assert!((updated.cached_nutrition.calories - 194.5).abs() < 1e-9);

        let day = Day::get_by_id(&conn, day.id).unwrap().unwrap();
        assert!((day.cached_nutrition.calories - 194.5).abs() < 1e-9);
    }

    #[test]
    fn test_food_edit_cascades_to_days() {
        let conn = memory_db();
        let food = seed_food(&conn, "Bread", 250.0);
        let day = Day::get_or_create(&conn, "2026-08-06").unwrap();

        MealEntry::create(
            &conn,
            &MealEntryCreate {
                day_id: day.id,
                meal_type: MealType::Snack,
                food_item_id: food.id,
                quantity: 1.0,
                notes: None,
            },
        )
        .unwrap();

        FoodItem::update(
            &conn,
            food.id,
            &FoodItemUpdate {
                calories: Some(300.0),
                ..Default::default()
            },
        )
        .unwrap();
        let refreshed = recalculate_days_for_food_item(&conn, food.id).unwrap();
        assert_eq!(refreshed, 1);

        let day = Day::get_by_id(&conn, day.id).unwrap().unwrap();
        assert!((day.cached_nutrition.calories - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_delete_refreshes_day() {
        let conn = memory_db();
        let food = seed_food(&conn, "Egg", 72.0);
        let day = Day::get_or_create(&conn, "2026-08-06").unwrap();

        let entry = MealEntry::create(
            &conn,
            &MealEntryCreate {
                day_id: day.id,
                meal_type: MealType::Breakfast,
                food_item_id: food.id,
                quantity: 2.0,
                notes: None,
            },
        )
        .unwrap();

        assert!(MealEntry::delete(&conn, entry.id).unwrap());
        let day = Day::get_by_id(&conn, day.id).unwrap().unwrap();
        assert_eq!(day.cached_nutrition.calories, 0.0);
    }
}
