//! Food Catalog Tools
//!
//! Tools for managing and searching the food catalog.

use serde::Serialize;

use crate::db::Database;
use crate::models::{
    recalculate_days_for_food_item, FoodItem, FoodItemCreate, FoodItemUpdate,
};

/// Minimum query length for substring search
const MIN_SEARCH_LEN: usize = 2;

/// Response for search_foods
#[derive(Debug, Serialize)]
pub struct SearchFoodsResponse {
    pub query: String,
    pub results: Vec<FoodItem>,
    pub count: usize,
}

/// Response for list_foods
#[derive(Debug, Serialize)]
pub struct ListFoodsResponse {
    pub foods: Vec<FoodItem>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for update_food when the edit cascaded into logged days
#[derive(Debug, Serialize)]
pub struct UpdateFoodResponse {
    pub food: FoodItem,
    pub days_recalculated: i64,
}

/// Response for delete_food
#[derive(Debug, Serialize)]
pub struct DeleteFoodResponse {
    pub success: bool,
    pub message: String,
}

/// Create a new food item
pub fn add_food(db: &Database, data: FoodItemCreate) -> Result<FoodItem, String> {
    if data.name.trim().is_empty() {
        return Err("Food name must not be empty".to_string());
    }
    if data.serving_size <= 0.0 {
        return Err("serving_size must be greater than 0".to_string());
    }
    if data.calories < 0.0 || data.protein < 0.0 || data.carbs < 0.0 || data.fat < 0.0 {
        return Err("Nutrition values must not be negative".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    FoodItem::create(&conn, &data).map_err(|e| format!("Failed to add food: {}", e))
}

/// Get a food item by ID
pub fn get_food(db: &Database, id: i64) -> Result<Option<FoodItem>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    FoodItem::get_by_id(&conn, id).map_err(|e| format!("Failed to get food: {}", e))
}

/// Search food items by name or brand.
///
/// Queries shorter than two characters return an empty result instead of
/// scanning the whole catalog.
pub fn search_foods(db: &Database, query: &str, limit: i64) -> Result<SearchFoodsResponse, String> {
    let query = query.trim();
    if query.len() < MIN_SEARCH_LEN {
        return Ok(SearchFoodsResponse {
            query: query.to_string(),
            results: Vec::new(),
            count: 0,
        });
    }

    let limit = limit.clamp(1, 100);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let results =
        FoodItem::search(&conn, query, limit).map_err(|e| format!("Search failed: {}", e))?;

    Ok(SearchFoodsResponse {
        query: query.to_string(),
        count: results.len(),
        results,
    })
}

/// List food items with optional category filter
pub fn list_foods(
    db: &Database,
    category: Option<&str>,
    sort_by: &str,
    sort_order: &str,
    limit: i64,
    offset: i64,
) -> Result<ListFoodsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let foods = FoodItem::list(&conn, category, sort_by, sort_order, limit, offset)
        .map_err(|e| format!("Failed to list foods: {}", e))?;
    let total =
        FoodItem::count(&conn, category).map_err(|e| format!("Failed to count foods: {}", e))?;

    Ok(ListFoodsResponse {
        foods,
        total,
        limit,
        offset,
    })
}

/// Update a food item and cascade the change into every day that logged it
pub fn update_food(
    db: &Database,
    id: i64,
    data: FoodItemUpdate,
) -> Result<Option<UpdateFoodResponse>, String> {
    if let Some(serving_size) = data.serving_size {
        if serving_size <= 0.0 {
            return Err("serving_size must be greater than 0".to_string());
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = FoodItem::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update food: {}", e))?;

    match updated {
        Some(food) => {
            let days_recalculated = recalculate_days_for_food_item(&conn, id)
                .map_err(|e| format!("Failed to recalculate days: {}", e))?;
            Ok(Some(UpdateFoodResponse {
                food,
                days_recalculated,
            }))
        }
        None => Ok(None),
    }
}

/// Delete a food item, refusing while meal entries still reference it
pub fn delete_food(db: &Database, id: i64) -> Result<DeleteFoodResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let references = FoodItem::meal_entry_count(&conn, id)
        .map_err(|e| format!("Failed to check usage: {}", e))?;
    if references > 0 {
        return Ok(DeleteFoodResponse {
            success: false,
            message: format!(
                "Food is referenced by {} meal entries; delete those first",
                references
            ),
        });
    }

    let deleted =
        FoodItem::delete(&conn, id).map_err(|e| format!("Failed to delete food: {}", e))?;

    Ok(DeleteFoodResponse {
        success: deleted,
        message: if deleted {
            "Food deleted".to_string()
        } else {
            format!("Food not found with id: {}", id)
        },
    })
}

/// The starter catalog the mobile app shipped with, plus pantry staples
pub fn starter_catalog() -> Vec<FoodItemCreate> {
    fn item(
        name: &str,
        category: &str,
        serving_size: f64,
        serving_unit: &str,
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
    ) -> FoodItemCreate {
        FoodItemCreate {
            name: name.to_string(),
            brand: None,
            category: Some(category.to_string()),
            serving_size,
            serving_unit: serving_unit.to_string(),
            calories,
            protein,
            carbs,
            fat,
            fiber: 0.0,
            sugar: 0.0,
            sodium: 0.0,
            notes: None,
        }
    }

    vec![
        item("Banana", "Fruits", 1.0, "count", 89.0, 1.1, 22.8, 0.3),
        item("Grilled Chicken Breast", "Proteins", 100.0, "g", 165.0, 31.0, 0.0, 3.6),
        item("Cooked Brown Rice", "Carbs", 100.0, "g", 111.0, 2.6, 23.0, 0.9),
        item("Oats", "Cereals", 100.0, "g", 389.0, 16.9, 66.3, 6.9),
        item("Egg (large)", "Proteins", 1.0, "count", 72.0, 6.3, 0.4, 4.8),
        item("Greek Yogurt (plain)", "Dairy", 100.0, "g", 59.0, 10.0, 3.6, 0.4),
        item("Apple", "Fruits", 1.0, "count", 95.0, 0.5, 25.0, 0.3),
        item("Whole Wheat Bread", "Carbs", 1.0, "count", 81.0, 4.0, 13.8, 1.1),
        item("Peanut Butter", "Spreads", 100.0, "g", 588.0, 25.0, 20.0, 50.0),
        item("Salmon Fillet", "Proteins", 100.0, "g", 208.0, 20.4, 0.0, 13.4),
    ]
}

/// Insert the starter catalog into an empty database.
/// Returns how many foods were added; does nothing if any food exists.
pub fn seed_starter_catalog(db: &Database) -> Result<i64, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let existing = FoodItem::count(&conn, None).map_err(|e| format!("Count failed: {}", e))?;
    if existing > 0 {
        return Ok(0);
    }

    let catalog = starter_catalog();
    let added = catalog.len() as i64;
    for data in &catalog {
        FoodItem::create(&conn, data).map_err(|e| format!("Seed failed: {}", e))?;
    }

    Ok(added)
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
    fn test_short_queries_return_nothing() {
        let db = test_db("foods_short_query");
        seed_starter_catalog(&db).unwrap();

        let response = search_foods(&db, "b", 20).unwrap();
        assert_eq!(response.count, 0);

        let response = search_foods(&db, "ban", 20).unwrap();
        assert_eq!(response.count, 1);
        assert_eq!(response.results[0].name, "Banana");
    }

    #[test]
    fn test_seed_is_idempotent() {
        let db = test_db("foods_seed");
        assert_eq!(seed_starter_catalog(&db).unwrap(), 10);
        assert_eq!(seed_starter_catalog(&db).unwrap(), 0);
    }

    #[test]
    fn test_rejects_bad_food() {
        let db = test_db("foods_bad");

        let mut data = starter_catalog().remove(0);
        data.serving_size = 0.0;
        assert!(add_food(&db, data).is_err());
    }
}
