//! Food Item model
//!
//! The food catalog: per-serving nutrition for things that can be logged.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::Nutrition;
use crate::db::DbResult;

/// A food item with nutritional information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub nutrition: Nutrition,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new food item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItemCreate {
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    #[serde(default)]
    pub sodium: f64,
    pub notes: Option<String>,
}

/// Data for updating a food item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodItemUpdate {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
    pub notes: Option<String>,
}

impl FoodItem {
    /// Create a FoodItem from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            brand: row.get("brand")?,
            category: row.get("category")?,
            serving_size: row.get("serving_size")?,
            serving_unit: row.get("serving_unit")?,
            nutrition: Nutrition {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fat: row.get("fat")?,
                fiber: row.get("fiber")?,
                sugar: row.get("sugar")?,
                sodium: row.get("sodium")?,
            },
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new food item into the database
    pub fn create(conn: &Connection, data: &FoodItemCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO food_items (
                name, brand, category, serving_size, serving_unit,
                calories, protein, carbs, fat, fiber, sugar, sodium, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                data.name,
                data.brand,
                data.category,
                data.serving_size,
                data.serving_unit,
                data.calories,
                data.protein,
                data.carbs,
                data.fat,
                data.fiber,
                data.sugar,
                data.sodium,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a food item by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_items WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Search food items by name or brand (case-insensitive substring)
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", query);
        let mut stmt = conn.prepare(
            "SELECT * FROM food_items
             WHERE name LIKE ?1 COLLATE NOCASE OR brand LIKE ?1 COLLATE NOCASE
             ORDER BY name LIMIT ?2",
        )?;

        let items = stmt
            .query_map(params![pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// List food items with optional category filter
    pub fn list(
        conn: &Connection,
        category: Option<&str>,
        sort_by: &str,
        sort_order: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let sort_column = match sort_by {
            "created_at" => "created_at",
            "calories" => "calories",
            _ => "name",
        };
        let order = if sort_order.eq_ignore_ascii_case("desc") {
            "DESC"
        } else {
            "ASC"
        };

        let mut sql = String::from("SELECT * FROM food_items WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(category) = category {
            params_vec.push(Box::new(category.to_string()));
            sql.push_str(&format!(" AND category = ?{} COLLATE NOCASE", params_vec.len()));
        }

        sql.push_str(&format!(" ORDER BY {} {}", sort_column, order));

        params_vec.push(Box::new(limit));
        sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));

        params_vec.push(Box::new(offset));
        sql.push_str(&format!(" OFFSET ?{}", params_vec.len()));

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let items = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Count food items, optionally within a category
    pub fn count(conn: &Connection, category: Option<&str>) -> DbResult<i64> {
        let count: i64 = match category {
            Some(category) => conn.query_row(
                "SELECT COUNT(*) FROM food_items WHERE category = ?1 COLLATE NOCASE",
                params![category],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM food_items", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// Number of meal entries referencing this food item
    pub fn meal_entry_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM meal_entries WHERE food_item_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Update a food item with the provided fields
    pub fn update(conn: &Connection, id: i64, data: &FoodItemUpdate) -> DbResult<Option<Self>> {
        if Self::get_by_id(conn, id)?.is_none() {
            return Ok(None);
        }

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! push_field {
            ($field:ident, $column:literal) => {
                if let Some(ref value) = data.$field {
                    params_vec.push(Box::new(value.clone()));
                    updates.push(format!(concat!($column, " = ?{}"), params_vec.len()));
                }
            };
        }

        push_field!(name, "name");
        push_field!(brand, "brand");
        push_field!(category, "category");
        push_field!(serving_size, "serving_size");
        push_field!(serving_unit, "serving_unit");
        push_field!(calories, "calories");
        push_field!(protein, "protein");
        push_field!(carbs, "carbs");
        push_field!(fat, "fat");
        push_field!(fiber, "fiber");
        push_field!(sugar, "sugar");
        push_field!(sodium, "sodium");
        push_field!(notes, "notes");

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE food_items SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a food item. Fails at the SQL level if meal entries still
    /// reference it (ON DELETE RESTRICT); callers should check first.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM food_items WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::test_support::memory_db;

    fn banana() -> FoodItemCreate {
        FoodItemCreate {
            name: "Banana".to_string(),
            brand: None,
            category: Some("Fruits".to_string()),
            serving_size: 1.0,
            serving_unit: "count".to_string(),
            calories: 89.0,
            protein: 1.1,
            carbs: 22.8,
            fat: 0.3,
            fiber: 2.6,
            sugar: 12.2,
            sodium: 1.0,
            notes: None,
        }
    }

    #[test]
    fn test_create_and_search() {
        let conn = memory_db();
        let item = FoodItem::create(&conn, &banana()).unwrap();
        assert_eq!(item.nutrition.calories, 89.0);

        let hits = FoodItem::search(&conn, "ban", 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Banana");

        assert!(FoodItem::search(&conn, "tofu", 20).unwrap().is_empty());
    }

    #[test]
    fn test_partial_update() {
        let conn = memory_db();
        let item = FoodItem::create(&conn, &banana()).unwrap();

        let updated = FoodItem::update(
            &conn,
            item.id,
            &FoodItemUpdate {
                calories: Some(95.0),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.nutrition.calories, 95.0);
        // untouched fields survive
        assert_eq!(updated.nutrition.carbs, 22.8);
        assert_eq!(updated.category.as_deref(), Some("Fruits"));
    }

    #[test]
    fn test_list_by_category() {
        let conn = memory_db();
        FoodItem::create(&conn, &banana()).unwrap();
        let mut oats = banana();
        oats.name = "Oats".to_string();
        oats.category = Some("Cereals".to_string());
        FoodItem::create(&conn, &oats).unwrap();

        let fruits = FoodItem::list(&conn, Some("Fruits"), "name", "asc", 50, 0).unwrap();
        assert_eq!(fruits.len(), 1);
        assert_eq!(FoodItem::count(&conn, None).unwrap(), 2);
    }
}
