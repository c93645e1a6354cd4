//! Food Scanner Tools
//!
//! Mock photo recognition. There is no vision model: candidates come
//! from matching words in the photo's file name against the food
//! catalog, with canned confidence values by rank. Deterministic, which
//! the demo flow and the tests both rely on.

use serde::Serialize;

use crate::db::Database;
use crate::models::FoodItem;

/// Confidence assigned to each candidate by rank
const CONFIDENCE_BY_RANK: [f64; 3] = [0.92, 0.78, 0.61];

/// Tokens shorter than this never match ("a", "of", file numbering)
const MIN_TOKEN_LEN: usize = 3;

/// A recognition candidate
#[derive(Debug, Serialize)]
pub struct ScanCandidate {
    pub food: FoodItem,
    pub confidence: f64,
}

/// Response for scan_food_photo
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub photo_path: String,
    pub recognized: bool,
    pub candidates: Vec<ScanCandidate>,
    pub message: String,
}

/// Split a photo path into candidate search tokens.
///
/// "IMG_2031_grilled-chicken.jpg" -> ["img", "grilled", "chicken"]
fn tokenize_photo_path(path: &str) -> Vec<String> {
    let file_name = path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path);
    let stem = file_name.rsplit_once('.').map_or(file_name, |(s, _)| s);

    stem.split(|c: char| !c.is_alphanumeric())
        .map(|t| t.to_lowercase())
        .filter(|t| t.len() >= MIN_TOKEN_LEN && !t.chars().all(|c| c.is_ascii_digit()))
        .collect()
}

/// "Analyze" a food photo by matching its file name against the catalog
pub fn scan_food_photo(db: &Database, photo_path: &str) -> Result<ScanResponse, String> {
    let photo_path = photo_path.trim();
    if photo_path.is_empty() {
        return Err("photo_path must not be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let mut candidates: Vec<ScanCandidate> = Vec::new();
    let mut seen_ids = Vec::new();

    for token in tokenize_photo_path(photo_path) {
        if candidates.len() >= CONFIDENCE_BY_RANK.len() {
            break;
        }

        let matches = FoodItem::search(&conn, &token, 3)
            .map_err(|e| format!("Catalog search failed: {}", e))?;

        for food in matches {
            if candidates.len() >= CONFIDENCE_BY_RANK.len() {
                break;
            }
            if seen_ids.contains(&food.id) {
                continue;
            }
            seen_ids.push(food.id);
            candidates.push(ScanCandidate {
                confidence: CONFIDENCE_BY_RANK[candidates.len()],
                food,
            });
        }
    }

    let recognized = !candidates.is_empty();
    let message = if recognized {
        format!(
            "Recognized {} as {} ({}% confidence)",
            photo_path,
            candidates[0].food.name,
            (candidates[0].confidence * 100.0).round()
        )
    } else {
        format!(
            "Could not recognize a food in {}; try searching the catalog by name",
            photo_path
        )
    };

    Ok(ScanResponse {
        photo_path: photo_path.to_string(),
        recognized,
        candidates,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::tools::food_items::seed_starter_catalog;

    fn test_db(name: &str) -> Database {
        let db = Database::new_in_memory(name).unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    #[test]
    fn test_tokenize_strips_noise() {
        assert_eq!(
            tokenize_photo_path("/photos/IMG_2031_grilled-chicken.jpg"),
            vec!["img", "grilled", "chicken"]
        );
        assert_eq!(tokenize_photo_path("2031_07.jpg"), Vec::<String>::new());
    }

    #[test]
    fn test_matching_photo() {
        let db = test_db("scanner_match");
        seed_starter_catalog(&db).unwrap();

        let response = scan_food_photo(&db, "camera/lunch_grilled_chicken.jpg").unwrap();
        assert!(response.recognized);
        assert_eq!(response.candidates[0].food.name, "Grilled Chicken Breast");
        assert_eq!(response.candidates[0].confidence, 0.92);
    }

    #[test]
    fn test_unknown_photo() {
        let db = test_db("scanner_unknown");
        seed_starter_catalog(&db).unwrap();

        let response = scan_food_photo(&db, "camera/IMG_0001.jpg").unwrap();
        assert!(!response.recognized);
        assert!(response.candidates.is_empty());
        assert!(response.message.contains("Could not recognize"));
    }

    #[test]
    fn test_deterministic() {
        let db = test_db("scanner_det");
        seed_starter_catalog(&db).unwrap();

        let a = scan_food_photo(&db, "banana_bowl.png").unwrap();
        let b = scan_food_photo(&db, "banana_bowl.png").unwrap();
        let names_a: Vec<_> = a.candidates.iter().map(|c| c.food.name.clone()).collect();
        let names_b: Vec<_> = b.candidates.iter().map(|c| c.food.name.clone()).collect();
        assert_eq!(names_a, names_b);
    }
}
