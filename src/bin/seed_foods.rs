//! Utility to seed the starter food catalog into the database

use std::path::PathBuf;

fn get_database_path() -> PathBuf {
    std::env::var("NUTRACK_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            std::fs::create_dir_all(&path).ok();
            path.push("nutrack.db");
            path
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_database_path();
    println!("Database path: {}", db_path.display());

    let database = nutrack::db::Database::new(&db_path)?;

    // Run migrations
    database.with_conn(|conn| {
        nutrack::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    // Seed the catalog (no-op if foods already exist)
    let added = nutrack::tools::food_items::seed_starter_catalog(&database)?;
    if added == 0 {
        println!("Catalog already populated; nothing to do");
    } else {
        println!("Seeded {} foods:", added);
        for food in nutrack::tools::food_items::starter_catalog() {
            println!(
                "  {} ({:.0} kcal per {} {})",
                food.name, food.calories, food.serving_size, food.serving_unit
            );
        }
    }

    Ok(())
}
