//! Utility to set up the profile from the command line
//!
//! Usage: set_profile <email> <name> <age> <weight_kg> <height_cm> <activity_level> <goal>

use std::path::PathBuf;

use nutrack::nutrition::{compute_energy_target, ActivityLevel, BodyMetrics, Goal};

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
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 8 {
        eprintln!(
            "Usage: {} <email> <name> <age> <weight_kg> <height_cm> <activity_level> <goal>",
            args[0]
        );
        eprintln!("  activity_level: sedentary | light | moderate | active | very_active");
        eprintln!("  goal: lose | maintain | gain");
        std::process::exit(2);
    }

    let metrics = BodyMetrics {
        age: args[3].parse()?,
        weight_kg: args[4].parse()?,
        height_cm: args[5].parse()?,
        activity_level: ActivityLevel::parse(&args[6])?,
        goal: Goal::parse(&args[7])?,
    };
    let target = compute_energy_target(&metrics)?;

    let db_path = get_database_path();
    println!("Database path: {}", db_path.display());

    let database = nutrack::db::Database::new(&db_path)?;

    // Run migrations
    database.with_conn(|conn| {
        nutrack::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    // Write the profile with its computed targets
    database.with_conn(|conn| {
        nutrack::models::Profile::sign_in(conn, &args[1], &args[2])?;
        let profile = nutrack::models::Profile::save_metrics(conn, &metrics, &target)?;
        println!("Profile set:");
        println!("  Name: {}", profile.name);
        println!("  Daily calories: {} kcal", target.daily_calories);
        println!(
            "  Macros: {}g protein / {}g carbs / {}g fat",
            target.daily_protein, target.daily_carbs, target.daily_fat
        );
        Ok(())
    })?;

    Ok(())
}
