//! Report generation tools
//!
//! Generate a PDF progress report with weight and calorie trend charts
//! and per-day statistics.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::{Datelike, NaiveDate, Weekday};
use printpdf::image_crate::{DynamicImage, ImageFormat, RgbImage};
use printpdf::*;
use serde::Serialize;

use crate::db::Database;
use crate::models::{Day, MealEntry, Profile, WeightEntry};

// ============================================================================
// Color Constants (RGB 0-255)
// ============================================================================

const COLOR_TITLE: (u8, u8, u8) = (16, 185, 129); // App green
const COLOR_WEIGHT: (u8, u8, u8) = (59, 130, 246); // Blue
const COLOR_CALORIES: (u8, u8, u8) = (245, 158, 11); // Amber
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_GRAY: (u8, u8, u8) = (128, 128, 128);
const COLOR_OVER: (u8, u8, u8) = (239, 68, 68); // Red for over-target days

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub success: bool,
    pub file_path: String,
    pub days_analyzed: i64,
    pub weight_readings: i64,
    pub date_range: String,
    pub message: String,
}

// ============================================================================
// Daily Statistics Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DailyRow {
    pub date: String,
    pub day_of_week: String,
    pub meal_count: i64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub weight_kg: Option<f64>,
}

fn day_of_week_abbrev(date: &NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Collect per-day rows for the report, oldest first
fn collect_daily_rows(
    db: &Database,
    start_date: &str,
    end_date: &str,
) -> Result<Vec<DailyRow>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let mut days = Day::list(&conn, Some(start_date), Some(end_date), 1000, 0)
        .map_err(|e| format!("Failed to list days: {}", e))?;
    days.reverse(); // list returns newest first

    let mut rows = Vec::new();
    for day in days {
        let entries = MealEntry::get_for_day(&conn, day.id)
            .map_err(|e| format!("Failed to get meal entries: {}", e))?;
        let weight = WeightEntry::get_by_date(&conn, &day.date)
            .map_err(|e| format!("Failed to get weight: {}", e))?;

        let parsed = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d").ok();
        let day_of_week = parsed.map(|d| day_of_week_abbrev(&d)).unwrap_or("---");

        rows.push(DailyRow {
            date: day.date.clone(),
            day_of_week: day_of_week.to_string(),
            meal_count: entries.len() as i64,
            calories: day.cached_nutrition.calories,
            protein: day.cached_nutrition.protein,
            carbs: day.cached_nutrition.carbs,
            fat: day.cached_nutrition.fat,
            weight_kg: weight.map(|w| w.weight_kg),
        });
    }

    Ok(rows)
}

// ============================================================================
// Chart Generation (plotters)
// ============================================================================

/// Render an RGB plotters buffer into PNG bytes
fn buffer_to_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, String> {
    let img = RgbImage::from_raw(width, height, buffer)
        .ok_or("Failed to create image from buffer")?;

    let mut png_bytes = Vec::new();
    let dyn_img = DynamicImage::ImageRgb8(img);
    dyn_img
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(png_bytes)
}

/// Generate a weight trend chart as PNG bytes
pub fn generate_weight_chart(
    weights: &[WeightEntry],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;

    if weights.is_empty() {
        return Err("No weight data to chart".to_string());
    }

    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let y_min = weights
            .iter()
            .map(|w| w.weight_kg)
            .fold(f64::INFINITY, f64::min)
            - 1.0;
        let y_max = weights
            .iter()
            .map(|w| w.weight_kg)
            .fold(f64::NEG_INFINITY, f64::max)
            + 1.0;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0..(weights.len() as i32), y_min..y_max)
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .x_labels(weights.len().min(10))
            .x_label_formatter(&|x| {
                if *x >= 0 && (*x as usize) < weights.len() {
                    let date = &weights[*x as usize].date;
                    date.split('-').skip(1).collect::<Vec<_>>().join("/")
                } else {
                    String::new()
                }
            })
            .y_desc("kg")
            .draw()
            .map_err(|e| e.to_string())?;

        let weight_points: Vec<(i32, f64)> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| (i as i32, w.weight_kg))
            .collect();

        let line_color = RGBColor(COLOR_WEIGHT.0, COLOR_WEIGHT.1, COLOR_WEIGHT.2);

        chart
            .draw_series(LineSeries::new(weight_points.clone(), line_color.stroke_width(2)))
            .map_err(|e| e.to_string())?
            .label("Weight")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], line_color.stroke_width(2))
            });

        chart
            .draw_series(
                weight_points
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), 3, line_color.filled())),
            )
            .map_err(|e| e.to_string())?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }

    buffer_to_png(buffer, width, height)
}

/// Generate a daily calorie chart as PNG bytes, with an optional target line
pub fn generate_calorie_chart(
    rows: &[DailyRow],
    target_calories: Option<i64>,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;

    if rows.is_empty() {
        return Err("No calorie data to chart".to_string());
    }

    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let data_max = rows.iter().map(|r| r.calories).fold(f64::NEG_INFINITY, f64::max);
        let y_max = data_max.max(target_calories.unwrap_or(0) as f64) * 1.1 + 100.0;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..(rows.len() as i32), 0.0..y_max)
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .x_labels(rows.len().min(10))
            .x_label_formatter(&|x| {
                if *x >= 0 && (*x as usize) < rows.len() {
                    let date = &rows[*x as usize].date;
                    date.split('-').skip(1).collect::<Vec<_>>().join("/")
                } else {
                    String::new()
                }
            })
            .y_desc("kcal")
            .draw()
            .map_err(|e| e.to_string())?;

        // Target reference line
        if let Some(target) = target_calories {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(0, target as f64), (rows.len() as i32, target as f64)],
                    ShapeStyle::from(&RGBColor(COLOR_TITLE.0, COLOR_TITLE.1, COLOR_TITLE.2).mix(0.6))
                        .stroke_width(1),
                )))
                .map_err(|e| e.to_string())?
                .label("Daily target")
                .legend(|(x, y)| {
                    PathElement::new(
                        vec![(x, y), (x + 20, y)],
                        RGBColor(COLOR_TITLE.0, COLOR_TITLE.1, COLOR_TITLE.2).stroke_width(1),
                    )
                });
        }

        let calorie_points: Vec<(i32, f64)> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (i as i32, r.calories))
            .collect();

        let line_color = RGBColor(COLOR_CALORIES.0, COLOR_CALORIES.1, COLOR_CALORIES.2);

        chart
            .draw_series(LineSeries::new(calorie_points.clone(), line_color.stroke_width(2)))
            .map_err(|e| e.to_string())?
            .label("Calories eaten")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], line_color.stroke_width(2))
            });

        chart
            .draw_series(
                calorie_points
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), 3, line_color.filled())),
            )
            .map_err(|e| e.to_string())?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }

    buffer_to_png(buffer, width, height)
}

// ============================================================================
// PDF Generation Helper Functions
// ============================================================================

fn rgb_to_printpdf(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn add_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    x: Mm,
    y: Mm,
    size: f32,
    color: (u8, u8, u8),
) {
    layer.set_fill_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.use_text(text, size, x, y, font);
}

fn add_line(
    layer: &PdfLayerReference,
    x1: Mm,
    y1: Mm,
    x2: Mm,
    y2: Mm,
    color: (u8, u8, u8),
    width: f32,
) {
    layer.set_outline_color(rgb_to_printpdf(color.0, color.1, color.2));
    layer.set_outline_thickness(width);

    let line = Line {
        points: vec![(Point::new(x1, y1), false), (Point::new(x2, y2), false)],
        is_closed: false,
    };
    layer.add_line(line);
}

/// Embed a chart PNG onto a layer at the given position
fn add_chart(
    layer: &PdfLayerReference,
    png_bytes: &[u8],
    x: Mm,
    y: Mm,
) -> Result<(), String> {
    let dynamic_image =
        printpdf::image_crate::load_from_memory(png_bytes).map_err(|e| e.to_string())?;
    let pdf_image = Image::from_dynamic_image(&dynamic_image);

    let transform = ImageTransform {
        translate_x: Some(x),
        translate_y: Some(y),
        dpi: Some(120.0),
        ..Default::default()
    };

    pdf_image.add_to_layer(layer.clone(), transform);
    Ok(())
}

// ============================================================================
// Progress Report Generation
// ============================================================================

/// Generate the nutrition progress PDF report
pub fn generate_progress_report(
    db: &Database,
    start_date: &str,
    end_date: &str,
    output_path: &str,
) -> Result<GenerateReportResponse, String> {
    for date in [start_date, end_date] {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date (expected YYYY-MM-DD): {}", date))?;
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = Profile::get(&conn).map_err(|e| format!("Failed to load profile: {}", e))?;
    let weights = WeightEntry::list(&conn, Some(start_date), Some(end_date), 1000)
        .map_err(|e| format!("Failed to list weights: {}", e))?;
    drop(conn);

    let rows = collect_daily_rows(db, start_date, end_date)?;
    if rows.is_empty() && weights.is_empty() {
        return Err(format!(
            "Nothing logged between {} and {}",
            start_date, end_date
        ));
    }

    let days_analyzed = rows.len() as i64;
    let target = profile.as_ref().and_then(|p| p.target);

    // Summary numbers
    let days_with_meals: Vec<&DailyRow> = rows.iter().filter(|r| r.meal_count > 0).collect();
    let average_calories = if days_with_meals.is_empty() {
        0.0
    } else {
        days_with_meals.iter().map(|r| r.calories).sum::<f64>() / days_with_meals.len() as f64
    };
    let total_meals: i64 = rows.iter().map(|r| r.meal_count).sum();

    // Adherence: days within 10% of the calorie target
    let adherent_days = target.map(|t| {
        let target = t.daily_calories as f64;
        days_with_meals
            .iter()
            .filter(|r| (r.calories - target).abs() <= target * 0.10)
            .count()
    });

    let weight_change = match (weights.first(), weights.last()) {
        (Some(first), Some(last)) if weights.len() > 1 => Some(last.weight_kg - first.weight_kg),
        _ => None,
    };

    // Create PDF - Page 1 Portrait
    let (doc, page1, layer1) = PdfDocument::new(
        "Nutrition Progress Report",
        Mm(215.9), // Letter width
        Mm(279.4), // Letter height
        "Layer 1",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| e.to_string())?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| e.to_string())?;

    let layer = doc.get_page(page1).get_layer(layer1);

    let page_height = 279.4;
    let margin_left = 15.0;
    let mut y = page_height - 20.0;

    // Title
    add_text(&layer, &font_bold, "Nutrition Progress Report", Mm(margin_left), Mm(y), 18.0, COLOR_TITLE);
    y -= 10.0;

    // Profile header
    if let Some(ref profile) = profile {
        add_text(&layer, &font, &format!("Name: {}", profile.name), Mm(margin_left), Mm(y), 11.0, COLOR_BLACK);
        if let Some(goal) = profile.goal {
            add_text(&layer, &font, &format!("Goal: {}", goal.as_str()), Mm(120.0), Mm(y), 11.0, COLOR_BLACK);
        }
        y -= 6.0;
    }

    add_text(&layer, &font, &format!("Report Period: {} to {}", start_date, end_date), Mm(margin_left), Mm(y), 11.0, COLOR_BLACK);
    let now = chrono::Local::now().format("%Y-%m-%d").to_string();
    add_text(&layer, &font, &format!("Generated: {}", now), Mm(120.0), Mm(y), 11.0, COLOR_BLACK);
    y -= 10.0;

    add_line(&layer, Mm(margin_left), Mm(y), Mm(200.0), Mm(y), COLOR_GRAY, 0.5);
    y -= 8.0;

    // Summary section
    add_text(&layer, &font_bold, "Summary", Mm(margin_left), Mm(y), 12.0, COLOR_BLACK);
    y -= 7.0;

    add_text(&layer, &font, &format!("Days Tracked: {}", days_analyzed), Mm(margin_left), Mm(y), 10.0, COLOR_BLACK);
    add_text(&layer, &font, &format!("Meals Logged: {}", total_meals), Mm(80.0), Mm(y), 10.0, COLOR_BLACK);
    y -= 6.0;

    add_text(&layer, &font, &format!("Average Calories: {:.0} kcal/day", average_calories), Mm(margin_left), Mm(y), 10.0, COLOR_BLACK);
    if let Some(t) = target {
        add_text(&layer, &font, &format!("Daily Target: {} kcal", t.daily_calories), Mm(80.0), Mm(y), 10.0, COLOR_BLACK);
    }
    y -= 6.0;

    if let Some(adherent) = adherent_days {
        add_text(
            &layer,
            &font,
            &format!(
                "Days within 10% of target: {} of {}",
                adherent,
                days_with_meals.len()
            ),
            Mm(margin_left),
            Mm(y),
            10.0,
            COLOR_BLACK,
        );
        y -= 6.0;
    }

    match (weights.first(), weights.last(), weight_change) {
        (Some(first), Some(last), Some(change)) => {
            add_text(
                &layer,
                &font,
                &format!(
                    "Weight: {:.1} kg -> {:.1} kg ({:+.1} kg)",
                    first.weight_kg, last.weight_kg, change
                ),
                Mm(margin_left),
                Mm(y),
                10.0,
                COLOR_BLACK,
            );
            y -= 6.0;
        }
        (Some(only), _, None) => {
            add_text(&layer, &font, &format!("Weight: {:.1} kg", only.weight_kg), Mm(margin_left), Mm(y), 10.0, COLOR_BLACK);
            y -= 6.0;
        }
        _ => {}
    }
    y -= 6.0;

    // Daily table
    add_text(&layer, &font_bold, "Daily Log", Mm(margin_left), Mm(y), 12.0, COLOR_BLACK);
    y -= 7.0;

    let col_widths = [24.0, 14.0, 16.0, 24.0, 24.0, 24.0, 22.0, 22.0];
    let headers = ["Date", "Day", "Meals", "Calories", "Protein", "Carbs", "Fat", "Weight"];

    let mut col_x = margin_left;
    for (i, header) in headers.iter().enumerate() {
        add_text(&layer, &font_bold, header, Mm(col_x), Mm(y), 8.0, COLOR_BLACK);
        col_x += col_widths[i];
    }
    y -= 5.0;

    for row in rows.iter() {
        col_x = margin_left;

        // Highlight days that blew past the target
        let calorie_color = match target {
            Some(t) if row.calories > t.daily_calories as f64 * 1.10 => COLOR_OVER,
            _ => COLOR_BLACK,
        };

        let values = [
            row.date.clone(),
            row.day_of_week.clone(),
            row.meal_count.to_string(),
            format!("{:.0}", row.calories),
            format!("{:.0} g", row.protein),
            format!("{:.0} g", row.carbs),
            format!("{:.0} g", row.fat),
            row.weight_kg
                .map(|w| format!("{:.1} kg", w))
                .unwrap_or_else(|| "-".to_string()),
        ];

        for (i, value) in values.iter().enumerate() {
            let color = if i == 3 { calorie_color } else { COLOR_BLACK };
            add_text(&layer, &font, value, Mm(col_x), Mm(y), 7.0, color);
            col_x += col_widths[i];
        }
        y -= 4.5;
    }

    // ========================================================================
    // Page 2 - Landscape for Charts
    // ========================================================================
    let (page2, layer2) = doc.add_page(Mm(279.4), Mm(215.9), "Chart Page"); // Landscape
    let layer2 = doc.get_page(page2).get_layer(layer2);

    let landscape_height = 215.9;
    let margin_left_p2 = 15.0;
    let mut y2 = landscape_height - 20.0;

    add_text(&layer2, &font_bold, "Weight Trend", Mm(margin_left_p2), Mm(y2), 14.0, COLOR_WEIGHT);
    y2 -= 8.0;

    match generate_weight_chart(&weights, 1000, 320) {
        Ok(png_bytes) => {
            // 1000x320 pixels at 120 DPI = ~212mm x 68mm
            add_chart(&layer2, &png_bytes, Mm(margin_left_p2), Mm(y2 - 70.0))?;
            y2 -= 78.0;
        }
        Err(e) => {
            add_text(&layer2, &font, &format!("No weight chart: {}", e), Mm(margin_left_p2), Mm(y2 - 6.0), 9.0, COLOR_GRAY);
            y2 -= 14.0;
        }
    }

    add_text(&layer2, &font_bold, "Daily Calories", Mm(margin_left_p2), Mm(y2), 14.0, COLOR_CALORIES);
    y2 -= 8.0;

    match generate_calorie_chart(&rows, target.map(|t| t.daily_calories), 1000, 320) {
        Ok(png_bytes) => {
            add_chart(&layer2, &png_bytes, Mm(margin_left_p2), Mm(y2 - 70.0))?;
        }
        Err(e) => {
            add_text(&layer2, &font, &format!("No calorie chart: {}", e), Mm(margin_left_p2), Mm(y2 - 6.0), 9.0, COLOR_GRAY);
        }
    }

    // Save PDF
    let path = Path::new(output_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    let file = File::create(path).map_err(|e| e.to_string())?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer).map_err(|e| e.to_string())?;

    Ok(GenerateReportResponse {
        success: true,
        file_path: output_path.to_string(),
        days_analyzed,
        weight_readings: weights.len() as i64,
        date_range: format!("{} to {}", start_date, end_date),
        message: format!(
            "Progress report generated with {} days and {} weight readings",
            days_analyzed,
            weights.len()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::tools::days::log_meal;
    use crate::tools::food_items::seed_starter_catalog;
    use crate::tools::progress::log_weight;

    fn test_db(name: &str) -> Database {
        let db = Database::new_in_memory(name).unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    #[test]
    fn test_daily_rows_join_weights() {
        let db = test_db("reports_rows");
        seed_starter_catalog(&db).unwrap();
        let banana = crate::tools::food_items::search_foods(&db, "banana", 5)
            .unwrap()
            .results[0]
            .id;

        log_meal(&db, "2026-08-01", "breakfast", banana, 1.0, None).unwrap();
        log_meal(&db, "2026-08-02", "breakfast", banana, 2.0, None).unwrap();
        log_weight(&db, "2026-08-01", 80.0, None).unwrap();

        let rows = collect_daily_rows(&db, "2026-08-01", "2026-08-07").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2026-08-01");
        assert_eq!(rows[0].weight_kg, Some(80.0));
        assert_eq!(rows[1].weight_kg, None);
        assert!((rows[1].calories - 178.0).abs() < 1e-9);
    }

    #[test]
    fn test_charts_render_png() {
        let db = test_db("reports_charts");
        log_weight(&db, "2026-08-01", 80.0, None).unwrap();
        log_weight(&db, "2026-08-03", 79.2, None).unwrap();

        let conn = db.get_conn().unwrap();
        let weights = WeightEntry::list(&conn, None, None, 100).unwrap();

        let png = generate_weight_chart(&weights, 400, 200).unwrap();
        // PNG magic bytes
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n".as_slice());
    }

    #[test]
    fn test_empty_range_is_an_error() {
        let db = test_db("reports_empty");
        let err = generate_progress_report(&db, "2026-08-01", "2026-08-07", "/tmp/x.pdf")
            .unwrap_err();
        assert!(err.contains("Nothing logged"));
    }
}
