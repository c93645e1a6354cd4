//! Nutrack MCP Server Implementation
//!
//! Implements the MCP server with all Nutrack tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{FoodItemCreate, FoodItemUpdate};
use crate::tools::profile::{ProfileEdit, Session};
use crate::tools::status::StatusTracker;
use crate::tools::{chat, days, food_items, profile, progress, reminders, reports, scanner, share};

/// Nutrack MCP Service
#[derive(Clone)]
pub struct NutrackService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    /// Session state for the signed-in user; loaded at startup,
    /// cleared on sign_out
    session: Arc<std::sync::Mutex<Session>>,
    tool_router: ToolRouter<NutrackService>,
}

impl NutrackService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        let mut session = Session::new();
        if let Err(e) = session.load(&database) {
            tracing::warn!("could not load stored profile into session: {}", e);
        }

        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            session: Arc::new(std::sync::Mutex::new(session)),
            tool_router: Self::tool_router(),
        }
    }

    fn json_result<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    fn not_found(kind: &str, key: impl std::fmt::Display) -> Result<CallToolResult, McpError> {
        let json = format!(r#"{{"error": "{} not found", "key": "{}"}}"#, kind, key);
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

// ============================================================================
// Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SignInParams {
    /// Email address identifying the user
    pub email: String,
    /// Display name
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CompleteOnboardingParams {
    /// Age in years (> 0)
    pub age: u32,
    /// Body weight in kilograms (> 0)
    pub weight_kg: f64,
    /// Height in centimeters (> 0)
    pub height_cm: f64,
    /// Activity level: sedentary, light, moderate, active, very_active
    pub activity_level: String,
    /// Weight goal: lose, maintain, gain
    pub goal: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProfileParams {
    /// New display name (optional)
    pub name: Option<String>,
    /// New email (optional)
    pub email: Option<String>,
    /// New age in years (optional; recomputes targets)
    pub age: Option<u32>,
    /// New weight in kg (optional; recomputes targets)
    pub weight_kg: Option<f64>,
    /// New height in cm (optional; recomputes targets)
    pub height_cm: Option<f64>,
    /// New activity level (optional; recomputes targets)
    pub activity_level: Option<String>,
    /// New goal (optional; recomputes targets)
    pub goal: Option<String>,
}

// ============================================================================
// Food Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddFoodParams {
    pub name: String,
    pub brand: Option<String>,
    /// Category such as "Fruits" or "Proteins"
    pub category: Option<String>,
    /// Serving size, e.g. 100.0
    pub serving_size: f64,
    /// Serving unit, e.g. "g", "ml", "count"
    pub serving_unit: String,
    /// Calories per serving
    pub calories: f64,
    /// Protein grams per serving
    pub protein: f64,
    /// Carb grams per serving
    pub carbs: f64,
    /// Fat grams per serving
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    #[serde(default)]
    pub sodium: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetFoodParams {
    /// Food item ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchFoodsParams {
    /// Search query (minimum 2 characters)
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListFoodsParams {
    /// Filter by category (optional)
    pub category: Option<String>,
    /// Sort by: name, created_at, or calories (default name)
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// Sort order: asc or desc (default asc)
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination
    #[serde(default)]
    pub offset: i64,
}

fn default_sort_by() -> String {
    "name".to_string()
}
fn default_sort_order() -> String {
    "asc".to_string()
}
fn default_list_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateFoodParams {
    /// Food item ID to update
    pub id: i64,
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

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteFoodParams {
    /// Food item ID to delete
    pub id: i64,
}

// ============================================================================
// Day and Meal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
    /// Meal type: breakfast, lunch, dinner, or snack
    pub meal_type: String,
    /// Food item ID to log
    pub food_id: i64,
    /// Servings of the food item consumed (default 1.0)
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    /// Optional notes
    pub notes: Option<String>,
}

fn default_quantity() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDayParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListDaysParams {
    /// Start date (inclusive) - optional
    pub start_date: Option<String>,
    /// End date (inclusive) - optional
    pub end_date: Option<String>,
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateDayParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
    /// Notes for the day
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetMealEntryParams {
    /// Meal entry ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateMealEntryParams {
    /// Meal entry ID
    pub id: i64,
    /// New meal type (optional)
    pub meal_type: Option<String>,
    /// New quantity in servings (optional)
    pub quantity: Option<f64>,
    /// New notes (optional)
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteMealEntryParams {
    /// Meal entry ID
    pub id: i64,
}

// ============================================================================
// Progress Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogWeightParams {
    /// Date in ISO format: YYYY-MM-DD (same-date logs replace)
    pub date: String,
    /// Body weight in kilograms (> 0)
    pub weight_kg: f64,
    /// Optional notes
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListWeightsParams {
    /// Start date (inclusive) - optional
    pub start_date: Option<String>,
    /// End date (inclusive) - optional
    pub end_date: Option<String>,
    /// Maximum results (default 100)
    #[serde(default = "default_weights_limit")]
    pub limit: i64,
}

fn default_weights_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteWeightParams {
    /// Date of the reading to delete: YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProgressSeriesParams {
    /// Start date (inclusive): YYYY-MM-DD
    pub start_date: String,
    /// End date (inclusive): YYYY-MM-DD
    pub end_date: String,
}

// ============================================================================
// Chat and Scanner Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SendChatParams {
    /// The user's message to the assistant
    pub message: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ChatHistoryParams {
    /// Maximum messages to return (default 50)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScanFoodPhotoParams {
    /// Path to the photo file to analyze
    pub photo_path: String,
}

// ============================================================================
// Reminder Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScheduleReminderParams {
    /// Reminder title
    pub title: String,
    /// Notification body text
    pub body: String,
    /// Time of day, "HH:MM" 24h
    pub time: String,
    /// Kind: meal, water, exercise, or custom
    pub kind: String,
    /// Start enabled (default true)
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRemindersParams {
    /// Filter by kind (optional)
    pub kind: Option<String>,
    /// Only enabled reminders (default false)
    #[serde(default)]
    pub enabled_only: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateReminderParams {
    /// Reminder ID
    pub id: i64,
    pub title: Option<String>,
    pub body: Option<String>,
    /// New time, "HH:MM" 24h (optional)
    pub time: Option<String>,
    /// New kind (optional)
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetReminderEnabledParams {
    /// Reminder ID
    pub id: i64,
    /// New enabled state
    pub enabled: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteReminderParams {
    /// Reminder ID
    pub id: i64,
}

// ============================================================================
// Share and Report Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ShareDateParams {
    /// Date the share text covers: YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateReportParams {
    /// Start date (inclusive): YYYY-MM-DD
    pub start_date: String,
    /// End date (inclusive): YYYY-MM-DD
    pub end_date: String,
    /// Where to write the PDF file
    pub output_path: String,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl NutrackService {
    // --- Status ---

    #[tool(description = "Get the current status of the Nutrack service including build info, database status, and row counts")]
    async fn nutrack_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        Self::json_result(&status)
    }

    #[tool(description = "Get step-by-step instructions for signing in and completing onboarding. Call this before setting up a new user.")]
    fn onboarding_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::ONBOARDING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(
            ONBOARDING_INSTRUCTIONS,
        )]))
    }

    #[tool(description = "Get step-by-step instructions for logging meals and reading daily summaries. Call this when starting a food logging session.")]
    fn logging_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::LOGGING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(
            LOGGING_INSTRUCTIONS,
        )]))
    }

    // --- Profile & Session ---

    #[tool(description = "Sign in with email and name, loading any stored profile. A new email replaces the stored single-user profile.")]
    fn sign_in(&self, Parameters(p): Parameters<SignInParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().unwrap();
        let result = profile::sign_in(&self.database, &mut session, &p.email, &p.name)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Sign out: clear the session and remove the stored profile")]
    fn sign_out(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().unwrap();
        let result = profile::sign_out(&self.database, &mut session)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Get the stored profile with its computed daily energy targets")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().unwrap();
        let result = profile::get_profile(&self.database, &mut session)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(response) => Self::json_result(&response),
            None => Self::not_found("Profile", "sign_in first"),
        }
    }

    #[tool(description = "Complete onboarding: store body metrics and compute the daily calorie target and macro split. Fails without storing anything if any input is invalid.")]
    fn complete_onboarding(
        &self,
        Parameters(p): Parameters<CompleteOnboardingParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().unwrap();
        let result = profile::complete_onboarding(
            &self.database,
            &mut session,
            p.age,
            p.weight_kg,
            p.height_cm,
            &p.activity_level,
            &p.goal,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Update the profile. Changing any body metric (age, weight, height, activity level, goal) recomputes the energy targets from scratch.")]
    fn update_profile(
        &self,
        Parameters(p): Parameters<UpdateProfileParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().unwrap();
        let edit = ProfileEdit {
            name: p.name,
            email: p.email,
            age: p.age,
            weight_kg: p.weight_kg,
            height_cm: p.height_cm,
            activity_level: p.activity_level,
            goal: p.goal,
        };
        let result = profile::update_profile(&self.database, &mut session, edit)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    // --- Food Catalog ---

    #[tool(description = "Add a food item with per-serving nutritional information")]
    fn add_food(&self, Parameters(p): Parameters<AddFoodParams>) -> Result<CallToolResult, McpError> {
        let data = FoodItemCreate {
            name: p.name,
            brand: p.brand,
            category: p.category,
            serving_size: p.serving_size,
            serving_unit: p.serving_unit,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
            fiber: p.fiber,
            sugar: p.sugar,
            sodium: p.sodium,
            notes: p.notes,
        };
        let result = food_items::add_food(&self.database, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Get full details for a food item")]
    fn get_food(&self, Parameters(p): Parameters<GetFoodParams>) -> Result<CallToolResult, McpError> {
        let result = food_items::get_food(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(food) => Self::json_result(&food),
            None => Self::not_found("Food", p.id),
        }
    }

    #[tool(description = "Search food items by name or brand (case-insensitive, minimum 2 characters)")]
    fn search_foods(
        &self,
        Parameters(p): Parameters<SearchFoodsParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = food_items::search_foods(&self.database, &p.query, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "List food items with optional category filter, sorting, and pagination")]
    fn list_foods(
        &self,
        Parameters(p): Parameters<ListFoodsParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = food_items::list_foods(
            &self.database,
            p.category.as_deref(),
            &p.sort_by,
            &p.sort_order,
            p.limit,
            p.offset,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Update a food item. Days that logged this food are recalculated automatically.")]
    fn update_food(
        &self,
        Parameters(p): Parameters<UpdateFoodParams>,
    ) -> Result<CallToolResult, McpError> {
        let data = FoodItemUpdate {
            name: p.name,
            brand: p.brand,
            category: p.category,
            serving_size: p.serving_size,
            serving_unit: p.serving_unit,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
            fiber: p.fiber,
            sugar: p.sugar,
            sodium: p.sodium,
            notes: p.notes,
        };
        let result = food_items::update_food(&self.database, p.id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(response) => Self::json_result(&response),
            None => Self::not_found("Food", p.id),
        }
    }

    #[tool(description = "Delete a food item (refused while meal entries still reference it)")]
    fn delete_food(
        &self,
        Parameters(p): Parameters<DeleteFoodParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = food_items::delete_food(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Seed the starter food catalog into an empty database")]
    fn seed_food_catalog(&self) -> Result<CallToolResult, McpError> {
        let added = food_items::seed_starter_catalog(&self.database)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&serde_json::json!({ "added": added }))
    }

    // --- Meals & Days ---

    #[tool(description = "Log a meal: a food item and quantity attached to a date and meal type. Creates the day if needed and returns the new day total.")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let result = days::log_meal(
            &self.database,
            &p.date,
            &p.meal_type,
            p.food_id,
            p.quantity,
            p.notes,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Get a day with meals grouped by type and the nutrition total")]
    fn get_day(&self, Parameters(p): Parameters<GetDayParams>) -> Result<CallToolResult, McpError> {
        let result =
            days::get_day(&self.database, &p.date).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(day) => Self::json_result(&day),
            None => Self::not_found("Day", &p.date),
        }
    }

    #[tool(description = "List day summaries with optional date range, newest first")]
    fn list_days(
        &self,
        Parameters(p): Parameters<ListDaysParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = days::list_days(
            &self.database,
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            p.limit,
            p.offset,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Update a day's notes")]
    fn update_day(
        &self,
        Parameters(p): Parameters<UpdateDayParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = days::update_day(&self.database, &p.date, p.notes)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(day) => Self::json_result(&day),
            None => Self::not_found("Day", &p.date),
        }
    }

    #[tool(description = "Delete a day and everything logged on it")]
    fn delete_day(
        &self,
        Parameters(p): Parameters<GetDayParams>,
    ) -> Result<CallToolResult, McpError> {
        let deleted = days::delete_day(&self.database, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&serde_json::json!({ "deleted": deleted }))
    }

    #[tool(description = "Get a meal entry by ID with its food and day details")]
    fn get_meal_entry(
        &self,
        Parameters(p): Parameters<GetMealEntryParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = days::get_meal_entry(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(entry) => Self::json_result(&entry),
            None => Self::not_found("Meal entry", p.id),
        }
    }

    #[tool(description = "Update a meal entry; changing the quantity rescales its nutrition and the day total")]
    fn update_meal_entry(
        &self,
        Parameters(p): Parameters<UpdateMealEntryParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = days::update_meal_entry(
            &self.database,
            p.id,
            p.meal_type.as_deref(),
            p.quantity,
            p.notes,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(entry) => Self::json_result(&entry),
            None => Self::not_found("Meal entry", p.id),
        }
    }

    #[tool(description = "Delete a meal entry and refresh the day total")]
    fn delete_meal_entry(
        &self,
        Parameters(p): Parameters<DeleteMealEntryParams>,
    ) -> Result<CallToolResult, McpError> {
        let deleted = days::delete_meal_entry(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&serde_json::json!({ "deleted": deleted }))
    }

    #[tool(description = "Force a day's cached totals to be recomputed from its meal entries")]
    fn recalculate_day(
        &self,
        Parameters(p): Parameters<GetDayParams>,
    ) -> Result<CallToolResult, McpError> {
        let nutrition = days::recalculate_day(&self.database, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&nutrition)
    }

    #[tool(description = "Get the dashboard for a date: calories and macros consumed vs. the profile targets")]
    fn get_dashboard(
        &self,
        Parameters(p): Parameters<GetDayParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = days::get_dashboard(&self.database, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    // --- Progress ---

    #[tool(description = "Record a body weight reading for a date (same-date logs replace the reading)")]
    fn log_weight(
        &self,
        Parameters(p): Parameters<LogWeightParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = progress::log_weight(&self.database, &p.date, p.weight_kg, p.notes.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "List weight readings in a date range, oldest first")]
    fn list_weights(
        &self,
        Parameters(p): Parameters<ListWeightsParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = progress::list_weights(
            &self.database,
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            p.limit,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Delete the weight reading for a date")]
    fn delete_weight(
        &self,
        Parameters(p): Parameters<DeleteWeightParams>,
    ) -> Result<CallToolResult, McpError> {
        let deleted = progress::delete_weight(&self.database, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&serde_json::json!({ "deleted": deleted }))
    }

    #[tool(description = "Get first/latest weight, total change, and the profile goal")]
    fn get_weight_summary(&self) -> Result<CallToolResult, McpError> {
        let result = progress::weight_summary(&self.database)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Get chart-ready per-day calories, macros, and weight over a date range")]
    fn get_progress_series(
        &self,
        Parameters(p): Parameters<ProgressSeriesParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = progress::get_progress_series(&self.database, &p.start_date, &p.end_date)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    // --- Chat ---

    #[tool(description = "Send a message to the nutrition assistant and get its reply. The exchange is stored in the transcript.")]
    fn send_chat_message(
        &self,
        Parameters(p): Parameters<SendChatParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = chat::send_chat_message(&self.database, &p.message)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Get the assistant transcript (most recent messages, oldest first) and quick-question suggestions")]
    fn get_chat_history(
        &self,
        Parameters(p): Parameters<ChatHistoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = chat::get_chat_history(&self.database, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Clear the assistant transcript")]
    fn clear_chat_history(&self) -> Result<CallToolResult, McpError> {
        let result = chat::clear_chat_history(&self.database)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    // --- Scanner ---

    #[tool(description = "Analyze a food photo (mock recognition: matches the file name against the catalog) and return ranked candidates with confidences")]
    fn scan_food_photo(
        &self,
        Parameters(p): Parameters<ScanFoodPhotoParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = scanner::scan_food_photo(&self.database, &p.photo_path)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    // --- Reminders ---

    #[tool(description = "Schedule a reminder (meal, water, exercise, or custom) at a time of day")]
    fn schedule_reminder(
        &self,
        Parameters(p): Parameters<ScheduleReminderParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = reminders::schedule_reminder(
            &self.database,
            &p.title,
            &p.body,
            &p.time,
            &p.kind,
            p.enabled,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "List reminders ordered by time of day, optionally filtered by kind or enabled state")]
    fn list_reminders(
        &self,
        Parameters(p): Parameters<ListRemindersParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = reminders::list_reminders(&self.database, p.kind.as_deref(), p.enabled_only)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Update a reminder's title, body, time, or kind")]
    fn update_reminder(
        &self,
        Parameters(p): Parameters<UpdateReminderParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = reminders::update_reminder(
            &self.database,
            p.id,
            p.title,
            p.body,
            p.time,
            p.kind.as_deref(),
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(reminder) => Self::json_result(&reminder),
            None => Self::not_found("Reminder", p.id),
        }
    }

    #[tool(description = "Enable or disable a reminder")]
    fn set_reminder_enabled(
        &self,
        Parameters(p): Parameters<SetReminderEnabledParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = reminders::set_reminder_enabled(&self.database, p.id, p.enabled)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(reminder) => Self::json_result(&reminder),
            None => Self::not_found("Reminder", p.id),
        }
    }

    #[tool(description = "Delete a reminder")]
    fn delete_reminder(
        &self,
        Parameters(p): Parameters<DeleteReminderParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = reminders::delete_reminder(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Seed the default meal and hydration reminders into an empty schedule")]
    fn seed_default_reminders(&self) -> Result<CallToolResult, McpError> {
        let result = reminders::seed_default_reminders(&self.database)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    // --- Share & Reports ---

    #[tool(description = "Build share-sheet text summarizing weight progress and today's calories")]
    fn share_progress(
        &self,
        Parameters(p): Parameters<ShareDateParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = share::share_progress(&self.database, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Build share-sheet text listing a day's logged meals with a calorie total")]
    fn share_meal_plan(
        &self,
        Parameters(p): Parameters<ShareDateParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = share::share_meal_plan(&self.database, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Build share-sheet text inviting someone to the app")]
    fn share_invite(&self) -> Result<CallToolResult, McpError> {
        let result =
            share::share_invite(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }

    #[tool(description = "Generate a PDF progress report with weight and calorie trend charts for a date range")]
    fn generate_progress_report(
        &self,
        Parameters(p): Parameters<GenerateReportParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = reports::generate_progress_report(
            &self.database,
            &p.start_date,
            &p.end_date,
            &p.output_path,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        Self::json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for NutrackService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutrack".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Nutrack".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Nutrack - nutrition tracking: profile onboarding with computed energy targets, \
                 food catalog, meal ledger, progress, assistant. \
                 IMPORTANT: Call onboarding_instructions before setting up a user, \
                 logging_instructions before logging food. \
                 Profile: sign_in/sign_out/get_profile/complete_onboarding/update_profile. \
                 Foods: add/get/search/list/update/delete_food, seed_food_catalog. \
                 Meals: log_meal/get_day/list_days/update_day/delete_day, \
                 get/update/delete_meal_entry, recalculate_day, get_dashboard. \
                 Progress: log/list/delete_weight, get_weight_summary, get_progress_series. \
                 Assistant: send_chat_message/get_chat_history/clear_chat_history. \
                 Scanner: scan_food_photo. \
                 Reminders: schedule/list/update/delete_reminder, set_reminder_enabled, \
                 seed_default_reminders. \
                 Sharing: share_progress/share_meal_plan/share_invite, generate_progress_report."
                    .into(),
            ),
        }
    }
}
