//! Data models
//!
//! Rust structs representing database entities.

mod chat_message;
mod day;
mod food_item;
mod meal_entry;
mod nutrition;
mod profile;
mod reminder;
mod weight_entry;

pub use chat_message::{ChatMessage, ChatRole};
pub use day::{Day, DayCreate};
pub use food_item::{FoodItem, FoodItemCreate, FoodItemUpdate};
pub use meal_entry::{
    recalculate_day_nutrition, recalculate_days_for_food_item, MealEntry, MealEntryCreate,
    MealEntryDetail, MealEntryUpdate, MealType,
};
pub use nutrition::Nutrition;
pub use profile::Profile;
pub use reminder::{is_valid_time, Reminder, ReminderCreate, ReminderKind, ReminderUpdate};
pub use weight_entry::WeightEntry;
