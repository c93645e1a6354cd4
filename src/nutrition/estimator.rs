//! Daily energy and macro estimation
//!
//! Maps body metrics and a goal to a daily calorie target and a fixed
//! percentage macro split. Pure arithmetic: no I/O, no side effects.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calorie share of each macronutrient in the daily target
const PROTEIN_SHARE: f64 = 0.25;
const CARB_SHARE: f64 = 0.45;
const FAT_SHARE: f64 = 0.30;

/// Energy density, kcal per gram
const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

/// Self-reported activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// All levels, ordered from least to most active
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    pub fn parse(s: &str) -> Result<Self, InvalidInput> {
        match s.to_lowercase().as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" => Ok(ActivityLevel::VeryActive),
            other => Err(InvalidInput::UnknownActivityLevel(other.to_string())),
        }
    }

    /// TDEE multiplier applied to BMR
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

/// Weight goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Lose => "lose",
            Goal::Maintain => "maintain",
            Goal::Gain => "gain",
        }
    }

    pub fn parse(s: &str) -> Result<Self, InvalidInput> {
        match s.to_lowercase().as_str() {
            "lose" => Ok(Goal::Lose),
            "maintain" => Ok(Goal::Maintain),
            "gain" => Ok(Goal::Gain),
            other => Err(InvalidInput::UnknownGoal(other.to_string())),
        }
    }

    /// Flat daily calorie offset applied to TDEE
    pub fn offset_kcal(&self) -> f64 {
        match self {
            Goal::Lose => -500.0,
            Goal::Maintain => 0.0,
            Goal::Gain => 500.0,
        }
    }
}

/// Inputs to the energy target computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMetrics {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

/// Daily calorie target and macro split, in whole kcal and grams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyTarget {
    pub daily_calories: i64,
    pub daily_protein: i64, // grams
    pub daily_carbs: i64,   // grams
    pub daily_fat: i64,     // grams
}

/// Rejected estimator input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("{field} must be positive")]
    NonPositive { field: &'static str },

    #[error("unknown activity level: {0}")]
    UnknownActivityLevel(String),

    #[error("unknown goal: {0}")]
    UnknownGoal(String),
}

/// Basal metabolic rate in kcal/day.
///
/// Fixed-coefficient Harris-Benedict estimate. The coefficient set is the
/// variant historically fitted for men; no sex field is collected, so it
/// is applied uniformly to every profile.
fn basal_metabolic_rate(weight_kg: f64, height_cm: f64, age: u32) -> f64 {
    88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age as f64
}

/// Compute the daily energy target for a set of body metrics.
///
/// BMR is scaled by the activity multiplier to get total daily energy
/// expenditure, the goal offset is applied, and the result is split into
/// macros at fixed percentages (25% protein, 45% carbs, 30% fat).
///
/// Deterministic and side-effect free; callers persist the result.
pub fn compute_energy_target(metrics: &BodyMetrics) -> Result<EnergyTarget, InvalidInput> {
    if metrics.age == 0 {
        return Err(InvalidInput::NonPositive { field: "age" });
    }
    if !(metrics.weight_kg > 0.0) || !metrics.weight_kg.is_finite() {
        return Err(InvalidInput::NonPositive { field: "weight" });
    }
    if !(metrics.height_cm > 0.0) || !metrics.height_cm.is_finite() {
        return Err(InvalidInput::NonPositive { field: "height" });
    }

    let bmr = basal_metabolic_rate(metrics.weight_kg, metrics.height_cm, metrics.age);
    let tdee = bmr * metrics.activity_level.multiplier();
    let daily_calories = (tdee + metrics.goal.offset_kcal()).round() as i64;

    // Macros derive from the rounded calorie target, not from TDEE
    let calories = daily_calories as f64;
    Ok(EnergyTarget {
        daily_calories,
        daily_protein: (calories * PROTEIN_SHARE / KCAL_PER_G_PROTEIN).round() as i64,
        daily_carbs: (calories * CARB_SHARE / KCAL_PER_G_CARBS).round() as i64,
        daily_fat: (calories * FAT_SHARE / KCAL_PER_G_FAT).round() as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(
        age: u32,
        weight_kg: f64,
        height_cm: f64,
        activity_level: ActivityLevel,
        goal: Goal,
    ) -> BodyMetrics {
        BodyMetrics {
            age,
            weight_kg,
            height_cm,
            activity_level,
            goal,
        }
    }

    #[test]
    fn test_reference_case() {
        // 30y, 70kg, 175cm, sedentary, maintain
        // BMR = 88.362 + 13.397*70 + 4.799*175 - 5.677*30 = 1695.667
        // TDEE = 1695.667 * 1.2 = 2034.80 -> 2035 kcal
        let target = compute_energy_target(&metrics(
            30,
            70.0,
            175.0,
            ActivityLevel::Sedentary,
            Goal::Maintain,
        ))
        .unwrap();

        assert_eq!(target.daily_calories, 2035);
        assert_eq!(target.daily_protein, 127);
        assert_eq!(target.daily_carbs, 229);
        assert_eq!(target.daily_fat, 68);
    }

    #[test]
    fn test_macro_energy_identity() {
        // protein*4 + carbs*4 + fat*9 stays within rounding distance of
        // the calorie target across a spread of inputs
        for age in [18, 30, 45, 72] {
            for weight in [48.0, 70.0, 95.5, 130.0] {
                for height in [150.0, 175.0, 198.0] {
                    for level in ActivityLevel::ALL {
                        for goal in [Goal::Lose, Goal::Maintain, Goal::Gain] {
                            let t = compute_energy_target(&metrics(age, weight, height, level, goal))
                                .unwrap();
                            let energy =
                                t.daily_protein * 4 + t.daily_carbs * 4 + t.daily_fat * 9;
                            let drift = (energy - t.daily_calories).abs();
                            assert!(
                                drift <= 2,
                                "identity drift {} for {:?}",
                                drift,
                                (age, weight, height, level, goal)
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_weight_increases_calories() {
        let base = metrics(30, 70.0, 175.0, ActivityLevel::Moderate, Goal::Maintain);
        let heavier = BodyMetrics {
            weight_kg: 80.0,
            ..base
        };

        let t1 = compute_energy_target(&base).unwrap();
        let t2 = compute_energy_target(&heavier).unwrap();
        assert!(t2.daily_calories > t1.daily_calories);
    }

    #[test]
    fn test_goal_ordering_exact_offsets() {
        let lose = compute_energy_target(&metrics(30, 70.0, 175.0, ActivityLevel::Light, Goal::Lose))
            .unwrap();
        let maintain =
            compute_energy_target(&metrics(30, 70.0, 175.0, ActivityLevel::Light, Goal::Maintain))
                .unwrap();
        let gain = compute_energy_target(&metrics(30, 70.0, 175.0, ActivityLevel::Light, Goal::Gain))
            .unwrap();

        // The offset is a whole number, so rounding cancels out exactly
        assert_eq!(maintain.daily_calories - lose.daily_calories, 500);
        assert_eq!(gain.daily_calories - maintain.daily_calories, 500);
    }

    #[test]
    fn test_activity_ordering() {
        let mut previous = 0;
        for level in ActivityLevel::ALL {
            let t = compute_energy_target(&metrics(30, 70.0, 175.0, level, Goal::Maintain)).unwrap();
            assert!(
                t.daily_calories > previous,
                "{:?} did not increase calories",
                level
            );
            previous = t.daily_calories;
        }
    }

    #[test]
    fn test_determinism() {
        let m = metrics(42, 81.3, 169.2, ActivityLevel::Active, Goal::Lose);
        assert_eq!(compute_energy_target(&m), compute_energy_target(&m));
    }

    #[test]
    fn test_rejects_non_positive_fields() {
        let ok = metrics(30, 70.0, 175.0, ActivityLevel::Sedentary, Goal::Maintain);

        let zero_age = BodyMetrics { age: 0, ..ok };
        assert_eq!(
            compute_energy_target(&zero_age),
            Err(InvalidInput::NonPositive { field: "age" })
        );

        let negative_weight = BodyMetrics {
            weight_kg: -1.0,
            ..ok
        };
        assert_eq!(
            compute_energy_target(&negative_weight),
            Err(InvalidInput::NonPositive { field: "weight" })
        );

        let zero_height = BodyMetrics {
            height_cm: 0.0,
            ..ok
        };
        assert_eq!(
            compute_energy_target(&zero_height),
            Err(InvalidInput::NonPositive { field: "height" })
        );

        let nan_weight = BodyMetrics {
            weight_kg: f64::NAN,
            ..ok
        };
        assert_eq!(
            compute_energy_target(&nan_weight),
            Err(InvalidInput::NonPositive { field: "weight" })
        );
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!(ActivityLevel::parse("very_active"), Ok(ActivityLevel::VeryActive));
        assert_eq!(ActivityLevel::parse("Moderate"), Ok(ActivityLevel::Moderate));
        assert!(matches!(
            ActivityLevel::parse("athlete"),
            Err(InvalidInput::UnknownActivityLevel(_))
        ));

        assert_eq!(Goal::parse("gain"), Ok(Goal::Gain));
        assert!(matches!(Goal::parse("bulk"), Err(InvalidInput::UnknownGoal(_))));
    }

    #[test]
    fn test_round_trip_enum_strings() {
        for level in ActivityLevel::ALL {
            assert_eq!(ActivityLevel::parse(level.as_str()), Ok(level));
        }
        for goal in [Goal::Lose, Goal::Maintain, Goal::Gain] {
            assert_eq!(Goal::parse(goal.as_str()), Ok(goal));
        }
    }
}
