//! Nutrition domain logic
//!
//! Pure calculations, independent of storage and transport.

mod estimator;

pub use estimator::{
    compute_energy_target, ActivityLevel, BodyMetrics, EnergyTarget, Goal, InvalidInput,
};
