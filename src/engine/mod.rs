//! Nutrition targeting engine
//!
//! Pure, synchronous computations over caller-supplied snapshots: energy
//! and daily-goal derivation, training context classification, per-meal
//! macro distribution, guideline evaluation, and candidate-meal scoring.
//! No global state and no I/O; "now" and "today" are always arguments.

pub mod distribution;
pub mod energy;
pub mod goals;
pub mod guidelines;
pub mod scoring;
pub mod training;

pub use distribution::{distribute_meal_targets, DistributionConfig};
pub use energy::{activity_factor, age_on, bmr, parse_formula, tdee, EnergyError};
pub use goals::compute_daily_goals;
pub use guidelines::{evaluate_guidelines, guideline_for, Guideline, GuidelineVerdict, MealStatus};
pub use scoring::{score_candidate, FitConfig, FitScore};
pub use training::{
    day_training_kcal, resolve_training_context, session_kcal, PhaseBasis, TrainingContext,
    TrainingPhase,
};
