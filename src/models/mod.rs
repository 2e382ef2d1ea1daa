//! Data models
//!
//! Rust structs representing the engine's inputs and outputs.

mod goals;
mod macros;
mod meal;
mod profile;
mod training;

pub use goals::{DailyGoals, MealShares};
pub use macros::{MacroTotals, KCAL_PER_G_CHO, KCAL_PER_G_FAT, KCAL_PER_G_PRO};
pub use meal::{CandidateMeal, MealAllocation, MealSlot};
pub use profile::{BmrFormula, Profile, Sex};
pub use training::{DayWindow, Sport, TrainingActual, TrainingDay, TrainingIntent};
