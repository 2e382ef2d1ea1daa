//! Meal slot and allocation models

use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::MacroTotals;

/// Named meal slots, in chronological order.
///
/// The derived `Ord` follows declaration order, so iterating a
/// `BTreeMap<MealSlot, _>` always walks the day from breakfast to dinner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Desayuno,
    Almuerzo,
    Comida,
    Merienda,
    Cena,
}

impl MealSlot {
    /// All slots in clock order
    pub fn all() -> [MealSlot; 5] {
        [
            MealSlot::Desayuno,
            MealSlot::Almuerzo,
            MealSlot::Comida,
            MealSlot::Merienda,
            MealSlot::Cena,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Desayuno => "desayuno",
            MealSlot::Almuerzo => "almuerzo",
            MealSlot::Comida => "comida",
            MealSlot::Merienda => "merienda",
            MealSlot::Cena => "cena",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "desayuno" | "breakfast" => Some(MealSlot::Desayuno),
            "almuerzo" => Some(MealSlot::Almuerzo),
            "comida" | "lunch" => Some(MealSlot::Comida),
            "merienda" | "snack" => Some(MealSlot::Merienda),
            "cena" | "dinner" => Some(MealSlot::Cena),
            _ => None,
        }
    }

    /// Default clock time for the slot
    pub fn default_time(&self) -> NaiveTime {
        let (h, m) = match self {
            MealSlot::Desayuno => (8, 30),
            MealSlot::Almuerzo => (11, 30),
            MealSlot::Comida => (14, 0),
            MealSlot::Merienda => (17, 0),
            MealSlot::Cena => (21, 0),
        };
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }
}

/// Per-meal macro/kcal allocation for one day.
///
/// Invariant: each macro gram column summed over all meals equals the daily
/// total it was built from (within floating-point tolerance), and every
/// field is non-negative. Per-meal kcal is always derived from the grams.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealAllocation {
    pub per_meal: BTreeMap<MealSlot, MacroTotals>,
}

impl MealAllocation {
    /// Sum over all meals
    pub fn totals(&self) -> MacroTotals {
        self.per_meal.values().copied().sum()
    }

    pub fn get(&self, slot: MealSlot) -> MacroTotals {
        self.per_meal.get(&slot).copied().unwrap_or_default()
    }
}

/// A reusable meal template with precomputed macro totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateMeal {
    pub name: String,
    pub totals: MacroTotals,
}
