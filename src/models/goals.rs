//! Daily goal models
//!
//! `DailyGoals` is a derived value object: always re-computable from the
//! profile, never a source of truth.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{MacroTotals, MealAllocation, MealSlot};

/// Per-meal share map (fractions of the day, expected to sum to 1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealShares {
    shares: BTreeMap<MealSlot, f64>,
}

impl Default for MealShares {
    fn default() -> Self {
        let mut shares = BTreeMap::new();
        shares.insert(MealSlot::Desayuno, 0.20);
        shares.insert(MealSlot::Almuerzo, 0.10);
        shares.insert(MealSlot::Comida, 0.35);
        shares.insert(MealSlot::Merienda, 0.10);
        shares.insert(MealSlot::Cena, 0.25);
        Self { shares }
    }
}

impl MealShares {
    /// Build from an explicit map, warning (not failing) when the shares do
    /// not sum to 1.0. A skewed map is accepted and used as given.
    pub fn new(shares: BTreeMap<MealSlot, f64>) -> Self {
        let sum: f64 = shares.values().sum();
        if (sum - 1.0).abs() > 1e-3 {
            tracing::warn!(sum, "meal share map does not sum to 100%; using as given");
        }
        Self { shares }
    }

    pub fn share(&self, slot: MealSlot) -> f64 {
        self.shares.get(&slot).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MealSlot, f64)> + '_ {
        self.shares.iter().map(|(s, f)| (*s, *f))
    }

    pub fn sum(&self) -> f64 {
        self.shares.values().sum()
    }
}

/// Daily energy and macro budget derived from a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyGoals {
    /// TDEE, clamped to the energy model's safety bounds
    pub kcal_total: f64,
    pub cho_g: f64,
    pub pro_g: f64,
    pub fat_g: f64,
    pub per_meal_shares: MealShares,
}

impl DailyGoals {
    /// Daily macro totals as a bundle (kcal derived from grams at 4/4/9)
    pub fn macros(&self) -> MacroTotals {
        MacroTotals::from_grams(self.cho_g, self.pro_g, self.fat_g)
    }

    /// Flat per-meal allocation by the configured shares.
    ///
    /// This is the static distribution used when no training session can
    /// drive a dynamic redistribution.
    pub fn static_allocation(&self) -> MealAllocation {
        let mut per_meal = BTreeMap::new();
        for (slot, frac) in self.per_meal_shares.iter() {
            per_meal.insert(
                slot,
                MacroTotals::from_grams(self.cho_g * frac, self.pro_g * frac, self.fat_g * frac),
            );
        }
        MealAllocation { per_meal }
    }
}
