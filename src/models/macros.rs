//! Shared macronutrient data structure
//!
//! Used across daily goals, per-meal allocations, candidate meals, and
//! consumed-day totals.

use serde::{Deserialize, Serialize};

/// Kilocalories per gram of carbohydrate
pub const KCAL_PER_G_CHO: f64 = 4.0;

/// Kilocalories per gram of protein
pub const KCAL_PER_G_PRO: f64 = 4.0;

/// Kilocalories per gram of fat
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// A bundle of energy and macronutrient totals
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MacroTotals {
    pub kcal: f64,
    pub cho_g: f64, // carbohydrate, grams
    pub pro_g: f64, // protein, grams
    pub fat_g: f64, // fat, grams
}

impl MacroTotals {
    /// Create a new MacroTotals with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build from gram amounts, deriving kcal from the 4/4/9 factors.
    ///
    /// kcal is always a consequence of the macros, never set independently.
    pub fn from_grams(cho_g: f64, pro_g: f64, fat_g: f64) -> Self {
        Self {
            kcal: cho_g * KCAL_PER_G_CHO + pro_g * KCAL_PER_G_PRO + fat_g * KCAL_PER_G_FAT,
            cho_g,
            pro_g,
            fat_g,
        }
    }

    /// Scale all values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            kcal: self.kcal * multiplier,
            cho_g: self.cho_g * multiplier,
            pro_g: self.pro_g * multiplier,
            fat_g: self.fat_g * multiplier,
        }
    }

    /// Add another totals bundle to this one
    pub fn add(&self, other: &MacroTotals) -> Self {
        Self {
            kcal: self.kcal + other.kcal,
            cho_g: self.cho_g + other.cho_g,
            pro_g: self.pro_g + other.pro_g,
            fat_g: self.fat_g + other.fat_g,
        }
    }

    /// Subtract another bundle, clamping every field at zero.
    ///
    /// Used for "remaining budget" so an over-consumed day never produces
    /// negative targets.
    pub fn saturating_sub(&self, other: &MacroTotals) -> Self {
        Self {
            kcal: (self.kcal - other.kcal).max(0.0),
            cho_g: (self.cho_g - other.cho_g).max(0.0),
            pro_g: (self.pro_g - other.pro_g).max(0.0),
            fat_g: (self.fat_g - other.fat_g).max(0.0),
        }
    }

    /// Sum of the three macro gram columns
    pub fn gram_sum(&self) -> f64 {
        self.cho_g + self.pro_g + self.fat_g
    }
}

impl std::ops::Add for MacroTotals {
    type Output = MacroTotals;

    fn add(self, other: MacroTotals) -> MacroTotals {
        MacroTotals::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for MacroTotals {
    type Output = MacroTotals;

    fn mul(self, multiplier: f64) -> MacroTotals {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for MacroTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MacroTotals::zero(), |acc, t| acc + t)
    }
}
