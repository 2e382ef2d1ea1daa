//! Physiological profile model
//!
//! Snapshot of the user's physiological attributes, supplied by the
//! (external) profile store. Immutable during a single computation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Biological sex, as used by the Mifflin-St Jeor formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "M" | "MALE" => Some(Sex::Male),
            "F" | "FEMALE" => Some(Sex::Female),
            _ => None,
        }
    }
}

/// BMR formula choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmrFormula {
    Mifflin,
    Cunningham,
}

impl BmrFormula {
    pub fn as_str(&self) -> &'static str {
        match self {
            BmrFormula::Mifflin => "mifflin",
            BmrFormula::Cunningham => "cunningham",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mifflin" => Some(BmrFormula::Mifflin),
            "cunningham" => Some(BmrFormula::Cunningham),
            _ => None,
        }
    }
}

/// Physiological profile snapshot
///
/// Optional fields reflect incomplete user setup; the energy model decides
/// which of them are required for the chosen formula and fails with a typed
/// error when one is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub sex: Sex,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub birth_date: Option<NaiveDate>,
    /// Normalized activity factor (see `engine::energy::activity_factor`)
    pub activity_factor: f64,
    pub formula: BmrFormula,
    /// Body fat percentage 0-100, used by Cunningham when present
    pub body_fat_pct: Option<f64>,
}
