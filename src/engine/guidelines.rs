//! Meal guideline evaluator
//!
//! Phase-specific target ranges for a single meal, and a pass/adjust
//! verdict with textual hints against them.

use serde::{Deserialize, Serialize};

use crate::models::MacroTotals;

use super::training::TrainingPhase;

/// Relative tolerance around the post-training protein target
const PRO_TOLERANCE: f64 = 0.20;

/// Combined absolute share deviation accepted in the neutral phase
const NEUTRAL_SHARE_TOLERANCE: f64 = 0.35;

/// Phase-specific meal targets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Guideline {
    Pre {
        cho_range_g: (f64, f64),
        fat_max_g: f64,
    },
    Post {
        pro_target_g: f64,
        cho_range_g: (f64, f64),
    },
    Neutral {
        /// Target kcal-free macro shares (CHO, PRO, FAT)
        shares_target: (f64, f64, f64),
    },
}

/// Pass/adjust verdict for a meal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealStatus {
    Ok,
    Adjust,
}

impl MealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealStatus::Ok => "ok",
            MealStatus::Adjust => "adjust",
        }
    }
}

/// Verdict plus actionable hints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidelineVerdict {
    pub status: MealStatus,
    pub hints: Vec<String>,
}

/// Guideline for a meal in the given training phase
pub fn guideline_for(phase: TrainingPhase, weight_kg: f64) -> Guideline {
    match phase {
        TrainingPhase::Pre => Guideline::Pre {
            cho_range_g: (45.0, 90.0),
            fat_max_g: 15.0,
        },
        TrainingPhase::Post => Guideline::Post {
            pro_target_g: (15.0_f64).max(0.3 * weight_kg),
            cho_range_g: (40.0, 80.0),
        },
        TrainingPhase::Neutral => Guideline::Neutral {
            shares_target: (0.50, 0.20, 0.30),
        },
    }
}

fn check_cho_range(cho: f64, range: (f64, f64), hints: &mut Vec<String>) -> bool {
    let (lo, hi) = range;
    if cho < lo {
        hints.push(format!("Add ~{} g of carbs", (lo - cho).round() as i64));
        return false;
    }
    if cho > hi {
        hints.push(format!("Cut ~{} g of carbs", (cho - hi).round() as i64));
        return false;
    }
    true
}

/// Compare a meal's actual macros against a guideline.
pub fn evaluate_guidelines(meal: &MacroTotals, guideline: &Guideline) -> GuidelineVerdict {
    let mut hints = Vec::new();
    let mut ok = true;

    match guideline {
        Guideline::Pre {
            cho_range_g,
            fat_max_g,
        } => {
            ok &= check_cho_range(meal.cho_g, *cho_range_g, &mut hints);
            if meal.fat_g > *fat_max_g {
                ok = false;
                hints.push(format!(
                    "Trim ~{} g of fat",
                    (meal.fat_g - fat_max_g).round() as i64
                ));
            }
        }
        Guideline::Post {
            pro_target_g,
            cho_range_g,
        } => {
            let diff = meal.pro_g - pro_target_g;
            if diff.abs() > PRO_TOLERANCE * pro_target_g {
                ok = false;
                if diff < 0.0 {
                    hints.push(format!("Add ~{} g of protein", diff.abs().round() as i64));
                } else {
                    hints.push(format!("Reduce ~{} g of protein", diff.abs().round() as i64));
                }
            }
            ok &= check_cho_range(meal.cho_g, *cho_range_g, &mut hints);
        }
        Guideline::Neutral { shares_target } => {
            let sum = meal.gram_sum();
            if sum > 0.0 {
                let (cho_t, pro_t, fat_t) = shares_target;
                let deviation = (meal.cho_g / sum - cho_t).abs()
                    + (meal.pro_g / sum - pro_t).abs()
                    + (meal.fat_g / sum - fat_t).abs();
                if deviation > NEUTRAL_SHARE_TOLERANCE {
                    ok = false;
                    hints.push("Rebalance toward 50/20/30 (more carbs and/or less fat)".to_string());
                }
            }
        }
    }

    GuidelineVerdict {
        status: if ok { MealStatus::Ok } else { MealStatus::Adjust },
        hints,
    }
}
