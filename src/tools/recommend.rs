//! Meal evaluation and recommendation tools
//!
//! Scores candidate meals against the day's remaining budget and the
//! current training phase, and evaluates a single meal against the
//! phase guidelines.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::engine::{self, FitConfig, TrainingPhase};
use crate::models::{CandidateMeal, MacroTotals, MealShares, Profile, TrainingDay};

use super::targets;

/// Response for evaluate_meal
#[derive(Debug, Serialize)]
pub struct EvaluateMealResponse {
    pub phase: &'static str,
    pub status: &'static str,
    pub hints: Vec<String>,
    pub guideline: engine::Guideline,
}

/// One ranked candidate
#[derive(Debug, Serialize)]
pub struct RecommendationItem {
    pub name: String,
    pub score: f64,
    pub reasons: Vec<String>,
    pub status: &'static str,
    pub hints: Vec<String>,
    pub kcal: f64,
    pub cho_g: f64,
    pub pro_g: f64,
    pub fat_g: f64,
}

/// Response for recommend_meals
#[derive(Debug, Serialize)]
pub struct RecommendMealsResponse {
    pub phase: &'static str,
    pub remaining: MacroTotals,
    pub items: Vec<RecommendationItem>,
}

/// Evaluate one meal's macros against the phase guideline.
pub fn evaluate_meal(
    meal: &MacroTotals,
    phase: TrainingPhase,
    weight_kg: f64,
) -> EvaluateMealResponse {
    let guideline = engine::guideline_for(phase, weight_kg);
    let verdict = engine::evaluate_guidelines(meal, &guideline);

    EvaluateMealResponse {
        phase: phase.as_str(),
        status: verdict.status.as_str(),
        hints: verdict.hints,
        guideline,
    }
}

/// Remaining budget for the day: targets (kcal raised by training) minus
/// consumed totals, clamped at zero.
fn remaining_budget(
    profile: &Profile,
    today: NaiveDate,
    day: &TrainingDay,
    consumed: &MacroTotals,
    shares: &MealShares,
) -> Result<MacroTotals, String> {
    let day_targets = targets::get_day_targets(profile, today, day, shares)?;
    let target_totals = MacroTotals {
        kcal: day_targets.kcal,
        cho_g: day_targets.cho_g,
        pro_g: day_targets.pro_g,
        fat_g: day_targets.fat_g,
    };
    Ok(target_totals.saturating_sub(consumed))
}

/// Rank candidate meals for "what should I eat next".
///
/// Deterministic: ordered by score descending, ties broken by name.
#[allow(clippy::too_many_arguments)]
pub fn recommend_meals(
    profile: &Profile,
    today: NaiveDate,
    now: NaiveTime,
    day: &TrainingDay,
    consumed: &MacroTotals,
    candidates: &[CandidateMeal],
    shares: &MealShares,
    fit_cfg: &FitConfig,
) -> Result<RecommendMealsResponse, String> {
    let weight_kg = profile.weight_kg.unwrap_or(70.0);
    let phase = engine::resolve_training_context(day, now).phase;
    let remaining = remaining_budget(profile, today, day, consumed, shares)?;

    let mut items: Vec<RecommendationItem> = candidates
        .iter()
        .map(|c| {
            let fit = engine::score_candidate(&c.totals, &remaining, phase, weight_kg, fit_cfg);
            let guideline = engine::guideline_for(phase, weight_kg);
            let verdict = engine::evaluate_guidelines(&c.totals, &guideline);
            RecommendationItem {
                name: c.name.clone(),
                score: fit.score,
                reasons: fit.reasons,
                status: verdict.status.as_str(),
                hints: verdict.hints,
                kcal: c.totals.kcal,
                cho_g: c.totals.cho_g,
                pro_g: c.totals.pro_g,
                fat_g: c.totals.fat_g,
            }
        })
        .collect();

    items.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(RecommendMealsResponse {
        phase: phase.as_str(),
        remaining,
        items,
    })
}
