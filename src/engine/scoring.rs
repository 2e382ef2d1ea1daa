//! Candidate-meal fit scorer
//!
//! Computes a 0-100 composite score ranking how well a candidate meal
//! matches the day's remaining macro budget and the current training phase.

use serde::{Deserialize, Serialize};

use crate::models::MacroTotals;

use super::training::TrainingPhase;

/// Scoring weights and placeholder components.
///
/// MicroFit and HistoryFit are intentionally stubbed constants, reserved
/// for micronutrient coverage and usage-history affinity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    pub macro_weight: f64,
    pub timing_weight: f64,
    pub micro_weight: f64,
    pub history_weight: f64,
    pub micro_score: f64,
    pub history_score: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            macro_weight: 0.50,
            timing_weight: 0.25,
            micro_weight: 0.15,
            history_weight: 0.10,
            micro_score: 70.0,
            history_score: 60.0,
        }
    }
}

/// A scored candidate with ordered explanations (macro fit first)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitScore {
    pub score: f64,
    pub reasons: Vec<String>,
}

fn clip(x: f64) -> f64 {
    x.clamp(0.0, 100.0)
}

/// Macro gram shares (CHO, PRO, FAT) of a totals bundle, defaulting to
/// uniform thirds for degenerate (all-zero) vectors.
fn shares(t: &MacroTotals) -> (f64, f64, f64) {
    let sum = t.gram_sum();
    if sum <= 0.0 {
        return (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
    }
    (t.cho_g / sum, t.pro_g / sum, t.fat_g / sum)
}

/// MacroFit: 100 * (1 - 0.5 * L1) between the meal's macro proportions and
/// the remaining budget's proportions.
fn macro_fit(meal: &MacroTotals, remaining: &MacroTotals) -> f64 {
    let (mc, mp, mf) = shares(meal);
    let clamped = MacroTotals {
        kcal: remaining.kcal.max(0.0),
        cho_g: remaining.cho_g.max(0.0),
        pro_g: remaining.pro_g.max(0.0),
        fat_g: remaining.fat_g.max(0.0),
    };
    let (rc, rp, rf) = shares(&clamped);
    let l1 = (mc - rc).abs() + (mp - rp).abs() + (mf - rf).abs();
    clip(100.0 * (1.0 - 0.5 * l1))
}

/// TimingFit: phase-dependent reward/penalty rules.
fn timing_fit(meal: &MacroTotals, phase: TrainingPhase, weight_kg: f64) -> (f64, String) {
    match phase {
        TrainingPhase::Pre => {
            // Reward carbs up to 60 g, penalize fat above 15 g
            let score = 50.0 + ((meal.cho_g / 60.0) * 40.0).clamp(0.0, 40.0)
                - ((meal.fat_g - 15.0) * 2.0).max(0.0);
            (
                clip(score),
                "Pre-training: favoring carbs and low fat".to_string(),
            )
        }
        TrainingPhase::Post => {
            let target_pro = (15.0_f64).max(0.3 * weight_kg);
            let pro_err = (meal.pro_g - target_pro).abs() / target_pro;
            let score = 90.0 - pro_err * 50.0 + ((meal.cho_g / 80.0) * 10.0).clamp(0.0, 10.0);
            (
                clip(score),
                format!(
                    "Post-training: protein target ~= {:.1} g",
                    (target_pro * 10.0).round() / 10.0
                ),
            )
        }
        TrainingPhase::Neutral => (70.0, "Standard meal (no training nearby)".to_string()),
    }
}

/// Score a candidate meal against the remaining budget and phase.
///
/// Final score is the weighted sum of the four components, rounded to one
/// decimal, always within [0, 100].
pub fn score_candidate(
    meal: &MacroTotals,
    remaining: &MacroTotals,
    phase: TrainingPhase,
    weight_kg: f64,
    cfg: &FitConfig,
) -> FitScore {
    let macro_fit = macro_fit(meal, remaining);
    let (timing_fit, timing_reason) = timing_fit(meal, phase, weight_kg);

    let reasons = vec![
        format!(
            "Macro fit against the day's remaining budget: {}",
            macro_fit as i64
        ),
        timing_reason,
    ];

    let total = cfg.macro_weight * macro_fit
        + cfg.timing_weight * timing_fit
        + cfg.micro_weight * cfg.micro_score
        + cfg.history_weight * cfg.history_score;

    FitScore {
        score: (clip(total) * 10.0).round() / 10.0,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(cho: f64, pro: f64, fat: f64) -> MacroTotals {
        MacroTotals::from_grams(cho, pro, fat)
    }

    fn cfg() -> FitConfig {
        FitConfig::default()
    }

    #[test]
    fn test_perfect_macro_fit() {
        // Meal proportions identical to the remaining budget's
        let remaining = meal(100.0, 40.0, 60.0);
        let candidate = meal(50.0, 20.0, 30.0);
        assert!((macro_fit(&candidate, &remaining) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_vectors_default_to_thirds() {
        // Both all-zero: identical uniform shares, perfect fit
        assert!((macro_fit(&MacroTotals::zero(), &MacroTotals::zero()) - 100.0).abs() < 1e-9);
        // Negative remaining clamps to zero before proportions
        let negative = MacroTotals {
            kcal: -100.0,
            cho_g: -10.0,
            pro_g: -5.0,
            fat_g: -3.0,
        };
        let fit = macro_fit(&meal(40.0, 40.0, 40.0), &negative);
        assert!(fit.is_finite());
        assert!((0.0..=100.0).contains(&fit));
    }

    #[test]
    fn test_score_bounded_across_phases() {
        let extremes = [
            meal(0.0, 0.0, 0.0),
            meal(500.0, 0.0, 0.0),
            meal(0.0, 0.0, 200.0),
            meal(80.0, 30.0, 10.0),
        ];
        let remaining = meal(200.0, 80.0, 50.0);
        for phase in [TrainingPhase::Pre, TrainingPhase::Post, TrainingPhase::Neutral] {
            for m in &extremes {
                let fit = score_candidate(m, &remaining, phase, 70.0, &cfg());
                assert!(
                    (0.0..=100.0).contains(&fit.score),
                    "score {} out of range",
                    fit.score
                );
                assert_eq!(fit.reasons.len(), 2);
            }
        }
    }

    #[test]
    fn test_pre_phase_rewards_carbs_penalizes_fat() {
        let remaining = meal(200.0, 80.0, 50.0);
        let carby = score_candidate(&meal(60.0, 15.0, 5.0), &remaining, TrainingPhase::Pre, 70.0, &cfg());
        let fatty = score_candidate(&meal(60.0, 15.0, 35.0), &remaining, TrainingPhase::Pre, 70.0, &cfg());
        assert!(carby.score > fatty.score);
        assert!(carby.reasons[1].contains("Pre-training"));
    }

    #[test]
    fn test_post_phase_rewards_protein_near_target() {
        let remaining = meal(200.0, 80.0, 50.0);
        // 70 kg athlete: target 21 g
        let on_target = score_candidate(&meal(50.0, 21.0, 10.0), &remaining, TrainingPhase::Post, 70.0, &cfg());
        let off_target = score_candidate(&meal(50.0, 2.0, 10.0), &remaining, TrainingPhase::Post, 70.0, &cfg());
        assert!(on_target.score > off_target.score);
        assert!(on_target.reasons[1].contains("21"));
    }

    #[test]
    fn test_neutral_timing_is_constant() {
        let (fit, _) = timing_fit(&meal(50.0, 20.0, 30.0), TrainingPhase::Neutral, 70.0);
        assert!((fit - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_rounded_to_one_decimal() {
        let fit = score_candidate(
            &meal(55.0, 22.0, 13.0),
            &meal(180.0, 90.0, 40.0),
            TrainingPhase::Neutral,
            70.0,
            &cfg(),
        );
        assert!(((fit.score * 10.0).round() - fit.score * 10.0).abs() < 1e-9);
    }
}
