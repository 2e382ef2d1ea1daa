//! Daily target and meal plan tools
//!
//! Compose the energy model, goal calculator, and distribution engine into
//! the responses the MCP surface returns.

use chrono::NaiveDate;
use serde::Serialize;

use crate::engine::{self, DistributionConfig};
use crate::models::{DailyGoals, MealAllocation, MealShares, Profile, TrainingDay};

/// One meal's goal row
#[derive(Debug, Clone, Serialize)]
pub struct MealGoal {
    pub meal: &'static str,
    pub time: String,
    pub kcal: f64,
    pub cho_g: f64,
    pub pro_g: f64,
    pub fat_g: f64,
}

/// Response for compute_daily_goals
#[derive(Debug, Serialize)]
pub struct DailyGoalsResponse {
    pub kcal_total: f64,
    pub cho_g: f64,
    pub pro_g: f64,
    pub fat_g: f64,
    pub per_meal: Vec<MealGoal>,
}

/// A green/amber ratio band around a target value
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Band {
    pub green: (f64, f64),
    pub amber: (f64, f64),
}

/// Traffic-light bands per tracked metric
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TargetBands {
    pub kcal: Band,
    pub cho_g: Band,
    pub pro_g: Band,
    pub fat_g: Band,
}

/// Bands are ratios of consumed/target. The carbohydrate band widens on
/// training days, where intake legitimately swings more.
pub fn bands_for_day(has_training: bool) -> TargetBands {
    TargetBands {
        kcal: Band {
            green: (0.90, 1.10),
            amber: (0.85, 1.15),
        },
        pro_g: Band {
            green: (0.90, 1.10),
            amber: (0.80, 1.20),
        },
        fat_g: Band {
            green: (0.90, 1.20),
            amber: (0.80, 1.30),
        },
        cho_g: if has_training {
            Band {
                green: (0.75, 1.25),
                amber: (0.65, 1.35),
            }
        } else {
            Band {
                green: (0.85, 1.15),
                amber: (0.75, 1.25),
            }
        },
    }
}

/// Response for get_day_targets
#[derive(Debug, Serialize)]
pub struct DayTargetsResponse {
    pub kcal: f64,
    pub cho_g: f64,
    pub pro_g: f64,
    pub fat_g: f64,
    /// kcal added on top of the base goal by the day's training
    pub kcal_extra_training: f64,
    pub has_training: bool,
    pub bands: TargetBands,
}

/// Response for distribute_meal_targets
#[derive(Debug, Serialize)]
pub struct MealPlanResponse {
    /// "dynamic" when training drove a redistribution, "static" otherwise
    pub distribution: &'static str,
    pub pre_meal: Option<&'static str>,
    pub post_meal: Option<&'static str>,
    pub session_start: Option<String>,
    pub meals: Vec<MealGoal>,
    pub kcal_total: f64,
    pub cho_total: f64,
    pub pro_total: f64,
    pub fat_total: f64,
}

fn allocation_rows(allocation: &MealAllocation) -> Vec<MealGoal> {
    allocation
        .per_meal
        .iter()
        .map(|(slot, m)| MealGoal {
            meal: slot.as_str(),
            time: slot.default_time().format("%H:%M").to_string(),
            kcal: m.kcal,
            cho_g: m.cho_g,
            pro_g: m.pro_g,
            fat_g: m.fat_g,
        })
        .collect()
}

fn daily_goals(
    profile: &Profile,
    today: NaiveDate,
    shares: &MealShares,
) -> Result<DailyGoals, String> {
    engine::compute_daily_goals(profile, today, shares).map_err(|e| e.to_string())
}

/// Compute the day's macro budget and flat per-meal goals
pub fn compute_daily_goals(
    profile: &Profile,
    today: NaiveDate,
    shares: &MealShares,
) -> Result<DailyGoalsResponse, String> {
    let goals = daily_goals(profile, today, shares)?;
    let per_meal = allocation_rows(&goals.static_allocation());

    Ok(DailyGoalsResponse {
        kcal_total: goals.kcal_total,
        cho_g: goals.cho_g,
        pro_g: goals.pro_g,
        fat_g: goals.fat_g,
        per_meal,
    })
}

/// Day targets: base goals plus the training energy for the date.
///
/// Macro gram targets stay at their base values; only kcal absorbs the
/// training load (current policy).
pub fn get_day_targets(
    profile: &Profile,
    today: NaiveDate,
    day: &TrainingDay,
    shares: &MealShares,
) -> Result<DayTargetsResponse, String> {
    let goals = daily_goals(profile, today, shares)?;
    let kcal_extra = engine::day_training_kcal(day);
    let has_training = day.has_training();

    Ok(DayTargetsResponse {
        kcal: goals.kcal_total + kcal_extra,
        cho_g: goals.cho_g,
        pro_g: goals.pro_g,
        fat_g: goals.fat_g,
        kcal_extra_training: kcal_extra,
        has_training,
        bands: bands_for_day(has_training),
    })
}

/// Per-meal targets for the day, training-adjusted when possible.
///
/// Falls back to the flat static shares when no session has a usable start
/// time; that path is marked explicitly rather than signalled by an error.
pub fn distribute_meal_targets(
    profile: &Profile,
    today: NaiveDate,
    day: &TrainingDay,
    shares: &MealShares,
    cfg: &DistributionConfig,
) -> Result<MealPlanResponse, String> {
    let goals = daily_goals(profile, today, shares)?;

    let response = match engine::distribute_meal_targets(&goals, day, cfg) {
        Some(plan) => MealPlanResponse {
            distribution: "dynamic",
            pre_meal: Some(plan.pre_meal.as_str()),
            post_meal: Some(plan.post_meal.as_str()),
            session_start: Some(plan.session_start.format("%H:%M").to_string()),
            meals: allocation_rows(&plan.allocation),
            kcal_total: goals.kcal_total,
            cho_total: goals.cho_g,
            pro_total: goals.pro_g,
            fat_total: goals.fat_g,
        },
        None => MealPlanResponse {
            distribution: "static",
            pre_meal: None,
            post_meal: None,
            session_start: None,
            meals: allocation_rows(&goals.static_allocation()),
            kcal_total: goals.kcal_total,
            cho_total: goals.cho_g,
            pro_total: goals.pro_g,
            fat_total: goals.fat_g,
        },
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BmrFormula, Sex, Sport, TrainingActual};
    use chrono::NaiveTime;

    fn profile() -> Profile {
        Profile {
            sex: Sex::Male,
            height_cm: Some(175.0),
            weight_kg: Some(70.0),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 15),
            activity_factor: 1.55,
            formula: BmrFormula::Mifflin,
            body_fat_pct: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn run_session(start: Option<(u32, u32)>) -> TrainingActual {
        TrainingActual {
            date: today(),
            sport: Sport::Run,
            duration_min: 60.0,
            distance_km: None,
            elevation_m: None,
            avg_power_w: None,
            avg_hr: None,
            kcal: None,
            started_at: start.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap()),
        }
    }

    #[test]
    fn test_day_targets_add_training_kcal_only() {
        let shares = MealShares::default();
        let base = get_day_targets(&profile(), today(), &TrainingDay::default(), &shares).unwrap();
        let day = TrainingDay::new(None, vec![run_session(None)]);
        let trained = get_day_targets(&profile(), today(), &day, &shares).unwrap();

        assert!((trained.kcal_extra_training - 660.0).abs() < 1e-9);
        assert!((trained.kcal - (base.kcal + 660.0)).abs() < 1e-9);
        // Macros are not inflated by training
        assert_eq!(trained.cho_g, base.cho_g);
        assert_eq!(trained.pro_g, base.pro_g);
        assert_eq!(trained.fat_g, base.fat_g);
        // Carb band widens on training days
        assert_eq!(trained.bands.cho_g.green, (0.75, 1.25));
        assert_eq!(base.bands.cho_g.green, (0.85, 1.15));
    }

    #[test]
    fn test_distribute_without_start_time_is_static() {
        let shares = MealShares::default();
        let day = TrainingDay::new(None, vec![run_session(None)]);
        let plan = distribute_meal_targets(
            &profile(),
            today(),
            &day,
            &shares,
            &DistributionConfig::default(),
        )
        .unwrap();

        assert_eq!(plan.distribution, "static");
        assert!(plan.pre_meal.is_none());
        assert_eq!(plan.meals.len(), 5);
        let cho_sum: f64 = plan.meals.iter().map(|m| m.cho_g).sum();
        assert!((cho_sum - plan.cho_total).abs() < 0.5);
    }

    #[test]
    fn test_distribute_with_start_time_is_dynamic() {
        let shares = MealShares::default();
        let day = TrainingDay::new(None, vec![run_session(Some((18, 0)))]);
        let plan = distribute_meal_targets(
            &profile(),
            today(),
            &day,
            &shares,
            &DistributionConfig::default(),
        )
        .unwrap();

        assert_eq!(plan.distribution, "dynamic");
        assert_eq!(plan.pre_meal, Some("merienda"));
        assert_eq!(plan.post_meal, Some("cena"));
        assert_eq!(plan.session_start.as_deref(), Some("18:00"));
        for macro_pair in [
            (plan.meals.iter().map(|m| m.cho_g).sum::<f64>(), plan.cho_total),
            (plan.meals.iter().map(|m| m.pro_g).sum::<f64>(), plan.pro_total),
            (plan.meals.iter().map(|m| m.fat_g).sum::<f64>(), plan.fat_total),
        ] {
            assert!((macro_pair.0 - macro_pair.1).abs() < 0.5);
        }
    }

    #[test]
    fn test_incomplete_profile_surfaces_error() {
        let mut p = profile();
        p.birth_date = None;
        let err = compute_daily_goals(&p, today(), &MealShares::default()).unwrap_err();
        assert!(err.contains("birth_date"));
    }
}
