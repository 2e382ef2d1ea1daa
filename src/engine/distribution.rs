//! Meal distribution engine
//!
//! Turns the day's macro budget plus the day's training into a per-meal
//! allocation that biases carbohydrate and protein toward the pre/post
//! training meals and suppresses fat near training, while keeping every
//! macro column summing exactly to the daily total.

use std::collections::BTreeMap;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::{DailyGoals, MacroTotals, MealAllocation, MealSlot, TrainingDay};

use super::training::session_kcal;

/// Policy parameters for the redistribution. All defaults are configurable
/// policy, not normative constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Minutes before the session start in which a meal counts as pre
    pub pre_window_min: f64,
    /// Minutes after the session start in which a meal counts as post
    pub post_window_min: f64,
    /// Fraction of total carbohydrate reserved for the pre meal
    pub cho_boost_pre: f64,
    /// Fraction of total carbohydrate reserved for the post meal
    pub cho_boost_post: f64,
    /// Fraction of total protein reserved for the post meal
    pub pro_boost_post: f64,
    /// Multiplier applied to the pre meal's fat share
    pub fat_pre_factor: f64,
    /// Multiplier applied to the post meal's fat share
    pub fat_post_factor: f64,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            pre_window_min: 120.0,
            post_window_min: 120.0,
            cho_boost_pre: 0.20,
            cho_boost_post: 0.30,
            pro_boost_post: 0.20,
            fat_pre_factor: 0.60,
            fat_post_factor: 0.80,
        }
    }
}

/// A dynamic per-meal plan, with the strategically placed meals identified
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlan {
    pub allocation: MealAllocation,
    pub pre_meal: MealSlot,
    pub post_meal: MealSlot,
    /// Start time of the session that drove the redistribution
    pub session_start: NaiveTime,
}

/// The session (recorded or planned) considered for redistribution
struct TimedSession {
    start_min: f64,
    duration_min: f64,
    kcal: f64,
}

fn minutes(t: NaiveTime) -> f64 {
    f64::from(t.num_seconds_from_midnight()) / 60.0
}

fn slot_minutes(slot: MealSlot) -> f64 {
    minutes(slot.default_time())
}

/// Select the session driving redistribution: largest estimated kcal,
/// falling back to longest duration, then earliest start. Only sessions
/// with a resolvable start time qualify; a planned intent qualifies through
/// its anchor time while nothing has been recorded.
fn primary_session(day: &TrainingDay) -> Option<TimedSession> {
    let mut candidates: Vec<TimedSession> = day
        .sessions()
        .iter()
        .filter_map(|s| {
            s.started_at.map(|t| TimedSession {
                start_min: minutes(t),
                duration_min: s.duration_min.max(0.0),
                kcal: session_kcal(s),
            })
        })
        .collect();

    if candidates.is_empty() {
        if let Some(intent) = day.intent() {
            candidates.push(TimedSession {
                start_min: minutes(intent.window.anchor_time()),
                duration_min: intent.est_minutes.unwrap_or(60.0).max(0.0),
                kcal: 0.0,
            });
        }
    }

    candidates.into_iter().reduce(|best, s| {
        if s.kcal > best.kcal
            || (s.kcal == best.kcal && s.duration_min > best.duration_min)
            || (s.kcal == best.kcal
                && s.duration_min == best.duration_min
                && s.start_min < best.start_min)
        {
            s
        } else {
            best
        }
    })
}

/// Pick the pre-training meal: the closest slot strictly before the start
/// inside the window, else the nearest earlier slot, else desayuno.
/// Strictly-closer comparison over chronological slots makes the earlier
/// clock time win ties.
fn pick_pre_meal(start_min: f64, window_min: f64) -> MealSlot {
    let mut in_window: Option<(MealSlot, f64)> = None;
    let mut nearest_before: Option<(MealSlot, f64)> = None;

    for slot in MealSlot::all() {
        let t = slot_minutes(slot);
        if t >= start_min {
            continue;
        }
        let dist = start_min - t;
        if dist <= window_min && in_window.map_or(true, |(_, d)| dist < d) {
            in_window = Some((slot, dist));
        }
        if nearest_before.map_or(true, |(_, d)| dist < d) {
            nearest_before = Some((slot, dist));
        }
    }

    in_window
        .or(nearest_before)
        .map(|(slot, _)| slot)
        .unwrap_or(MealSlot::Desayuno)
}

/// Pick the post-training meal, excluding the already-chosen pre meal so
/// the two are always distinct. Defaults to cena when the day has no later
/// meal.
fn pick_post_meal(start_min: f64, window_min: f64, pre_meal: MealSlot) -> MealSlot {
    let mut in_window: Option<(MealSlot, f64)> = None;
    let mut nearest_after: Option<(MealSlot, f64)> = None;

    for slot in MealSlot::all() {
        if slot == pre_meal {
            continue;
        }
        let t = slot_minutes(slot);
        if t <= start_min {
            continue;
        }
        let dist = t - start_min;
        if dist <= window_min && in_window.map_or(true, |(_, d)| dist < d) {
            in_window = Some((slot, dist));
        }
        if nearest_after.map_or(true, |(_, d)| dist < d) {
            nearest_after = Some((slot, dist));
        }
    }

    in_window.or(nearest_after).map(|(slot, _)| slot).unwrap_or(
        // No later meal at all. Cena is the documented default; when cena
        // is already the pre meal the boost lands on the latest remaining
        // slot so pre and post stay distinct.
        if pre_meal == MealSlot::Cena {
            MealSlot::Merienda
        } else {
            MealSlot::Cena
        },
    )
}

/// Clamp negatives to zero and rescale so the vector sums to `total`.
///
/// Run as the final step of every macro allocation regardless of what the
/// boosting arithmetic produced, so rounding drift can never leak into the
/// day totals. A fully clamped vector falls back to an even split.
fn normalize(values: &mut BTreeMap<MealSlot, f64>, total: f64) {
    for v in values.values_mut() {
        if *v < 0.0 {
            *v = 0.0;
        }
    }
    if total <= 0.0 {
        for v in values.values_mut() {
            *v = 0.0;
        }
        return;
    }
    let sum: f64 = values.values().sum();
    if sum <= f64::EPSILON {
        let even = total / values.len() as f64;
        for v in values.values_mut() {
            *v = even;
        }
        return;
    }
    let factor = total / sum;
    for v in values.values_mut() {
        *v *= factor;
    }
}

fn base_vector(goals: &DailyGoals, total: f64, scale: f64) -> BTreeMap<MealSlot, f64> {
    MealSlot::all()
        .into_iter()
        .map(|slot| (slot, goals.per_meal_shares.share(slot) * total * scale))
        .collect()
}

/// Distribute the day's macro budget across the meal slots around the
/// primary training session.
///
/// Returns `None` when no session has a resolvable start time: that is the
/// expected "use static shares" path, not an error.
pub fn distribute_meal_targets(
    goals: &DailyGoals,
    day: &TrainingDay,
    cfg: &DistributionConfig,
) -> Option<MealPlan> {
    let session = primary_session(day)?;

    let pre_meal = pick_pre_meal(session.start_min, cfg.pre_window_min);
    let post_meal = pick_post_meal(session.start_min, cfg.post_window_min, pre_meal);

    let cho_total = goals.cho_g.max(0.0);
    let pro_total = goals.pro_g.max(0.0);
    let fat_total = goals.fat_g.max(0.0);

    // Carbohydrate: scale every base share down to reserve the boost
    // fractions, hand them to the pre/post meals, then normalize.
    let mut cho = base_vector(goals, cho_total, 1.0 - cfg.cho_boost_pre - cfg.cho_boost_post);
    *cho.entry(pre_meal).or_insert(0.0) += cfg.cho_boost_pre * cho_total;
    *cho.entry(post_meal).or_insert(0.0) += cfg.cho_boost_post * cho_total;
    normalize(&mut cho, cho_total);

    // Protein: the reserved fraction goes to the post meal only.
    let mut pro = base_vector(goals, pro_total, 1.0 - cfg.pro_boost_post);
    *pro.entry(post_meal).or_insert(0.0) += cfg.pro_boost_post * pro_total;
    normalize(&mut pro, pro_total);

    // Fat: suppress near training, redistribute the removed grams over the
    // remaining meals in proportion to their base weight.
    let mut fat = base_vector(goals, fat_total, 1.0);
    let pre_fat = fat.get(&pre_meal).copied().unwrap_or(0.0);
    let post_fat = fat.get(&post_meal).copied().unwrap_or(0.0);
    let removed = pre_fat * (1.0 - cfg.fat_pre_factor) + post_fat * (1.0 - cfg.fat_post_factor);
    fat.insert(pre_meal, pre_fat * cfg.fat_pre_factor);
    fat.insert(post_meal, post_fat * cfg.fat_post_factor);

    let others: Vec<MealSlot> = MealSlot::all()
        .into_iter()
        .filter(|s| *s != pre_meal && *s != post_meal)
        .collect();
    let others_weight: f64 = others
        .iter()
        .map(|s| goals.per_meal_shares.share(*s))
        .sum();
    for slot in &others {
        let extra = if others_weight > 0.0 {
            removed * goals.per_meal_shares.share(*slot) / others_weight
        } else {
            removed / others.len() as f64
        };
        *fat.entry(*slot).or_insert(0.0) += extra;
    }
    normalize(&mut fat, fat_total);

    // kcal per meal is always a consequence of the final grams.
    let mut per_meal = BTreeMap::new();
    for slot in MealSlot::all() {
        per_meal.insert(
            slot,
            MacroTotals::from_grams(
                cho.get(&slot).copied().unwrap_or(0.0),
                pro.get(&slot).copied().unwrap_or(0.0),
                fat.get(&slot).copied().unwrap_or(0.0),
            ),
        );
    }

    let start_secs = (session.start_min * 60.0).round().max(0.0) as u32;
    Some(MealPlan {
        allocation: MealAllocation { per_meal },
        pre_meal,
        post_meal,
        session_start: NaiveTime::from_num_seconds_from_midnight_opt(start_secs.min(86_399), 0)
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DayWindow, MealShares, Sport, TrainingActual, TrainingIntent,
    };
    use chrono::NaiveDate;

    fn goals() -> DailyGoals {
        DailyGoals {
            kcal_total: 2600.0,
            cho_g: 325.0,
            pro_g: 162.5,
            fat_g: 72.2,
            per_meal_shares: MealShares::default(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn run_at(start: Option<NaiveTime>, duration_min: f64) -> TrainingActual {
        TrainingActual {
            date: date(),
            sport: Sport::Run,
            duration_min,
            distance_km: None,
            elevation_m: None,
            avg_power_w: None,
            avg_hr: None,
            kcal: None,
            started_at: start,
        }
    }

    fn assert_conserved(plan: &MealPlan, goals: &DailyGoals) {
        let totals = plan.allocation.totals();
        assert!((totals.cho_g - goals.cho_g).abs() < 0.5, "cho drifted");
        assert!((totals.pro_g - goals.pro_g).abs() < 0.5, "pro drifted");
        assert!((totals.fat_g - goals.fat_g).abs() < 0.5, "fat drifted");
        for (_, m) in &plan.allocation.per_meal {
            assert!(m.cho_g >= 0.0 && m.pro_g >= 0.0 && m.fat_g >= 0.0);
            let derived = m.cho_g * 4.0 + m.pro_g * 4.0 + m.fat_g * 9.0;
            assert!((m.kcal - derived).abs() < 0.1);
        }
    }

    #[test]
    fn test_pre_and_post_meal_selection_for_evening_session() {
        let day = TrainingDay::new(None, vec![run_at(Some(t(18, 0)), 60.0)]);
        let plan = distribute_meal_targets(&goals(), &day, &DistributionConfig::default()).unwrap();

        // merienda 17:00 is the closest slot before 18:00 within 120 min,
        // cena 21:00 the only slot after
        assert_eq!(plan.pre_meal, MealSlot::Merienda);
        assert_eq!(plan.post_meal, MealSlot::Cena);
        assert_conserved(&plan, &goals());
    }

    #[test]
    fn test_midday_session_selection() {
        // 14:30 session: comida (14:00) is 30 min before, merienda (17:00)
        // is 150 min after -> outside the post window, picked as nearest
        // after fallback.
        let day = TrainingDay::new(None, vec![run_at(Some(t(14, 30)), 60.0)]);
        let plan = distribute_meal_targets(&goals(), &day, &DistributionConfig::default()).unwrap();
        assert_eq!(plan.pre_meal, MealSlot::Comida);
        assert_eq!(plan.post_meal, MealSlot::Merienda);
        assert_conserved(&plan, &goals());
    }

    #[test]
    fn test_boosts_shift_macros_toward_training_meals() {
        let g = goals();
        let day = TrainingDay::new(None, vec![run_at(Some(t(18, 0)), 60.0)]);
        let plan = distribute_meal_targets(&g, &day, &DistributionConfig::default()).unwrap();
        let static_alloc = g.static_allocation();

        let pre = plan.allocation.get(plan.pre_meal);
        let post = plan.allocation.get(plan.post_meal);
        assert!(pre.cho_g > static_alloc.get(plan.pre_meal).cho_g);
        assert!(post.cho_g > static_alloc.get(plan.post_meal).cho_g);
        assert!(post.pro_g > static_alloc.get(plan.post_meal).pro_g);
        // Fat is suppressed near training
        assert!(pre.fat_g < static_alloc.get(plan.pre_meal).fat_g);
        assert!(post.fat_g < static_alloc.get(plan.post_meal).fat_g);
    }

    #[test]
    fn test_no_usable_session_returns_none() {
        assert!(distribute_meal_targets(
            &goals(),
            &TrainingDay::default(),
            &DistributionConfig::default()
        )
        .is_none());

        // A session without a start time is not usable either
        let day = TrainingDay::new(None, vec![run_at(None, 60.0)]);
        assert!(distribute_meal_targets(&goals(), &day, &DistributionConfig::default()).is_none());
    }

    #[test]
    fn test_intent_anchor_drives_distribution() {
        let intent = TrainingIntent {
            date: date(),
            window: DayWindow::Afternoon, // 18:30 anchor
            sport: Some(Sport::Bike),
            est_minutes: Some(90.0),
        };
        let day = TrainingDay::new(Some(intent), vec![]);
        let plan = distribute_meal_targets(&goals(), &day, &DistributionConfig::default()).unwrap();
        assert_eq!(plan.pre_meal, MealSlot::Merienda);
        assert_eq!(plan.post_meal, MealSlot::Cena);
        assert_conserved(&plan, &goals());
    }

    #[test]
    fn test_primary_session_is_largest_kcal() {
        // Evening run burns more than the short morning swim, so the
        // evening session drives the plan.
        let mut swim = run_at(Some(t(7, 0)), 20.0);
        swim.sport = Sport::Swim;
        let day = TrainingDay::new(None, vec![swim, run_at(Some(t(18, 0)), 90.0)]);
        let plan = distribute_meal_targets(&goals(), &day, &DistributionConfig::default()).unwrap();
        assert_eq!(plan.pre_meal, MealSlot::Merienda);
        assert_eq!(plan.post_meal, MealSlot::Cena);
    }

    #[test]
    fn test_early_session_defaults_pre_to_desayuno() {
        // 06:00 session: no slot earlier in the day, so desayuno is the
        // documented pre default; it is then excluded from post selection.
        let day = TrainingDay::new(None, vec![run_at(Some(t(6, 0)), 60.0)]);
        let plan = distribute_meal_targets(&goals(), &day, &DistributionConfig::default()).unwrap();
        assert_eq!(plan.pre_meal, MealSlot::Desayuno);
        assert_eq!(plan.post_meal, MealSlot::Almuerzo);
        assert_ne!(plan.pre_meal, plan.post_meal);
        assert_conserved(&plan, &goals());
    }

    #[test]
    fn test_late_session_keeps_pre_and_post_distinct() {
        // 22:30 session: cena is the pre meal and no slot comes later, so
        // the post boost lands on the latest remaining slot.
        let day = TrainingDay::new(None, vec![run_at(Some(t(22, 30)), 45.0)]);
        let plan = distribute_meal_targets(&goals(), &day, &DistributionConfig::default()).unwrap();
        assert_eq!(plan.pre_meal, MealSlot::Cena);
        assert_eq!(plan.post_meal, MealSlot::Merienda);
        assert_ne!(plan.pre_meal, plan.post_meal);
        assert_conserved(&plan, &goals());
    }

    #[test]
    fn test_idempotent() {
        let day = TrainingDay::new(None, vec![run_at(Some(t(18, 0)), 60.0)]);
        let cfg = DistributionConfig::default();
        let a = distribute_meal_targets(&goals(), &day, &cfg).unwrap();
        let b = distribute_meal_targets(&goals(), &day, &cfg).unwrap();
        assert_eq!(
            serde_json::to_string(&a.allocation).unwrap(),
            serde_json::to_string(&b.allocation).unwrap()
        );
    }

    #[test]
    fn test_zero_totals_stay_zero() {
        let empty = DailyGoals {
            kcal_total: 0.0,
            cho_g: 0.0,
            pro_g: 0.0,
            fat_g: 0.0,
            per_meal_shares: MealShares::default(),
        };
        let day = TrainingDay::new(None, vec![run_at(Some(t(18, 0)), 60.0)]);
        let plan = distribute_meal_targets(&empty, &day, &DistributionConfig::default()).unwrap();
        let totals = plan.allocation.totals();
        assert_eq!(totals.cho_g, 0.0);
        assert_eq!(totals.pro_g, 0.0);
        assert_eq!(totals.fat_g, 0.0);
    }
}
