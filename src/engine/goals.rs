//! Daily goal calculator
//!
//! Converts TDEE into a full daily macro budget: 50% of kcal as
//! carbohydrate, 25% as protein with a 1.6 g/kg floor, and the remaining
//! kcal as fat, converted to grams at 4/4/9.

use chrono::NaiveDate;

use crate::models::{
    DailyGoals, MealShares, Profile, KCAL_PER_G_CHO, KCAL_PER_G_FAT, KCAL_PER_G_PRO,
};

use super::energy::{self, EnergyError};

/// Fraction of daily kcal assigned to carbohydrate
const CHO_KCAL_SHARE: f64 = 0.50;

/// Fraction of daily kcal assigned to protein, before the floor
const PRO_KCAL_SHARE: f64 = 0.25;

/// Minimum daily protein in grams per kg of body weight
const PRO_FLOOR_G_PER_KG: f64 = 1.6;

/// Compute the day's macro budget for a profile.
///
/// Deterministic given the inputs: no randomness, no hidden state. `today`
/// is only used for the age calculation.
///
/// Fat kcal is the remainder after the 50/25 split; the protein floor can
/// therefore push the gram-derived total slightly above TDEE, which is the
/// accepted policy.
pub fn compute_daily_goals(
    profile: &Profile,
    today: NaiveDate,
    shares: &MealShares,
) -> Result<DailyGoals, EnergyError> {
    let age = profile.birth_date.map(|b| energy::age_on(b, today));
    let bmr = energy::bmr(profile, age)?;
    let tdee = energy::tdee(bmr, profile.activity_factor);

    // bmr() has already required the weight for every formula
    let weight = profile
        .weight_kg
        .ok_or(EnergyError::MissingInput("weight_kg"))?;

    let cho_kcal = tdee * CHO_KCAL_SHARE;
    let pro_kcal = tdee * PRO_KCAL_SHARE;
    let fat_kcal = tdee - cho_kcal - pro_kcal;

    let cho_g = cho_kcal / KCAL_PER_G_CHO;
    let pro_g = (pro_kcal / KCAL_PER_G_PRO).max(weight * PRO_FLOOR_G_PER_KG);
    let fat_g = fat_kcal / KCAL_PER_G_FAT;

    Ok(DailyGoals {
        kcal_total: tdee,
        cho_g,
        pro_g,
        fat_g,
        per_meal_shares: shares.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BmrFormula, MealSlot, Sex};
    use std::collections::BTreeMap;

    fn profile(weight_kg: f64) -> Profile {
        Profile {
            sex: Sex::Male,
            height_cm: Some(175.0),
            weight_kg: Some(weight_kg),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 15),
            activity_factor: 1.55,
            formula: BmrFormula::Mifflin,
            body_fat_pct: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    #[test]
    fn test_macro_split_and_gram_conversion() {
        let goals = compute_daily_goals(&profile(70.0), today(), &MealShares::default()).unwrap();
        let tdee = goals.kcal_total;

        assert!((goals.cho_g - tdee * 0.50 / 4.0).abs() < 1e-9);
        assert!((goals.fat_g - tdee * 0.25 / 9.0).abs() < 1e-9);
        // 70 kg profile: 25% of kcal beats the 112 g floor at this TDEE
        assert!(goals.pro_g >= 70.0 * 1.6);
    }

    #[test]
    fn test_protein_floor_applies() {
        // Heavy profile with a modest TDEE: 25% of kcal in grams would be
        // below 1.6 g/kg, so the floor must win.
        let mut p = profile(100.0);
        p.activity_factor = 1.05;
        let goals = compute_daily_goals(&p, today(), &MealShares::default()).unwrap();

        assert!(goals.kcal_total * 0.25 / 4.0 < 160.0);
        assert!((goals.pro_g - 160.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let a = compute_daily_goals(&profile(70.0), today(), &MealShares::default()).unwrap();
        let b = compute_daily_goals(&profile(70.0), today(), &MealShares::default()).unwrap();
        assert_eq!(a.kcal_total, b.kcal_total);
        assert_eq!(a.cho_g, b.cho_g);
        assert_eq!(a.pro_g, b.pro_g);
        assert_eq!(a.fat_g, b.fat_g);
    }

    #[test]
    fn test_static_allocation_conserves_macros() {
        let goals = compute_daily_goals(&profile(70.0), today(), &MealShares::default()).unwrap();
        let alloc = goals.static_allocation();
        let totals = alloc.totals();

        assert!((totals.cho_g - goals.cho_g).abs() < 0.5);
        assert!((totals.pro_g - goals.pro_g).abs() < 0.5);
        assert!((totals.fat_g - goals.fat_g).abs() < 0.5);
        // Every slot is present and non-negative
        for slot in MealSlot::all() {
            let m = alloc.get(slot);
            assert!(m.cho_g >= 0.0 && m.pro_g >= 0.0 && m.fat_g >= 0.0);
            assert!((m.kcal - (m.cho_g * 4.0 + m.pro_g * 4.0 + m.fat_g * 9.0)).abs() < 0.1);
        }
    }

    #[test]
    fn test_skewed_shares_accepted() {
        // A non-summing map is a warning, not an error
        let mut map = BTreeMap::new();
        map.insert(MealSlot::Desayuno, 0.50);
        map.insert(MealSlot::Cena, 0.30);
        let shares = MealShares::new(map);
        let goals = compute_daily_goals(&profile(70.0), today(), &shares).unwrap();
        assert!((goals.per_meal_shares.sum() - 0.8).abs() < 1e-9);
    }
}
