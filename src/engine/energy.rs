//! Energy model
//!
//! BMR formulas (Mifflin-St Jeor, Cunningham), TDEE, age arithmetic, and
//! activity-factor normalization.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::models::{BmrFormula, Profile, Sex};

/// TDEE safety bounds: extremes outside this range come from malformed
/// input, not physiology.
const TDEE_MIN_KCAL: f64 = 1200.0;
const TDEE_MAX_KCAL: f64 = 4500.0;

/// Activity factor used when the input is absent or unparseable
const DEFAULT_ACTIVITY_FACTOR: f64 = 1.55;

/// Lean-mass fraction assumed by Cunningham when body fat is not recorded
const DEFAULT_LEAN_FRACTION: f64 = 0.70;

/// Energy model error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnergyError {
    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    #[error("unsupported BMR formula: {0:?}")]
    UnsupportedFormula(String),
}

/// Parse a formula name, surfacing unknown names as a typed failure.
///
/// Never silently falls back to a different formula.
pub fn parse_formula(name: &str) -> Result<BmrFormula, EnergyError> {
    BmrFormula::from_str(name).ok_or_else(|| EnergyError::UnsupportedFormula(name.to_string()))
}

/// Whole years between `birth_date` and `today`, with month/day tie-break:
/// a birthday not yet reached this year subtracts one.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> f64 {
    let mut years = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    years as f64
}

/// Normalize an activity input to a factor.
///
/// Accepts a numeric factor ("1.55", with comma decimals tolerated) or a
/// level label; numbers outside [1.05, 3.5] and unknown labels fall back to
/// the moderate default.
pub fn activity_factor(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return DEFAULT_ACTIVITY_FACTOR;
    };

    let s = raw.trim().to_lowercase();
    if let Ok(x) = s.replace(',', ".").parse::<f64>() {
        if (1.05..=3.5).contains(&x) {
            return x;
        }
        return DEFAULT_ACTIVITY_FACTOR;
    }

    match s.as_str() {
        "sedentario" => 1.2,
        "ligero" => 1.375,
        "moderado" => 1.55,
        "alto" => 1.725,
        "muy_alto" => 1.9,
        _ => DEFAULT_ACTIVITY_FACTOR,
    }
}

/// Mifflin-St Jeor BMR
pub fn bmr_mifflin(sex: Sex, weight_kg: f64, height_cm: f64, age_years: f64) -> f64 {
    let adjustment = match sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years + adjustment
}

/// Cunningham BMR from lean mass.
///
/// Without a recorded body fat percentage, lean mass is assumed to be 70%
/// of body weight.
pub fn bmr_cunningham(weight_kg: f64, body_fat_pct: Option<f64>) -> f64 {
    let lean_fraction = match body_fat_pct {
        Some(pct) => 1.0 - pct / 100.0,
        None => DEFAULT_LEAN_FRACTION,
    };
    500.0 * weight_kg * lean_fraction
}

/// BMR for a profile at a given age, dispatching on the profile's formula.
///
/// Missing required fields are propagated, never silently defaulted: they
/// represent incomplete user setup.
pub fn bmr(profile: &Profile, age_years: Option<f64>) -> Result<f64, EnergyError> {
    let weight = profile
        .weight_kg
        .ok_or(EnergyError::MissingInput("weight_kg"))?;

    match profile.formula {
        BmrFormula::Mifflin => {
            let height = profile
                .height_cm
                .ok_or(EnergyError::MissingInput("height_cm"))?;
            let age = age_years.ok_or(EnergyError::MissingInput("birth_date"))?;
            Ok(bmr_mifflin(profile.sex, weight, height, age))
        }
        BmrFormula::Cunningham => Ok(bmr_cunningham(weight, profile.body_fat_pct)),
    }
}

/// TDEE = BMR x activity factor, clamped to the safety bounds
pub fn tdee(bmr: f64, activity_factor: f64) -> f64 {
    (bmr * activity_factor).clamp(TDEE_MIN_KCAL, TDEE_MAX_KCAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BmrFormula;

    fn mifflin_profile() -> Profile {
        Profile {
            sex: Sex::Male,
            height_cm: Some(175.0),
            weight_kg: Some(70.0),
            birth_date: NaiveDate::from_ymd_opt(2000, 6, 29),
            activity_factor: 1.55,
            formula: BmrFormula::Mifflin,
            body_fat_pct: None,
        }
    }

    #[test]
    fn test_age_whole_years_with_tie_break() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        // Birthday already passed this year
        assert_eq!(age_on(NaiveDate::from_ymd_opt(2000, 6, 29).unwrap(), today), 25.0);
        // Birthday exactly today
        assert_eq!(age_on(NaiveDate::from_ymd_opt(2000, 6, 30).unwrap(), today), 25.0);
        // Birthday still ahead
        assert_eq!(age_on(NaiveDate::from_ymd_opt(2000, 7, 1).unwrap(), today), 24.0);
    }

    #[test]
    fn test_bmr_mifflin_male() {
        let expected = 10.0 * 70.0 + 6.25 * 175.0 - 5.0 * 25.0 + 5.0;
        assert!((bmr_mifflin(Sex::Male, 70.0, 175.0, 25.0) - expected).abs() < 1e-9);
        assert!((expected - 1673.75).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_mifflin_female() {
        let expected = 10.0 * 60.0 + 6.25 * 165.0 - 5.0 * 30.0 - 161.0;
        assert!((bmr_mifflin(Sex::Female, 60.0, 165.0, 30.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_cunningham_with_body_fat() {
        // 15% body fat: lean mass = 70 * 0.85 = 59.5 kg
        assert!((bmr_cunningham(70.0, Some(15.0)) - 500.0 * 59.5).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_cunningham_default_lean_fraction() {
        assert!((bmr_cunningham(70.0, None) - 500.0 * 70.0 * 0.70).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_missing_height_errors() {
        let mut profile = mifflin_profile();
        profile.height_cm = None;
        assert_eq!(
            bmr(&profile, Some(25.0)),
            Err(EnergyError::MissingInput("height_cm"))
        );
    }

    #[test]
    fn test_bmr_missing_weight_errors() {
        let mut profile = mifflin_profile();
        profile.weight_kg = None;
        assert_eq!(
            bmr(&profile, Some(25.0)),
            Err(EnergyError::MissingInput("weight_kg"))
        );
    }

    #[test]
    fn test_bmr_missing_age_errors_for_mifflin_only() {
        let mut profile = mifflin_profile();
        assert_eq!(
            bmr(&profile, None),
            Err(EnergyError::MissingInput("birth_date"))
        );
        // Cunningham does not need an age
        profile.formula = BmrFormula::Cunningham;
        assert!(bmr(&profile, None).is_ok());
    }

    #[test]
    fn test_parse_formula_unknown_errors() {
        assert_eq!(parse_formula("mifflin"), Ok(BmrFormula::Mifflin));
        assert_eq!(parse_formula("Cunningham"), Ok(BmrFormula::Cunningham));
        assert_eq!(
            parse_formula("foo"),
            Err(EnergyError::UnsupportedFormula("foo".to_string()))
        );
    }

    #[test]
    fn test_tdee_clamped() {
        assert!((tdee(1000.0, 1.2) - 1200.0).abs() < 1e-9);
        assert!((tdee(500.0, 1.2) - 1200.0).abs() < 1e-9);
        assert!((tdee(10_000.0, 1.9) - 4500.0).abs() < 1e-9);
    }

    #[test]
    fn test_activity_factor_inputs() {
        assert!((activity_factor(None) - 1.55).abs() < 1e-9);
        assert!((activity_factor(Some("1.725")) - 1.725).abs() < 1e-9);
        assert!((activity_factor(Some("1,2")) - 1.2).abs() < 1e-9);
        assert!((activity_factor(Some("sedentario")) - 1.2).abs() < 1e-9);
        assert!((activity_factor(Some("muy_alto")) - 1.9).abs() < 1e-9);
        // Out of range and unknown labels fall back
        assert!((activity_factor(Some("9.0")) - 1.55).abs() < 1e-9);
        assert!((activity_factor(Some("couch")) - 1.55).abs() < 1e-9);
    }
}
