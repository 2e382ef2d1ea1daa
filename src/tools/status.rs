//! fuelplan status tool
//!
//! Provides runtime status information about the service.

use serde::Serialize;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Usage instructions for AI assistants
pub const NUTRITION_INSTRUCTIONS: &str = r#"
# fuelplan Nutrition Targeting Instructions

This guide explains how to compute daily targets and meal recommendations
with the fuelplan tools. The engine is stateless: every tool receives the
profile, training, and consumption data it needs as parameters and returns
a computed value. Nothing is stored between calls.

## Typical workflow

1. **Daily goals** - Call `compute_daily_goals` with the physiological
   profile (sex, height, weight, birth date, activity, BMR formula).
   Returns TDEE, the daily macro budget (50/25/25 split with a 1.6 g/kg
   protein floor), and the flat per-meal shares.

2. **Day targets** - Call `get_day_targets` with the profile plus the
   day's training sessions. Returns the goal kcal raised by the estimated
   training energy, plus green/amber traffic-light bands per metric.
   Macro gram targets are not inflated by training.

3. **Meal plan** - Call `distribute_meal_targets` with the profile and
   sessions. When a session has a usable start time (recorded, or a
   planned intent's day-window anchor), the response is a dynamic plan
   that boosts carbs toward the pre/post-training meals, boosts protein
   after training, and trims fat near training. Otherwise the response is
   the static flat-share plan, marked `"distribution": "static"`.

4. **Training context** - Call `get_training_context` with the sessions
   and the current clock time (HH:MM) to classify the moment as
   `pre`, `post`, or `neutral`.

5. **Recommendations** - Call `recommend_meals` with saved meal templates,
   the meals already eaten today, the profile, the sessions, and the
   current time. Candidates come back ranked by a 0-100 fit score with
   reasons and per-candidate pass/adjust guidance.

## Dates and times

- Dates are `YYYY-MM-DD`, clock times are `HH:MM`.
- The engine never reads the system clock; always pass the caller's
  current date/time explicitly. Do not guess dates - use a calendar
  source.

## Required profile fields

- `mifflin` (default) needs sex, weight_kg, height_cm, and birth_date.
- `cunningham` needs weight_kg; body_fat_pct is optional (70% lean mass
  is assumed without it).
- Missing required fields are reported as errors so the user can complete
  their profile; they are never silently defaulted.
"#;

/// Current status of the service
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Tracks service start time for status reporting
pub struct StatusTracker {
    start_time: Instant,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> EngineStatus {
        let build_info = BuildInfo::current();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        EngineStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}
