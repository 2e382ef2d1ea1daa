//! Training context and energy estimation
//!
//! Classifies a moment of the day as pre/post/neutral relative to the
//! day's training, and estimates session energy when the device did not
//! record it.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::{Sport, TrainingActual, TrainingDay};

/// Minutes before a session start that count as "pre-training"
const PRE_WINDOW_MIN: f64 = 90.0;

/// Minutes after a session end that count as "post-training"
const POST_WINDOW_MIN: f64 = 120.0;

/// Assumed session length when an intent has no estimated minutes
const DEFAULT_SESSION_MIN: f64 = 60.0;

/// Training phase relative to a moment of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingPhase {
    Pre,
    Post,
    Neutral,
}

impl TrainingPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingPhase::Pre => "pre",
            TrainingPhase::Post => "post",
            TrainingPhase::Neutral => "neutral",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pre" => Some(TrainingPhase::Pre),
            "post" => Some(TrainingPhase::Post),
            "neutral" => Some(TrainingPhase::Neutral),
            _ => None,
        }
    }
}

/// Which source produced the phase, for traceability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseBasis {
    Actual,
    Intent,
    None,
}

impl PhaseBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseBasis::Actual => "actual",
            PhaseBasis::Intent => "intent",
            PhaseBasis::None => "none",
        }
    }
}

/// Result of classifying "now" against the day's training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingContext {
    pub phase: TrainingPhase,
    /// Signed minutes from now to the event start (negative once started)
    pub minutes_to_event: Option<f64>,
    pub basis: PhaseBasis,
}

impl TrainingContext {
    fn neutral() -> Self {
        Self {
            phase: TrainingPhase::Neutral,
            minutes_to_event: None,
            basis: PhaseBasis::None,
        }
    }
}

/// Minutes since midnight. Windows do not wrap across midnight: the day is
/// the scope of the classification.
fn minutes(t: NaiveTime) -> f64 {
    f64::from(t.num_seconds_from_midnight()) / 60.0
}

/// Classify a (start, end) interval against "now". Returns the phase and
/// the signed minutes to the start when now falls in a window.
fn classify(now_min: f64, start_min: f64, end_min: f64) -> Option<(TrainingPhase, f64)> {
    let to_start = start_min - now_min;
    if now_min < start_min && to_start <= PRE_WINDOW_MIN {
        return Some((TrainingPhase::Pre, to_start));
    }
    if now_min >= start_min && now_min <= end_min + POST_WINDOW_MIN {
        return Some((TrainingPhase::Post, to_start));
    }
    None
}

/// Resolve the training phase for "now" against a day's training facts.
///
/// Recorded sessions with a start time are checked first, in clock order;
/// a planned intent (only visible while nothing was recorded) is anchored
/// to its day-window time. Everything else is neutral.
pub fn resolve_training_context(day: &TrainingDay, now: NaiveTime) -> TrainingContext {
    let now_min = minutes(now);

    let mut timed: Vec<(NaiveTime, &TrainingActual)> = day
        .sessions()
        .iter()
        .filter_map(|s| s.started_at.map(|t| (t, s)))
        .collect();
    timed.sort_by_key(|(t, _)| *t);

    for (started_at, session) in timed {
        let start = minutes(started_at);
        let end = start + session.duration_min.max(0.0);
        if let Some((phase, to_start)) = classify(now_min, start, end) {
            return TrainingContext {
                phase,
                minutes_to_event: Some(to_start),
                basis: PhaseBasis::Actual,
            };
        }
    }

    if let Some(intent) = day.intent() {
        let start = minutes(intent.window.anchor_time());
        let end = start + intent.est_minutes.unwrap_or(DEFAULT_SESSION_MIN).max(0.0);
        if let Some((phase, to_start)) = classify(now_min, start, end) {
            return TrainingContext {
                phase,
                minutes_to_event: Some(to_start),
                basis: PhaseBasis::Intent,
            };
        }
    }

    TrainingContext::neutral()
}

/// Estimated kcal burned in a session.
///
/// Uses the recorded value when positive; otherwise duration times a
/// sport-specific kcal/minute rate. Cycling power, when present, adjusts
/// the rate within a plausible band. A session with neither kcal nor a
/// usable duration contributes zero.
pub fn session_kcal(session: &TrainingActual) -> f64 {
    if let Some(kcal) = session.kcal {
        if kcal > 0.0 {
            return kcal;
        }
    }

    let duration = session.duration_min.max(0.0);
    let per_min = match session.sport {
        Sport::Bike => match session.avg_power_w {
            Some(w) if w > 0.0 => (w / 20.0).clamp(7.0, 14.0),
            _ => 10.0,
        },
        Sport::Run => 11.0,
        Sport::Swim => 9.0,
        Sport::Other => 8.0,
    };

    duration * per_min
}

/// Total estimated training kcal for the day (recorded sessions only)
pub fn day_training_kcal(day: &TrainingDay) -> f64 {
    day.sessions().iter().map(session_kcal).sum()
}
