//! Training context tool

use chrono::NaiveTime;
use serde::Serialize;

use crate::engine::{self, TrainingPhase};
use crate::models::TrainingDay;

/// One session with its serialized time and estimated energy
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub sport: &'static str,
    pub duration_min: f64,
    pub distance_km: Option<f64>,
    pub elevation_m: Option<f64>,
    pub avg_power_w: Option<f64>,
    pub avg_hr: Option<f64>,
    pub started_at: Option<String>,
    pub kcal: f64,
}

/// Response for get_training_context
#[derive(Debug, Serialize)]
pub struct TrainingContextResponse {
    pub phase: &'static str,
    pub basis: &'static str,
    pub minutes_to_event: Option<f64>,
    pub has_training: bool,
    pub kcal_extra: f64,
    pub sessions: Vec<SessionSummary>,
}

/// Classify "now" against the day's training and summarize the sessions.
pub fn get_training_context(day: &TrainingDay, now: NaiveTime) -> TrainingContextResponse {
    let ctx = engine::resolve_training_context(day, now);

    let sessions: Vec<SessionSummary> = day
        .sessions()
        .iter()
        .map(|s| SessionSummary {
            sport: s.sport.as_str(),
            duration_min: s.duration_min,
            distance_km: s.distance_km,
            elevation_m: s.elevation_m,
            avg_power_w: s.avg_power_w,
            avg_hr: s.avg_hr,
            started_at: s.started_at.map(|t| t.format("%H:%M").to_string()),
            kcal: engine::session_kcal(s),
        })
        .collect();

    TrainingContextResponse {
        phase: ctx.phase.as_str(),
        basis: ctx.basis.as_str(),
        minutes_to_event: ctx.minutes_to_event,
        has_training: day.has_training(),
        kcal_extra: engine::day_training_kcal(day),
        sessions,
    }
}

/// Parse a phase string coming from a tool parameter, defaulting to
/// neutral for absent input.
pub fn parse_phase(raw: Option<&str>) -> Result<TrainingPhase, String> {
    match raw {
        None => Ok(TrainingPhase::Neutral),
        Some(s) => {
            TrainingPhase::from_str(s).ok_or_else(|| format!("unknown training phase: {:?}", s))
        }
    }
}
