//! Training session models
//!
//! A day's training is either a planned intent (at most one per date) or a
//! set of recorded sessions. Recording an actual session supersedes the
//! intent for that date; `TrainingDay` enforces that reading.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Sport type, used for kcal/minute heuristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Run,
    Bike,
    Swim,
    Other,
}

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Run => "run",
            Sport::Bike => "bike",
            Sport::Swim => "swim",
            Sport::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "run" | "running" => Sport::Run,
            "bike" | "cycling" => Sport::Bike,
            "swim" | "swimming" => Sport::Swim,
            _ => Sport::Other,
        }
    }
}

/// Part of the day a planned session is expected in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayWindow {
    Morning,
    Afternoon,
    Evening,
}

impl DayWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayWindow::Morning => "morning",
            DayWindow::Afternoon => "afternoon",
            DayWindow::Evening => "evening",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Some(DayWindow::Morning),
            "afternoon" => Some(DayWindow::Afternoon),
            "evening" => Some(DayWindow::Evening),
            _ => None,
        }
    }

    /// Anchor clock time used when a planned session has no recorded start
    pub fn anchor_time(&self) -> NaiveTime {
        match self {
            DayWindow::Morning => NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            DayWindow::Afternoon => NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            DayWindow::Evening => NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        }
    }
}

/// Planned training intent for a date (at most one per date)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingIntent {
    pub date: NaiveDate,
    pub window: DayWindow,
    pub sport: Option<Sport>,
    pub est_minutes: Option<f64>,
}

/// A recorded training session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingActual {
    pub date: NaiveDate,
    pub sport: Sport,
    pub duration_min: f64,
    pub distance_km: Option<f64>,
    pub elevation_m: Option<f64>,
    pub avg_power_w: Option<f64>,
    pub avg_hr: Option<f64>,
    /// Session energy as recorded by the device, if any
    pub kcal: Option<f64>,
    /// Start clock time, when known
    pub started_at: Option<NaiveTime>,
}

/// One date's training facts: zero-or-one intent and zero-or-many sessions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingDay {
    intent: Option<TrainingIntent>,
    sessions: Vec<TrainingActual>,
}

impl TrainingDay {
    pub fn new(intent: Option<TrainingIntent>, sessions: Vec<TrainingActual>) -> Self {
        Self { intent, sessions }
    }

    /// The planned intent, visible only while no session has been recorded.
    ///
    /// Planned and realized are mutually exclusive views of "what happened";
    /// once a session exists the intent no longer drives anything.
    pub fn intent(&self) -> Option<&TrainingIntent> {
        if self.sessions.is_empty() {
            self.intent.as_ref()
        } else {
            None
        }
    }

    pub fn sessions(&self) -> &[TrainingActual] {
        &self.sessions
    }

    pub fn has_training(&self) -> bool {
        !self.sessions.is_empty() || self.intent.is_some()
    }
}
