//! fuelplan MCP server implementation
//!
//! Implements the MCP server with all targeting-engine tools. The server
//! is stateless: every tool receives its inputs as parameters and returns
//! a freshly computed value.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::engine::{self, DistributionConfig, FitConfig};
use crate::models::{
    CandidateMeal, DayWindow, MacroTotals, MealShares, Profile, Sex, Sport, TrainingActual,
    TrainingDay, TrainingIntent,
};
use crate::tools::status::{StatusTracker, NUTRITION_INSTRUCTIONS};
use crate::tools::{recommend, targets, training};

/// Engine policy configuration, fixed at startup
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub shares: MealShares,
    pub distribution: DistributionConfig,
    pub fit: FitConfig,
}

/// fuelplan MCP service
#[derive(Clone)]
pub struct FuelplanService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    config: Arc<EngineConfig>,
    tool_router: ToolRouter<FuelplanService>,
}

impl FuelplanService {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new())),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Parameter Structs
// ============================================================================

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date (expected YYYY-MM-DD): {:?}", s))
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| format!("invalid time (expected HH:MM): {:?}", s))
}

fn default_formula() -> String {
    "mifflin".to_string()
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProfileParams {
    /// "M" or "F"
    pub sex: String,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    /// Birth date, YYYY-MM-DD
    pub birth_date: Option<String>,
    /// Activity factor ("1.55") or level label (sedentario, ligero,
    /// moderado, alto, muy_alto)
    pub activity: Option<String>,
    /// BMR formula: "mifflin" (default) or "cunningham"
    #[serde(default = "default_formula")]
    pub bmr_formula: String,
    /// Body fat percentage 0-100 (used by cunningham)
    pub body_fat_pct: Option<f64>,
}

impl ProfileParams {
    fn into_profile(self) -> Result<Profile, String> {
        let sex = Sex::from_str(&self.sex).ok_or_else(|| format!("unknown sex: {:?}", self.sex))?;
        let formula = engine::parse_formula(&self.bmr_formula).map_err(|e| e.to_string())?;
        let birth_date = match self.birth_date.as_deref() {
            Some(s) => Some(parse_date(s)?),
            None => None,
        };

        Ok(Profile {
            sex,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            birth_date,
            activity_factor: engine::activity_factor(self.activity.as_deref()),
            formula,
            body_fat_pct: self.body_fat_pct,
        })
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SessionParams {
    /// Sport: run, bike, swim, or anything else (treated generically)
    pub sport: String,
    pub duration_min: f64,
    pub distance_km: Option<f64>,
    pub elevation_m: Option<f64>,
    pub avg_power_w: Option<f64>,
    pub avg_hr: Option<f64>,
    /// Device-recorded energy, if available
    pub kcal: Option<f64>,
    /// Start clock time, HH:MM
    pub started_at: Option<String>,
}

impl SessionParams {
    fn into_session(self, date: NaiveDate) -> Result<TrainingActual, String> {
        let started_at = match self.started_at.as_deref() {
            Some(s) => Some(parse_time(s)?),
            None => None,
        };

        Ok(TrainingActual {
            date,
            sport: Sport::from_str(&self.sport),
            duration_min: self.duration_min,
            distance_km: self.distance_km,
            elevation_m: self.elevation_m,
            avg_power_w: self.avg_power_w,
            avg_hr: self.avg_hr,
            kcal: self.kcal,
            started_at,
        })
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IntentParams {
    /// Day window: morning, afternoon, or evening
    pub window: String,
    pub sport: Option<String>,
    pub est_minutes: Option<f64>,
}

impl IntentParams {
    fn into_intent(self, date: NaiveDate) -> Result<TrainingIntent, String> {
        let window = DayWindow::from_str(&self.window)
            .ok_or_else(|| format!("unknown day window: {:?}", self.window))?;

        Ok(TrainingIntent {
            date,
            window,
            sport: self.sport.as_deref().map(Sport::from_str),
            est_minutes: self.est_minutes,
        })
    }
}

fn build_training_day(
    date: NaiveDate,
    sessions: Vec<SessionParams>,
    intent: Option<IntentParams>,
) -> Result<TrainingDay, String> {
    let sessions = sessions
        .into_iter()
        .map(|s| s.into_session(date))
        .collect::<Result<Vec<_>, _>>()?;
    let intent = match intent {
        Some(i) => Some(i.into_intent(date)?),
        None => None,
    };
    Ok(TrainingDay::new(intent, sessions))
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct MealTotalsParams {
    /// Optional; derived from the grams at 4/4/9 when absent
    pub kcal: Option<f64>,
    #[serde(default)]
    pub cho_g: f64,
    #[serde(default)]
    pub pro_g: f64,
    #[serde(default)]
    pub fat_g: f64,
}

impl MealTotalsParams {
    fn into_totals(self) -> MacroTotals {
        let mut totals = MacroTotals::from_grams(self.cho_g, self.pro_g, self.fat_g);
        if let Some(kcal) = self.kcal {
            totals.kcal = kcal;
        }
        totals
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CandidateParams {
    pub name: String,
    pub kcal: Option<f64>,
    #[serde(default)]
    pub cho_g: f64,
    #[serde(default)]
    pub pro_g: f64,
    #[serde(default)]
    pub fat_g: f64,
}

impl CandidateParams {
    fn into_candidate(self) -> CandidateMeal {
        let totals = MealTotalsParams {
            kcal: self.kcal,
            cho_g: self.cho_g,
            pro_g: self.pro_g,
            fat_g: self.fat_g,
        }
        .into_totals();
        CandidateMeal {
            name: self.name,
            totals,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ComputeDailyGoalsParams {
    /// Reference date for the age calculation, YYYY-MM-DD
    pub date: String,
    pub profile: ProfileParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDayTargetsParams {
    pub date: String,
    pub profile: ProfileParams,
    #[serde(default)]
    pub sessions: Vec<SessionParams>,
    pub intent: Option<IntentParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetTrainingContextParams {
    pub date: String,
    /// Current clock time, HH:MM
    pub now: String,
    #[serde(default)]
    pub sessions: Vec<SessionParams>,
    pub intent: Option<IntentParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DistributeMealTargetsParams {
    pub date: String,
    pub profile: ProfileParams,
    #[serde(default)]
    pub sessions: Vec<SessionParams>,
    pub intent: Option<IntentParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EvaluateMealParams {
    pub meal: MealTotalsParams,
    /// Training phase: pre, post, or neutral (default neutral)
    pub phase: Option<String>,
    pub weight_kg: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecommendMealsParams {
    pub date: String,
    /// Current clock time, HH:MM
    pub now: String,
    pub profile: ProfileParams,
    #[serde(default)]
    pub sessions: Vec<SessionParams>,
    pub intent: Option<IntentParams>,
    /// Macros already consumed today
    #[serde(default)]
    pub consumed: MealTotalsParams,
    /// Candidate meal templates to rank
    pub candidates: Vec<CandidateParams>,
}

// ============================================================================
// Tool implementations
// ============================================================================

fn json_result<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn invalid(e: String) -> McpError {
    McpError::invalid_params(e, None)
}

#[tool_router]
impl FuelplanService {
    #[tool(description = "Get the current status of the fuelplan service including build info and process information")]
    async fn engine_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        json_result(&tracker.get_status())
    }

    #[tool(description = "Get step-by-step instructions for computing nutrition targets and meal recommendations. Call this when starting a session or when unsure how to use the targeting tools.")]
    fn nutrition_instructions(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            NUTRITION_INSTRUCTIONS,
        )]))
    }

    #[tool(description = "Compute the daily energy and macro budget (TDEE, 50/25/25 split with a 1.6 g/kg protein floor) plus flat per-meal goals from a physiological profile")]
    fn compute_daily_goals(
        &self,
        Parameters(p): Parameters<ComputeDailyGoalsParams>,
    ) -> Result<CallToolResult, McpError> {
        let today = parse_date(&p.date).map_err(invalid)?;
        let profile = p.profile.into_profile().map_err(invalid)?;
        let result = targets::compute_daily_goals(&profile, today, &self.config.shares)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the day's targets: goal kcal raised by the estimated training energy, base macro targets, and green/amber tracking bands")]
    fn get_day_targets(
        &self,
        Parameters(p): Parameters<GetDayTargetsParams>,
    ) -> Result<CallToolResult, McpError> {
        let today = parse_date(&p.date).map_err(invalid)?;
        let profile = p.profile.into_profile().map_err(invalid)?;
        let day = build_training_day(today, p.sessions, p.intent).map_err(invalid)?;
        let result = targets::get_day_targets(&profile, today, &day, &self.config.shares)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Classify the current moment as pre/post/neutral relative to the day's training (recorded sessions first, then the planned intent's anchor), with per-session energy estimates")]
    fn get_training_context(
        &self,
        Parameters(p): Parameters<GetTrainingContextParams>,
    ) -> Result<CallToolResult, McpError> {
        let date = parse_date(&p.date).map_err(invalid)?;
        let now = parse_time(&p.now).map_err(invalid)?;
        let day = build_training_day(date, p.sessions, p.intent).map_err(invalid)?;
        json_result(&training::get_training_context(&day, now))
    }

    #[tool(description = "Distribute the day's macro budget across the meal slots. With a usable training session the plan boosts carbs/protein toward the pre/post-training meals and trims fat near training; otherwise the flat static plan is returned, marked distribution=static.")]
    fn distribute_meal_targets(
        &self,
        Parameters(p): Parameters<DistributeMealTargetsParams>,
    ) -> Result<CallToolResult, McpError> {
        let today = parse_date(&p.date).map_err(invalid)?;
        let profile = p.profile.into_profile().map_err(invalid)?;
        let day = build_training_day(today, p.sessions, p.intent).map_err(invalid)?;
        let result = targets::distribute_meal_targets(
            &profile,
            today,
            &day,
            &self.config.shares,
            &self.config.distribution,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Evaluate one meal's macros against the phase-specific guidelines (pre: carbs 45-90 g / fat <= 15 g; post: protein ~0.3 g/kg / carbs 40-80 g; neutral: 50/20/30 shares). Returns ok/adjust with hints.")]
    fn evaluate_meal(
        &self,
        Parameters(p): Parameters<EvaluateMealParams>,
    ) -> Result<CallToolResult, McpError> {
        let phase = training::parse_phase(p.phase.as_deref()).map_err(invalid)?;
        json_result(&recommend::evaluate_meal(
            &p.meal.into_totals(),
            phase,
            p.weight_kg,
        ))
    }

    #[tool(description = "Rank candidate meal templates by 0-100 fit score against the day's remaining budget and the current training phase, with reasons and per-candidate guideline verdicts")]
    fn recommend_meals(
        &self,
        Parameters(p): Parameters<RecommendMealsParams>,
    ) -> Result<CallToolResult, McpError> {
        let today = parse_date(&p.date).map_err(invalid)?;
        let now = parse_time(&p.now).map_err(invalid)?;
        let profile = p.profile.into_profile().map_err(invalid)?;
        let day = build_training_day(today, p.sessions, p.intent).map_err(invalid)?;
        let consumed = p.consumed.into_totals();
        let candidates: Vec<CandidateMeal> =
            p.candidates.into_iter().map(|c| c.into_candidate()).collect();
        let result = recommend::recommend_meals(
            &profile,
            today,
            now,
            &day,
            &consumed,
            &candidates,
            &self.config.shares,
            &self.config.fit,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for FuelplanService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "fuelplan".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("fuelplan nutrition targeting engine".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "fuelplan - training-aware nutrition targeting. \
                 IMPORTANT: Call nutrition_instructions first for the workflow. \
                 Targets: compute_daily_goals (TDEE + macro budget), get_day_targets \
                 (training-adjusted kcal + tracking bands). \
                 Planning: distribute_meal_targets (per-meal macro plan around training). \
                 Context: get_training_context (pre/post/neutral for the current time). \
                 Meals: evaluate_meal (guideline check), recommend_meals (ranked fit scores). \
                 All tools are stateless; pass profile, sessions, and consumption data \
                 explicitly, with dates as YYYY-MM-DD and times as HH:MM."
                    .into(),
            ),
        }
    }
}
