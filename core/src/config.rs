use crate::{
    error::{InsightError, InsightResult},
    types::{Days, SeverityRank},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Built-in severity → SLA days fallback.
pub const DEFAULT_SLA_DAYS: [(SeverityRank, Days); 5] = [
    (0, 1.0),  // Critical
    (1, 5.0),  // High
    (2, 10.0), // Medium
    (3, 20.0), // Low
    (4, 30.0), // Informational
];

// ── Case table column names ─────────────────────────────────────────

pub const COL_CASE_ID: &str = "Case Id";
pub const COL_CREATED: &str = "Create Date";
pub const COL_UPDATED: &str = "Updated On";
pub const COL_CLOSED: &str = "End Date";
pub const COL_SEVERITY: &str = "Case Severity";
pub const COL_STATUS: &str = "CaseStatus";
pub const COL_TYPE: &str = "Case Type";
pub const COL_GROUP: &str = "AssignmentGroup";
pub const COL_SOURCE: &str = "Case Source";
pub const COL_SUMMARY: &str = "Case CurrentSummary";
pub const COL_RESOLUTION: &str = "Case Resolution";

// ── SLA sheet column names ──────────────────────────────────────────

pub const SLA_COL_TEAM: &str = "Team";
pub const SLA_COL_SEVERITY: &str = "Severity";
pub const SLA_COL_TTR_HOURS: &str = "TTR_Hours";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskConfig {
    pub sla_at_risk_pct: f64,
    pub at_risk_limit: usize,
    pub aging_days: Days,
    pub aging_limit: usize,
    pub escalation_statuses: Vec<String>,
    pub escalation_days: Days,
    pub high_update_count: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            sla_at_risk_pct: 75.0,
            at_risk_limit: 20,
            aging_days: 30.0,
            aging_limit: 20,
            escalation_statuses: vec!["Analysis".into(), "Contain".into(), "Review".into()],
            escalation_days: 7.0,
            high_update_count: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatternConfig {
    pub peak_hours: usize,
    pub top_types: usize,
    pub stuck_statuses: Vec<String>,
    pub stuck_days: Days,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            peak_hours: 5,
            top_types: 10,
            stuck_statuses: vec![
                "Analysis".into(),
                "Contain".into(),
                "Review".into(),
                "Draft".into(),
            ],
            stuck_days: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InefficiencyConfig {
    pub workload_quantile: f64,
    pub recurring_min_frequency: usize,
    pub recurring_top_summaries: usize,
    pub draft_age_days: i64,
}

impl Default for InefficiencyConfig {
    fn default() -> Self {
        Self {
            workload_quantile: 0.75,
            recurring_min_frequency: 5,
            recurring_top_summaries: 3,
            draft_age_days: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RootCauseConfig {
    /// Tokens must be strictly longer than this many characters.
    pub min_token_len: usize,
    pub top_tokens: usize,
}

impl Default for RootCauseConfig {
    fn default() -> Self {
        Self { min_token_len: 4, top_tokens: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecommendationConfig {
    pub sla_compliance_floor: f64,
    pub recurring_alert_frequency: usize,
    pub top_risk_groups: usize,
    pub top_risk_types: usize,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            sla_compliance_floor: 80.0,
            recurring_alert_frequency: 10,
            top_risk_groups: 5,
            top_risk_types: 3,
        }
    }
}

/// Every tunable threshold of the pipeline. All fields default,
/// so a config file only needs to name what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InsightsConfig {
    pub default_sla_days: BTreeMap<SeverityRank, Days>,
    pub terminal_status: String,
    pub draft_status: String,
    pub risk: RiskConfig,
    pub patterns: PatternConfig,
    pub inefficiency: InefficiencyConfig,
    pub root_cause: RootCauseConfig,
    pub recommendations: RecommendationConfig,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            default_sla_days: DEFAULT_SLA_DAYS.into_iter().collect(),
            terminal_status: "Closed".into(),
            draft_status: "Draft".into(),
            risk: RiskConfig::default(),
            patterns: PatternConfig::default(),
            inefficiency: InefficiencyConfig::default(),
            root_cause: RootCauseConfig::default(),
            recommendations: RecommendationConfig::default(),
        }
    }
}

impl InsightsConfig {
    /// Load overrides from a JSON file. Fields not present keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> InsightResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: InsightsConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!("Loaded insights configuration from {}", path.display());
        Ok(config)
    }

    /// Replace the default SLA map, e.g. from a caller-supplied override.
    pub fn with_default_sla_days(mut self, days: BTreeMap<SeverityRank, Days>) -> Self {
        self.default_sla_days = days;
        self
    }

    pub fn validate(&self) -> InsightResult<()> {
        let q = self.inefficiency.workload_quantile;
        if !(0.0..=1.0).contains(&q) {
            return Err(InsightError::Config(format!(
                "workload_quantile must lie in [0, 1], got {q}"
            )));
        }
        if self.terminal_status.trim().is_empty() {
            return Err(InsightError::Config("terminal_status must not be empty".into()));
        }
        if let Some((sev, days)) = self
            .default_sla_days
            .iter()
            .find(|(_, d)| !d.is_finite() || **d < 0.0)
        {
            return Err(InsightError::Config(format!(
                "default SLA for severity {sev} must be a non-negative number, got {days}"
            )));
        }
        Ok(())
    }
}
