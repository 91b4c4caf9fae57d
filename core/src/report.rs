//! Report compiler — reduces the insight bag into an executive summary and a
//! rule-driven recommendation list.
//!
//! RULE: The compiler reads only the insight bag and the config. It never
//! touches the case table, so a report can be recompiled from saved insights.

use crate::{
    config::InsightsConfig,
    inefficiency_analyzer::Inefficiencies,
    kpi_analyzer::Kpis,
    pattern_analyzer::Patterns,
    risk_analyzer::Risks,
    root_cause_analyzer::RootCauseAnalysis,
    stats::{round2, Tally},
    warning::LoadWarning,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The five analyses of one report, keyed by analysis name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightBag {
    pub kpis:                Kpis,
    pub patterns:            Patterns,
    pub risks:               Risks,
    pub inefficiencies:      Inefficiencies,
    pub root_cause_analysis: RootCauseAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopRiskArea {
    pub risk_type: String,
    pub area:      String,
    pub count:     usize,
    pub severity:  String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutiveSummary {
    pub total_cases:         usize,
    pub closure_rate:        f64,
    pub sla_compliance_rate: f64,
    pub high_priority_open:  usize,
    pub sla_at_risk_count:   usize,
    pub aging_cases_count:   usize,
    pub top_risk_areas:      Vec<TopRiskArea>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub category:       String,
    pub priority:       Priority,
    pub recommendation: String,
    pub action_items:   Vec<String>,
}

/// A compiled report. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightReport {
    pub generated_at:      NaiveDateTime,
    pub executive_summary: ExecutiveSummary,
    pub insights:          InsightBag,
    pub recommendations:   Vec<Recommendation>,
    pub warnings:          Vec<LoadWarning>,
}

impl InsightReport {
    pub fn compile(
        generated_at: NaiveDateTime,
        insights: InsightBag,
        config: &InsightsConfig,
        warnings: Vec<LoadWarning>,
    ) -> Self {
        let executive_summary = executive_summary(&insights, config);
        let recommendations = recommendations(&insights, config);
        log::info!(
            "Compiled report: {} cases, {} recommendations",
            executive_summary.total_cases,
            recommendations.len(),
        );
        Self { generated_at, executive_summary, insights, recommendations, warnings }
    }

    /// Highest-priority recommendations first; stable within a priority.
    pub fn recommendations_by_priority(&self) -> Vec<&Recommendation> {
        let mut recs: Vec<&Recommendation> = self.recommendations.iter().collect();
        recs.sort_by_key(|r| r.priority);
        recs
    }
}

pub fn executive_summary(bag: &InsightBag, config: &InsightsConfig) -> ExecutiveSummary {
    ExecutiveSummary {
        total_cases:         bag.kpis.total_cases,
        closure_rate:        round2(bag.kpis.closure_rate),
        sla_compliance_rate: round2(bag.kpis.sla_compliance_rate),
        high_priority_open:  bag.risks.high_priority_open.len(),
        sla_at_risk_count:   bag.risks.sla_at_risk.len(),
        aging_cases_count:   bag.risks.aging_cases.len(),
        top_risk_areas:      top_risk_areas(&bag.risks, config),
    }
}

/// Groups holding the most high-priority open cases, then the case types
/// holding the most SLA-at-risk cases.
pub fn top_risk_areas(risks: &Risks, config: &InsightsConfig) -> Vec<TopRiskArea> {
    let cfg = &config.recommendations;
    let by_group: Tally<String> = risks
        .high_priority_open
        .iter()
        .map(|c| c.assignment_group.clone())
        .collect();
    let by_type: Tally<String> = risks.sla_at_risk.iter().map(|c| c.case_type.clone()).collect();

    let to_area = |risk_type: &str, (area, count): (String, usize)| TopRiskArea {
        risk_type: risk_type.into(),
        area,
        count,
        severity: "High".into(),
    };

    by_group
        .top(cfg.top_risk_groups)
        .into_iter()
        .map(|entry| to_area("High Priority Open Cases", entry))
        .chain(by_type.top(cfg.top_risk_types).into_iter().map(|entry| to_area("SLA At Risk", entry)))
        .collect()
}

// ── Recommendation rules ─────────────────────────────────────────────────────
// Evaluated in this order; each rule contributes at most one entry.

pub fn recommendations(bag: &InsightBag, config: &InsightsConfig) -> Vec<Recommendation> {
    let cfg = &config.recommendations;
    let mut recs = Vec::new();

    let compliance = bag.kpis.sla_compliance_rate;
    if compliance < cfg.sla_compliance_floor {
        recs.push(recommendation(
            "SLA Compliance",
            Priority::High,
            format!(
                "Improve SLA compliance (currently {compliance:.1}%). Focus on cases at risk of breach."
            ),
            &[
                "Review and prioritize cases approaching SLA deadlines",
                "Reallocate resources to high-risk cases",
                "Implement automated SLA monitoring alerts",
            ],
        ));
    }

    if bag.inefficiencies.bottlenecks.any_group() {
        recs.push(recommendation(
            "Process Efficiency",
            Priority::High,
            "Address bottlenecks in assignment groups with high workload and slow resolution".into(),
            &[
                "Review workload distribution across teams",
                "Identify training needs for slow-resolving groups",
                "Consider resource reallocation",
            ],
        ));
    }

    if let Some(top) = bag
        .inefficiencies
        .recurring_issues
        .first()
        .filter(|r| r.frequency > cfg.recurring_alert_frequency)
    {
        recs.push(recommendation(
            "Preventive Measures",
            Priority::Medium,
            format!(
                "Address recurring issue: {} (occurs {} times)",
                top.case_type, top.frequency
            ),
            &[
                "Investigate root cause of recurring case type",
                "Implement preventive controls",
                "Create knowledge base articles for common resolution",
            ],
        ));
    }

    let high_open = bag.risks.high_priority_open.len();
    if high_open > 0 {
        recs.push(recommendation(
            "Risk Management",
            Priority::Critical,
            format!("Immediately address {high_open} high priority open cases"),
            &[
                "Escalate high priority cases to management",
                "Assign dedicated resources",
                "Implement daily review process",
            ],
        ));
    }

    recs
}

fn recommendation(
    category: &str,
    priority: Priority,
    text: String,
    action_items: &[&str],
) -> Recommendation {
    Recommendation {
        category: category.into(),
        priority,
        recommendation: text,
        action_items: action_items.iter().map(|s| s.to_string()).collect(),
    }
}
