//! Narrative context — the condensed, deterministic view of a report that
//! the narrative layer sends upstream.
//!
//! RULE: The narrative layer sees this context, the insight bag and at most
//! a small sample of case summaries. No full case row ever leaves the engine.

use crate::{
    inefficiency_analyzer::{Bottlenecks, RecurringIssue},
    report::{ExecutiveSummary, InsightReport},
    severity::severity_name,
    stats::{LabelCount, Tally},
    table::CaseTable,
    types::{Days, SeverityRank},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

const SEVERITY_SAMPLE: usize = 10;
const RISK_BREAKDOWN_CASES: usize = 20;
const TOP_CASE_TYPES: usize = 10;
const TOP_GROUPS: usize = 10;
const TOP_RECURRING: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyMetrics {
    pub total_cases:        usize,
    pub closure_rate:       f64,
    pub sla_compliance:     f64,
    pub high_priority_open: usize,
    pub sla_at_risk:        usize,
    pub aging_cases:        usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSample {
    pub total_rows:            usize,
    pub columns:               Vec<String>,
    pub severity_distribution: Vec<LabelCount>,
    pub status_distribution:   Vec<LabelCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskCounts {
    pub sla_at_risk_count:        usize,
    pub high_priority_open_count: usize,
    pub aging_cases_count:        usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Breakdown {
    pub by_group: BTreeMap<String, usize>,
    pub by_type:  BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NarrativeContext {
    pub executive_summary:       ExecutiveSummary,
    pub key_metrics:             KeyMetrics,
    pub data_sample:             DataSample,
    pub top_risks:               RiskCounts,
    /// Absent when nothing is at risk.
    pub sla_at_risk_breakdown:   Option<Breakdown>,
    /// Absent when no high-priority case is open.
    pub high_priority_breakdown: Option<Breakdown>,
    pub top_case_types:          Vec<LabelCount>,
    pub type_resolution_times:   BTreeMap<String, f64>,
    pub type_closure_rates:      BTreeMap<String, f64>,
    pub assignment_groups:       Vec<LabelCount>,
    pub recurring_issues:        Vec<RecurringIssue>,
    pub bottlenecks:             Bottlenecks,
    pub sla_targets:             BTreeMap<SeverityRank, Days>,
}

impl NarrativeContext {
    /// Condense `report` over the `table` it was computed from.
    pub fn build(
        report: &InsightReport,
        table: &CaseTable,
        sla_targets: &BTreeMap<SeverityRank, Days>,
    ) -> Self {
        let es = &report.executive_summary;
        let insights = &report.insights;
        let risks = &insights.risks;
        let types = &insights.patterns.case_type_patterns;

        let sla_at_risk_breakdown = (!risks.sla_at_risk.is_empty()).then(|| {
            breakdown(
                risks
                    .sla_at_risk
                    .iter()
                    .take(RISK_BREAKDOWN_CASES)
                    .map(|c| (c.assignment_group.as_str(), c.case_type.as_str())),
            )
        });
        let high_priority_breakdown = (!risks.high_priority_open.is_empty()).then(|| {
            breakdown(
                risks
                    .high_priority_open
                    .iter()
                    .map(|c| (c.assignment_group.as_str(), c.case_type.as_str())),
            )
        });

        Self {
            executive_summary: es.clone(),
            key_metrics: KeyMetrics {
                total_cases:        es.total_cases,
                closure_rate:       es.closure_rate,
                sla_compliance:     es.sla_compliance_rate,
                high_priority_open: es.high_priority_open,
                sla_at_risk:        es.sla_at_risk_count,
                aging_cases:        es.aging_cases_count,
            },
            data_sample: DataSample {
                total_rows: table.len(),
                columns: table.columns.column_names().into_iter().map(String::from).collect(),
                severity_distribution: table
                    .tally_by(|c| c.severity_label.as_str())
                    .top_labels(SEVERITY_SAMPLE),
                status_distribution: table.tally_by(|c| c.status.as_str()).top_labels(usize::MAX),
            },
            top_risks: RiskCounts {
                sla_at_risk_count:        risks.sla_at_risk.len(),
                high_priority_open_count: risks.high_priority_open.len(),
                aging_cases_count:        risks.aging_cases.len(),
            },
            sla_at_risk_breakdown,
            high_priority_breakdown,
            top_case_types: types.most_common_types.iter().take(TOP_CASE_TYPES).cloned().collect(),
            type_resolution_times: types.type_resolution_times.clone(),
            type_closure_rates: types.type_closure_rates.clone(),
            assignment_groups: table
                .tally_by(|c| c.assignment_group.as_str())
                .top_labels(TOP_GROUPS),
            recurring_issues: insights
                .inefficiencies
                .recurring_issues
                .iter()
                .take(TOP_RECURRING)
                .cloned()
                .collect(),
            bottlenecks: insights.inefficiencies.bottlenecks.clone(),
            sla_targets: sla_targets.clone(),
        }
    }

    /// Plain-text rendering for a chat prompt.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        let es = &self.executive_summary;
        writeln!(out, "EXECUTIVE SUMMARY:")?;
        writeln!(out, "- Total Cases: {}", es.total_cases)?;
        writeln!(out, "- Closure Rate: {:.2}%", es.closure_rate)?;
        writeln!(out, "- SLA Compliance Rate: {:.2}%", es.sla_compliance_rate)?;
        writeln!(out, "- High Priority Open Cases: {}", es.high_priority_open)?;
        writeln!(out, "- Cases at Risk of SLA Breach: {}", es.sla_at_risk_count)?;
        writeln!(out, "- Aging Cases (>30 days): {}", es.aging_cases_count)?;
        writeln!(out)?;

        let km = &self.key_metrics;
        writeln!(out, "KEY METRICS:")?;
        writeln!(out, "- total_cases: {}", km.total_cases)?;
        writeln!(out, "- closure_rate: {}", km.closure_rate)?;
        writeln!(out, "- sla_compliance: {}", km.sla_compliance)?;
        writeln!(out, "- high_priority_open: {}", km.high_priority_open)?;
        writeln!(out, "- sla_at_risk: {}", km.sla_at_risk)?;
        writeln!(out, "- aging_cases: {}", km.aging_cases)?;
        writeln!(out)?;

        if !self.top_case_types.is_empty() {
            writeln!(out, "TOP CASE TYPES:")?;
            for lc in &self.top_case_types {
                writeln!(out, "- {}: {} cases", lc.label, lc.count)?;
            }
            writeln!(out)?;
        }

        if !self.assignment_groups.is_empty() {
            writeln!(out, "ASSIGNMENT GROUPS (Workload):")?;
            for lc in &self.assignment_groups {
                writeln!(out, "- {}: {} cases", lc.label, lc.count)?;
            }
            writeln!(out)?;
        }

        if !self.recurring_issues.is_empty() {
            writeln!(out, "RECURRING ISSUES:")?;
            for issue in &self.recurring_issues {
                writeln!(out, "- {}: {} occurrences", issue.case_type, issue.frequency)?;
            }
            writeln!(out)?;
        }

        let r = &self.top_risks;
        writeln!(out, "RISK SUMMARY:")?;
        writeln!(out, "- Cases at SLA Risk: {}", r.sla_at_risk_count)?;
        writeln!(out, "- High Priority Open: {}", r.high_priority_open_count)?;
        writeln!(out, "- Aging Cases: {}", r.aging_cases_count)?;
        writeln!(out)?;

        if !self.sla_targets.is_empty() {
            writeln!(out, "SLA TARGETS (by Severity):")?;
            for (sev, days) in &self.sla_targets {
                writeln!(out, "- {} ({sev}): {days} days", severity_name(*sev))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

// ── Question routing ─────────────────────────────────────────────────────────

/// An analysis area a freeform question draws on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    RiskData,
    KpiData,
    PatternData,
    InefficiencyData,
    AssignmentData,
    SeverityData,
}

impl DataSource {
    pub fn description(&self) -> &'static str {
        match self {
            Self::RiskData         => "SLA risk identification, high priority cases, aging cases",
            Self::KpiData          => "Closure rate, resolution times, SLA compliance",
            Self::PatternData      => "Case type patterns, temporal patterns, assignment group patterns",
            Self::InefficiencyData => "Bottlenecks, recurring issues, process gaps",
            Self::AssignmentData   => "Assignment group distribution, workload analysis",
            Self::SeverityData     => "Case severity distribution, high priority cases",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::RiskData         => &["risk", "sla", "breach", "at risk", "aging"],
            Self::KpiData          => &["closure", "close", "resolution", "resolve", "compliance"],
            Self::PatternData      => &["pattern", "trend", "type", "common", "frequent"],
            Self::InefficiencyData => &["bottleneck", "inefficiency", "slow", "workload", "recurring"],
            Self::AssignmentData   => &["group", "team", "assignment"],
            Self::SeverityData     => &["severity", "critical", "high priority"],
        }
    }
}

const ALL_SOURCES: [DataSource; 6] = [
    DataSource::RiskData,
    DataSource::KpiData,
    DataSource::PatternData,
    DataSource::InefficiencyData,
    DataSource::AssignmentData,
    DataSource::SeverityData,
];

/// Areas whose keywords appear anywhere in `question` (case-insensitive,
/// substring match).
pub fn identify_data_sources(question: &str) -> Vec<DataSource> {
    let q = question.to_lowercase();
    ALL_SOURCES
        .into_iter()
        .filter(|src| src.keywords().iter().any(|k| q.contains(k)))
        .collect()
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn breakdown<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Breakdown {
    let mut groups: Tally<String> = Tally::new();
    let mut types: Tally<String> = Tally::new();
    for (group, case_type) in pairs {
        groups.add(group.to_string());
        types.add(case_type.to_string());
    }
    Breakdown { by_group: groups.to_map(), by_type: types.to_map() }
}
