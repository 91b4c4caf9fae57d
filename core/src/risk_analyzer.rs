//! Risk identifier — open cases close to or past their SLA, high-priority
//! backlog, aging cases, and escalation signals.
//!
//! All ages are measured against the report clock. A case with no creation
//! time has no age and is skipped by every age-based check; it still appears
//! in the high-priority list with a null `days_open`.

use crate::{
    analyzer::{AnalysisContext, Analyzer},
    stats::Tally,
    table::Case,
    types::Days,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlaAtRiskCase {
    pub case_id:          String,
    pub severity:         String,
    pub case_type:        String,
    pub assignment_group: String,
    pub days_open:        Days,
    pub sla_target_days:  Days,
    pub sla_risk_pct:     f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenCase {
    pub case_id:          String,
    pub severity:         String,
    pub case_type:        String,
    pub assignment_group: String,
    pub status:           String,
    pub days_open:        Option<Days>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EscalationRisks {
    /// Watched status → open cases in it longer than the escalation window.
    pub cases_stuck_in_status:   BTreeMap<String, usize>,
    /// Advisory: open rows whose case id repeats more than the threshold.
    pub high_update_count_cases: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Risks {
    pub sla_at_risk:        Vec<SlaAtRiskCase>,
    pub high_priority_open: Vec<OpenCase>,
    pub aging_cases:        Vec<OpenCase>,
    pub escalation_risks:   EscalationRisks,
}

pub struct RiskAnalyzer;

impl Analyzer for RiskAnalyzer {
    type Output = Risks;

    fn name(&self) -> &'static str {
        "risks"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Risks {
        let risks = Risks {
            sla_at_risk:        identify_sla_at_risk(ctx),
            high_priority_open: identify_high_priority_open(ctx),
            aging_cases:        identify_aging_cases(ctx),
            escalation_risks:   identify_escalation_risks(ctx),
        };
        log::debug!(
            "risks: {} at risk, {} high-priority open, {} aging",
            risks.sla_at_risk.len(),
            risks.high_priority_open.len(),
            risks.aging_cases.len(),
        );
        risks
    }
}

/// Open cases whose age has consumed at least the configured share of their
/// SLA target, highest share first, capped.
pub fn identify_sla_at_risk(ctx: &AnalysisContext<'_>) -> Vec<SlaAtRiskCase> {
    let cfg = &ctx.config.risk;
    let mut at_risk: Vec<SlaAtRiskCase> = ctx
        .table
        .open_cases()
        .filter_map(|case| {
            let days_open = ctx.days_open(case)?;
            let target = case.sla_target_days.filter(|t| *t > 0.0)?;
            let risk = days_open / target * 100.0;
            (risk >= cfg.sla_at_risk_pct).then(|| SlaAtRiskCase {
                case_id:          case.id.clone(),
                severity:         case.severity_label.clone(),
                case_type:        case.case_type.clone(),
                assignment_group: case.assignment_group.clone(),
                days_open,
                sla_target_days:  target,
                sla_risk_pct:     risk,
            })
        })
        .collect();

    at_risk.sort_by(|a, b| b.sla_risk_pct.total_cmp(&a.sla_risk_pct));
    at_risk.truncate(cfg.at_risk_limit);
    at_risk
}

/// Every open high-priority case, in table order. Uncapped.
pub fn identify_high_priority_open(ctx: &AnalysisContext<'_>) -> Vec<OpenCase> {
    ctx.table
        .open_cases()
        .filter(|c| c.is_high_priority)
        .map(|c| open_case(c, ctx.days_open(c)))
        .collect()
}

/// Open cases older than the aging threshold, oldest first, capped.
pub fn identify_aging_cases(ctx: &AnalysisContext<'_>) -> Vec<OpenCase> {
    let cfg = &ctx.config.risk;
    let mut aging: Vec<(Days, OpenCase)> = ctx
        .table
        .open_cases()
        .filter_map(|c| {
            let days = ctx.days_open(c).filter(|d| *d > cfg.aging_days)?;
            Some((days, open_case(c, Some(days))))
        })
        .collect();

    aging.sort_by(|a, b| b.0.total_cmp(&a.0));
    aging.truncate(cfg.aging_limit);
    aging.into_iter().map(|(_, c)| c).collect()
}

pub fn identify_escalation_risks(ctx: &AnalysisContext<'_>) -> EscalationRisks {
    let cfg = &ctx.config.risk;

    let mut cases_stuck_in_status = BTreeMap::new();
    for status in &cfg.escalation_statuses {
        let in_status: Vec<&Case> = ctx.table.open_cases().filter(|c| &c.status == status).collect();
        if in_status.is_empty() {
            continue;
        }
        let stuck = in_status
            .iter()
            .filter(|c| ctx.days_open(c).is_some_and(|d| d > cfg.escalation_days))
            .count();
        cases_stuck_in_status.insert(status.clone(), stuck);
    }

    // No update history exists; rows sharing an id stand in for updates.
    let updates: Tally<&str> = ctx.table.open_cases().map(|c| c.id.as_str()).collect();
    let high_update_count_cases = ctx
        .table
        .open_cases()
        .filter(|c| updates.count(&c.id.as_str()) > cfg.high_update_count)
        .count();

    EscalationRisks { cases_stuck_in_status, high_update_count_cases }
}

fn open_case(case: &Case, days_open: Option<Days>) -> OpenCase {
    OpenCase {
        case_id:          case.id.clone(),
        severity:         case.severity_label.clone(),
        case_type:        case.case_type.clone(),
        assignment_group: case.assignment_group.clone(),
        status:           case.status.clone(),
        days_open,
    }
}
