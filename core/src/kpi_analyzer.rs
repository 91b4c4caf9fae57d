//! KPI aggregator — headline counts, rates and resolution-time tendencies.
//!
//! Resolution statistics and SLA compliance are computed only over closed
//! cases with a defined, non-negative resolution time. A case in that subset
//! without a resolvable SLA target counts as a breach.

use crate::{
    analyzer::{AnalysisContext, Analyzer},
    stats::{mean, median, pct},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kpis {
    pub total_cases:               usize,
    pub closed_cases:              usize,
    pub open_cases:                usize,
    pub closure_rate:              f64,
    pub high_priority_cases:       usize,
    pub critical_cases:            usize,
    pub avg_resolution_time:       Option<f64>,
    pub median_resolution_time:    Option<f64>,
    pub cases_by_severity:         BTreeMap<String, usize>,
    pub cases_by_status:           BTreeMap<String, usize>,
    pub cases_by_type:             BTreeMap<String, usize>,
    pub cases_by_assignment_group: BTreeMap<String, usize>,
    pub sla_compliance_rate:       f64,
    pub sla_breaches:              usize,
}

pub struct KpiAnalyzer;

impl Analyzer for KpiAnalyzer {
    type Output = Kpis;

    fn name(&self) -> &'static str {
        "kpis"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Kpis {
        let table = ctx.table;
        let total = table.len();
        let closed = table.iter().filter(|c| c.is_closed).count();

        let resolved: Vec<f64> = table.resolved().map(|(_, d)| d).collect();
        let met = table
            .resolved()
            .filter(|(c, d)| c.sla_target_days.is_some_and(|target| *d <= target))
            .count();

        let (sla_compliance_rate, sla_breaches) = if resolved.is_empty() {
            (0.0, 0)
        } else {
            (pct(met, resolved.len()), resolved.len() - met)
        };

        Kpis {
            total_cases: total,
            closed_cases: closed,
            open_cases: total - closed,
            closure_rate: pct(closed, total),
            high_priority_cases: table.iter().filter(|c| c.is_high_priority).count(),
            critical_cases: table.iter().filter(|c| c.is_critical).count(),
            avg_resolution_time: mean(&resolved),
            median_resolution_time: median(&resolved),
            cases_by_severity: table.tally_by(|c| c.severity_label.as_str()).to_map(),
            cases_by_status: table.tally_by(|c| c.status.as_str()).to_map(),
            cases_by_type: table.tally_by(|c| c.case_type.as_str()).to_map(),
            cases_by_assignment_group: table.tally_by(|c| c.assignment_group.as_str()).to_map(),
            sla_compliance_rate,
            sla_breaches,
        }
    }
}
