//! Inefficiency detector — bottlenecks, recurring issues, process gaps and
//! per-group resource utilization.
//!
//! Bottleneck rule: a group is high-workload when its case count is above
//! the workload quantile of all group counts, and a bottleneck when its mean
//! resolution time is also above the same quantile of all groups' means.
//! Quantiles over fewer than two values are undefined and flag nothing.

use crate::{
    analyzer::{AnalysisContext, Analyzer},
    stats::{mean, quantile, GroupedMean, LabelCount, Tally},
    table::Case,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupLoad {
    pub case_count:     usize,
    pub avg_resolution: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Bottlenecks {
    pub high_workload_slow_resolution: BTreeMap<String, GroupLoad>,
    pub status_bottlenecks:            BTreeMap<String, usize>,
}

impl Bottlenecks {
    pub fn any_group(&self) -> bool {
        !self.high_workload_slow_resolution.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringIssue {
    pub case_type:           String,
    pub frequency:           usize,
    pub avg_resolution_days: Option<f64>,
    pub common_severity:     Option<String>,
    pub common_summaries:    Vec<LabelCount>,
}

/// Both counts are None when the input has no end-date column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusConsistency {
    pub closed_without_end_date: Option<usize>,
    pub end_date_but_not_closed: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessGaps {
    /// None when the input has no resolution column.
    pub missing_resolutions:    Option<usize>,
    /// None when the input has no end-date column.
    pub cases_without_end_date: Option<usize>,
    pub draft_cases_old:        usize,
    pub inconsistent_status:    StatusConsistency,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupUtilization {
    pub total_cases:         usize,
    pub open_cases:          usize,
    pub closed_cases:        usize,
    pub high_priority_open:  usize,
    pub avg_resolution_days: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inefficiencies {
    pub bottlenecks:          Bottlenecks,
    pub recurring_issues:     Vec<RecurringIssue>,
    pub process_gaps:         ProcessGaps,
    pub resource_utilization: BTreeMap<String, GroupUtilization>,
}

pub struct InefficiencyAnalyzer;

impl Analyzer for InefficiencyAnalyzer {
    type Output = Inefficiencies;

    fn name(&self) -> &'static str {
        "inefficiencies"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Inefficiencies {
        let out = Inefficiencies {
            bottlenecks:          identify_bottlenecks(ctx),
            recurring_issues:     identify_recurring_issues(ctx),
            process_gaps:         identify_process_gaps(ctx),
            resource_utilization: resource_utilization(ctx),
        };
        log::debug!(
            "inefficiencies: {} bottleneck groups, {} recurring types",
            out.bottlenecks.high_workload_slow_resolution.len(),
            out.recurring_issues.len(),
        );
        out
    }
}

/// Groups high in both workload and resolution latency, plus statuses
/// holding an outsized share of cases.
pub fn identify_bottlenecks(ctx: &AnalysisContext<'_>) -> Bottlenecks {
    let table = ctx.table;
    let q = ctx.config.inefficiency.workload_quantile;

    let workload = table.tally_by(|c| c.assignment_group.as_str());
    let resolution: GroupedMean = table
        .resolved()
        .map(|(c, d)| (c.assignment_group.as_str(), d))
        .collect();

    let counts: Vec<f64> = workload.iter().map(|(_, n)| n as f64).collect();
    let means: Vec<f64> = resolution.means().into_values().collect();

    let mut high_workload_slow_resolution = BTreeMap::new();
    if let (Some(count_cut), Some(resolution_cut)) = (quantile(&counts, q), quantile(&means, q)) {
        for (group, n) in workload.iter() {
            let avg = resolution.mean_of(group);
            let slow = avg.is_some_and(|a| a > resolution_cut);
            if n as f64 > count_cut && slow {
                high_workload_slow_resolution.insert(
                    group.clone(),
                    GroupLoad { case_count: n, avg_resolution: avg },
                );
            }
        }
    }

    let statuses = table.tally_by(|c| c.status.as_str());
    let status_counts: Vec<f64> = statuses.iter().map(|(_, n)| n as f64).collect();
    let status_bottlenecks = match quantile(&status_counts, q) {
        Some(cut) => statuses
            .iter()
            .filter(|(_, n)| *n as f64 > cut)
            .map(|(s, n)| (s.clone(), n))
            .collect(),
        None => BTreeMap::new(),
    };

    Bottlenecks { high_workload_slow_resolution, status_bottlenecks }
}

/// Case types at or above the recurring frequency threshold, most frequent
/// first (ties in first-seen order).
pub fn identify_recurring_issues(ctx: &AnalysisContext<'_>) -> Vec<RecurringIssue> {
    let cfg = &ctx.config.inefficiency;
    let by_type = cases_by_type(ctx.table.iter());

    ctx.table
        .tally_by(|c| c.case_type.as_str())
        .ranked()
        .into_iter()
        .filter(|(_, n)| *n >= cfg.recurring_min_frequency)
        .map(|(case_type, frequency)| {
            let cases = &by_type[case_type.as_str()];
            let severities: Tally<&str> = cases.iter().map(|c| c.severity_label.as_str()).collect();
            let summaries: Tally<String> = cases
                .iter()
                .filter_map(|c| c.summary.clone())
                .collect();
            RecurringIssue {
                avg_resolution_days: mean_resolution(cases),
                common_severity: severities.mode().map(|s| s.to_string()),
                common_summaries: summaries.top_labels(cfg.recurring_top_summaries),
                case_type,
                frequency,
            }
        })
        .collect()
}

pub fn identify_process_gaps(ctx: &AnalysisContext<'_>) -> ProcessGaps {
    let table = ctx.table;
    let draft_status = ctx.config.draft_status.as_str();
    let draft_age = ctx.config.inefficiency.draft_age_days;

    let has_end_date = table.columns.closed;
    let closed_without_end_date = has_end_date.then(|| {
        table
            .iter()
            .filter(|c| c.is_closed && c.closed_at.is_none())
            .count()
    });
    let end_date_but_not_closed = has_end_date.then(|| {
        table
            .iter()
            .filter(|c| !c.is_closed && c.closed_at.is_some())
            .count()
    });

    ProcessGaps {
        missing_resolutions: table.columns.resolution.then(|| {
            table
                .iter()
                .filter(|c| c.is_closed && c.resolution_notes.is_none())
                .count()
        }),
        cases_without_end_date: closed_without_end_date,
        draft_cases_old: table
            .iter()
            .filter(|c| c.status == draft_status)
            .filter_map(|c| c.created_at)
            .filter(|created| ctx.clock.whole_days_since(*created) > draft_age)
            .count(),
        inconsistent_status: StatusConsistency {
            closed_without_end_date,
            end_date_but_not_closed,
        },
    }
}

pub fn resource_utilization(ctx: &AnalysisContext<'_>) -> BTreeMap<String, GroupUtilization> {
    cases_by_group(ctx.table.iter())
        .into_iter()
        .map(|(group, cases)| {
            let closed = cases.iter().filter(|c| c.is_closed).count();
            let util = GroupUtilization {
                total_cases:         cases.len(),
                open_cases:          cases.len() - closed,
                closed_cases:        closed,
                high_priority_open:  cases.iter().filter(|c| c.is_high_priority && c.is_open()).count(),
                avg_resolution_days: mean_resolution(&cases),
            };
            (group.to_string(), util)
        })
        .collect()
}

/// Mean of closed, non-negative resolution times; None when there are none.
pub(crate) fn mean_resolution(cases: &[&Case]) -> Option<f64> {
    let days: Vec<f64> = cases.iter().filter_map(|c| c.closed_resolution_days()).collect();
    mean(&days)
}

fn cases_by_type<'a>(cases: impl Iterator<Item = &'a Case>) -> HashMap<&'a str, Vec<&'a Case>> {
    let mut map: HashMap<&str, Vec<&Case>> = HashMap::new();
    for c in cases {
        map.entry(c.case_type.as_str()).or_default().push(c);
    }
    map
}

fn cases_by_group<'a>(cases: impl Iterator<Item = &'a Case>) -> BTreeMap<&'a str, Vec<&'a Case>> {
    let mut map: BTreeMap<&str, Vec<&Case>> = BTreeMap::new();
    for c in cases {
        map.entry(c.assignment_group.as_str()).or_default().push(c);
    }
    map
}
