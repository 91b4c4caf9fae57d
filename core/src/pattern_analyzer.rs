//! Pattern detector — six independent read-only reductions:
//!   1. Temporal (weekday, hour, daily volume, peak hours)
//!   2. Severity trends
//!   3. Case-type patterns (incl. recurring issues)
//!   4. Assignment-group patterns (incl. bottlenecks)
//!   5. Source patterns
//!   6. Status patterns (incl. stuck cases)
//!
//! Cases without a creation time are left out of every time-based figure.

use crate::{
    analyzer::{AnalysisContext, Analyzer},
    inefficiency_analyzer::{identify_bottlenecks, identify_recurring_issues, Bottlenecks, RecurringIssue},
    stats::{cross_tab, CrossTab, GroupedMean, LabelCount, Tally},
    table::{Case, CaseTable},
    types::Days,
};
use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HourCount {
    pub hour:  u32,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemporalPatterns {
    /// Monday first, every weekday present.
    pub cases_by_day_of_week: Vec<LabelCount>,
    pub cases_by_hour:        BTreeMap<u32, usize>,
    /// ISO date → cases created that day.
    pub daily_case_volume:    BTreeMap<String, usize>,
    pub peak_hours:           Vec<HourCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeverityTrends {
    pub distribution:               BTreeMap<String, usize>,
    /// Case type → severity label → count.
    pub severity_by_type:           CrossTab,
    pub avg_resolution_by_severity: BTreeMap<String, f64>,
    pub high_severity_by_group:     BTreeMap<String, usize>,
    pub high_severity_by_type:      BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseTypePatterns {
    pub most_common_types:     Vec<LabelCount>,
    pub type_by_severity:      CrossTab,
    pub type_resolution_times: BTreeMap<String, f64>,
    pub type_closure_rates:    BTreeMap<String, f64>,
    pub recurring_issues:      Vec<RecurringIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentGroupPatterns {
    pub case_distribution:      BTreeMap<String, usize>,
    pub group_resolution_times: BTreeMap<String, f64>,
    pub group_closure_rates:    BTreeMap<String, f64>,
    pub group_by_severity:      CrossTab,
    pub bottlenecks:            Bottlenecks,
}

/// Empty when the input has no source column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourcePatterns {
    pub source_distribution:     BTreeMap<String, usize>,
    pub source_by_severity:      CrossTab,
    pub source_resolution_times: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StuckCase {
    pub case_id:          String,
    pub status:           String,
    pub days_in_status:   Days,
    pub severity:         String,
    pub assignment_group: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusPatterns {
    pub status_distribution: BTreeMap<String, usize>,
    pub status_by_severity:  CrossTab,
    pub stuck_cases:         Vec<StuckCase>,
    /// Mean days since creation per current status. No transition history
    /// exists, so this approximates time-in-status.
    pub status_duration:     BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patterns {
    pub temporal_patterns:          TemporalPatterns,
    pub severity_trends:            SeverityTrends,
    pub case_type_patterns:         CaseTypePatterns,
    pub assignment_group_patterns:  AssignmentGroupPatterns,
    pub source_patterns:            SourcePatterns,
    pub status_transition_patterns: StatusPatterns,
}

// ── Analyzer ─────────────────────────────────────────────────────────────────

pub struct PatternAnalyzer;

impl Analyzer for PatternAnalyzer {
    type Output = Patterns;

    fn name(&self) -> &'static str {
        "patterns"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Patterns {
        Patterns {
            temporal_patterns:          temporal(ctx),
            severity_trends:            severity_trends(ctx.table),
            case_type_patterns:         case_type_patterns(ctx),
            assignment_group_patterns:  assignment_group_patterns(ctx),
            source_patterns:            source_patterns(ctx.table),
            status_transition_patterns: status_patterns(ctx),
        }
    }
}

fn temporal(ctx: &AnalysisContext<'_>) -> TemporalPatterns {
    let created: Vec<_> = ctx.table.iter().filter_map(|c| c.created_at).collect();

    let weekdays: Tally<Weekday> = created.iter().map(|t| t.weekday()).collect();
    let hours: Tally<u32> = created.iter().map(|t| t.hour()).collect();
    let days: Tally<String> = created
        .iter()
        .map(|t| t.date().format("%Y-%m-%d").to_string())
        .collect();

    TemporalPatterns {
        cases_by_day_of_week: WEEKDAYS
            .iter()
            .map(|d| LabelCount { label: weekday_name(*d).into(), count: weekdays.count(d) })
            .collect(),
        cases_by_hour: hours.to_map(),
        daily_case_volume: days.to_map(),
        peak_hours: hours
            .top(ctx.config.patterns.peak_hours)
            .into_iter()
            .map(|(hour, count)| HourCount { hour, count })
            .collect(),
    }
}

fn severity_trends(table: &CaseTable) -> SeverityTrends {
    let high: Vec<&Case> = table.iter().filter(|c| c.is_high_priority).collect();
    SeverityTrends {
        distribution: table.tally_by(|c| c.severity_label.as_str()).to_map(),
        severity_by_type: cross_tab(table.iter().map(|c| (c.case_type.as_str(), c.severity_label.as_str()))),
        avg_resolution_by_severity: resolution_by(table, |c| c.severity_label.as_str()),
        high_severity_by_group: count_by(&high, |c| c.assignment_group.as_str()),
        high_severity_by_type: count_by(&high, |c| c.case_type.as_str()),
    }
}

fn case_type_patterns(ctx: &AnalysisContext<'_>) -> CaseTypePatterns {
    let table = ctx.table;
    CaseTypePatterns {
        most_common_types: table
            .tally_by(|c| c.case_type.as_str())
            .top_labels(ctx.config.patterns.top_types),
        type_by_severity: cross_tab(table.iter().map(|c| (c.case_type.as_str(), c.severity_label.as_str()))),
        type_resolution_times: resolution_by(table, |c| c.case_type.as_str()),
        type_closure_rates: closure_rate_by(table, |c| c.case_type.as_str()),
        recurring_issues: identify_recurring_issues(ctx),
    }
}

fn assignment_group_patterns(ctx: &AnalysisContext<'_>) -> AssignmentGroupPatterns {
    let table = ctx.table;
    AssignmentGroupPatterns {
        case_distribution: table.tally_by(|c| c.assignment_group.as_str()).to_map(),
        group_resolution_times: resolution_by(table, |c| c.assignment_group.as_str()),
        group_closure_rates: closure_rate_by(table, |c| c.assignment_group.as_str()),
        group_by_severity: cross_tab(
            table.iter().map(|c| (c.assignment_group.as_str(), c.severity_label.as_str())),
        ),
        bottlenecks: identify_bottlenecks(ctx),
    }
}

fn source_patterns(table: &CaseTable) -> SourcePatterns {
    if !table.columns.source {
        return SourcePatterns::default();
    }
    SourcePatterns {
        source_distribution: table.tally_by(|c| c.source.as_str()).to_map(),
        source_by_severity: cross_tab(table.iter().map(|c| (c.source.as_str(), c.severity_label.as_str()))),
        source_resolution_times: resolution_by(table, |c| c.source.as_str()),
    }
}

fn status_patterns(ctx: &AnalysisContext<'_>) -> StatusPatterns {
    let table = ctx.table;
    let status_duration: GroupedMean = table
        .iter()
        .filter_map(|c| ctx.days_open(c).map(|d| (c.status.as_str(), d)))
        .collect();

    StatusPatterns {
        status_distribution: table.tally_by(|c| c.status.as_str()).to_map(),
        status_by_severity: cross_tab(table.iter().map(|c| (c.status.as_str(), c.severity_label.as_str()))),
        stuck_cases: identify_stuck_cases(ctx),
        status_duration: status_duration.means(),
    }
}

/// Open cases in a watched status for longer than the stuck threshold,
/// longest first.
pub fn identify_stuck_cases(ctx: &AnalysisContext<'_>) -> Vec<StuckCase> {
    let cfg = &ctx.config.patterns;
    let mut stuck = Vec::new();
    for status in &cfg.stuck_statuses {
        for case in ctx.table.open_cases().filter(|c| &c.status == status) {
            let Some(days) = ctx.days_open(case) else { continue };
            if days > cfg.stuck_days {
                stuck.push(StuckCase {
                    case_id:          case.id.clone(),
                    status:           status.clone(),
                    days_in_status:   days,
                    severity:         case.severity_label.clone(),
                    assignment_group: case.assignment_group.clone(),
                });
            }
        }
    }
    stuck.sort_by(|a, b| b.days_in_status.total_cmp(&a.days_in_status));
    stuck
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Mean resolution over the closed, non-negative subset, per label.
pub(crate) fn resolution_by<F>(table: &CaseTable, label: F) -> BTreeMap<String, f64>
where
    F: Fn(&Case) -> &str,
{
    table
        .resolved()
        .map(|(c, d)| (label(c), d))
        .collect::<GroupedMean>()
        .means()
}

/// Percentage of cases closed per label, over all cases with that label.
fn closure_rate_by<F>(table: &CaseTable, label: F) -> BTreeMap<String, f64>
where
    F: Fn(&Case) -> &str,
{
    table
        .iter()
        .map(|c| (label(c), if c.is_closed { 100.0 } else { 0.0 }))
        .collect::<GroupedMean>()
        .means()
}

fn count_by<F>(cases: &[&Case], label: F) -> BTreeMap<String, usize>
where
    F: Fn(&Case) -> &str,
{
    cases
        .iter()
        .map(|&c| label(c).to_string())
        .collect::<Tally<String>>()
        .to_map()
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
