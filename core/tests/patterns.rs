//! Pattern detector tests — temporal buckets, cross-tabs, stuck cases, sources.

mod common;

use caseflow_core::{
    analyzer::Analyzer,
    pattern_analyzer::{HourCount, PatternAnalyzer, Patterns, SourcePatterns},
    table::CaseTable,
};
use common::{case, engine, table};

fn patterns(t: &CaseTable) -> Patterns {
    let engine = engine();
    PatternAnalyzer.analyze(&engine.context(t))
}

/// Weekday buckets always list all seven days, Monday first, zero-filled.
/// Cases without a creation time are left out.
#[test]
fn weekday_and_hour_buckets() {
    let p = patterns(&table(vec![
        case("A").created("2024-06-24 09:15:00").build(), // Monday
        case("B").created("2024-06-25 09:40:00").build(), // Tuesday
        case("C").created("2024-06-25 14:00:00").build(),
        case("D").created("").build(),
    ]));
    let temporal = &p.temporal_patterns;

    let days: Vec<(&str, usize)> = temporal
        .cases_by_day_of_week
        .iter()
        .map(|d| (d.label.as_str(), d.count))
        .collect();
    assert_eq!(
        days,
        vec![
            ("Monday", 1),
            ("Tuesday", 2),
            ("Wednesday", 0),
            ("Thursday", 0),
            ("Friday", 0),
            ("Saturday", 0),
            ("Sunday", 0),
        ]
    );
    assert_eq!(temporal.cases_by_hour.values().sum::<usize>(), 3, "undated case is excluded");
    assert_eq!(
        temporal.peak_hours,
        vec![HourCount { hour: 9, count: 2 }, HourCount { hour: 14, count: 1 }]
    );
    assert_eq!(temporal.daily_case_volume["2024-06-25"], 2);
    assert_eq!(temporal.daily_case_volume.len(), 2);
}

/// Peak hours are capped and ties keep the order in which the hour was
/// first seen.
#[test]
fn peak_hours_are_capped() {
    let records = (0..8)
        .map(|h| case(&format!("H-{h}")).created(&format!("2024-06-20 {:02}:00:00", 10 + h)).build())
        .collect();
    let p = patterns(&table(records));
    let hours: Vec<u32> = p.temporal_patterns.peak_hours.iter().map(|h| h.hour).collect();
    assert_eq!(hours, vec![10, 11, 12, 13, 14]);
}

/// Cross-tabs carry every observed column on every row.
#[test]
fn cross_tabs_are_zero_filled() {
    let p = patterns(&table(vec![
        case("A").case_type("Login Failure").severity("Sev1").build(),
        case("B").case_type("Malware Alert").severity("Sev2").build(),
        case("C").case_type("Malware Alert").severity("Sev2").build(),
    ]));
    let by_sev = &p.case_type_patterns.type_by_severity;
    assert_eq!(by_sev["Login Failure"]["Sev2"], 0);
    assert_eq!(by_sev["Login Failure"]["Sev1"], 1);
    assert_eq!(by_sev["Malware Alert"]["Sev2"], 2);
    assert_eq!(by_sev["Malware Alert"]["Sev1"], 0);

    let most: Vec<(&str, usize)> = p
        .case_type_patterns
        .most_common_types
        .iter()
        .map(|t| (t.label.as_str(), t.count))
        .collect();
    assert_eq!(most, vec![("Malware Alert", 2), ("Login Failure", 1)]);
}

/// Closure rates are over all cases of a label; resolution means only over
/// the resolved subset.
#[test]
fn per_type_rates_and_means() {
    let p = patterns(&table(vec![
        case("A").case_type("Phishing Report").opened_days_ago(20.0).closed_after(3.0).build(),
        case("B").case_type("Phishing Report").opened_days_ago(20.0).closed_after(-2.0).build(),
        case("C").case_type("Phishing Report").build(),
        case("D").case_type("Phishing Report").build(),
    ]));
    let types = &p.case_type_patterns;
    assert_eq!(types.type_closure_rates["Phishing Report"], 50.0);
    assert_eq!(types.type_resolution_times["Phishing Report"], 3.0);
    assert_eq!(p.severity_trends.avg_resolution_by_severity["Sev2"], 3.0);
}

/// High-severity counts only consider Sev0 and Sev1.
#[test]
fn high_severity_breakdowns() {
    let p = patterns(&table(vec![
        case("A").severity("Sev0").group("NetworkOps").build(),
        case("B").severity("Sev1").group("NetworkOps").build(),
        case("C").severity("Sev3").group("AppSupport").build(),
    ]));
    let trends = &p.severity_trends;
    assert_eq!(trends.high_severity_by_group.get("NetworkOps"), Some(&2));
    assert_eq!(trends.high_severity_by_group.get("AppSupport"), None);
    assert_eq!(trends.distribution.values().sum::<usize>(), 3);
}

/// Open cases in a watched status longer than ten days are stuck, longest
/// first. Other statuses and younger cases are not.
#[test]
fn stuck_cases_longest_first() {
    let p = patterns(&table(vec![
        case("S-1").status("Review").opened_days_ago(12.0).build(),
        case("S-2").status("Analysis").opened_days_ago(15.0).build(),
        case("S-3").status("Analysis").opened_days_ago(5.0).build(),
        case("S-4").status("Pending").opened_days_ago(40.0).build(),
        case("S-5").status("Draft").opened_days_ago(10.0).build(),
    ]));
    let stuck = &p.status_transition_patterns.stuck_cases;
    let ids: Vec<&str> = stuck.iter().map(|s| s.case_id.as_str()).collect();
    assert_eq!(ids, vec!["S-2", "S-1"], "exactly ten days is not stuck");
    assert_eq!(stuck[0].days_in_status, 15.0);
    assert_eq!(stuck[0].status, "Analysis");
}

/// Status duration is the mean age of the cases currently in that status.
#[test]
fn status_duration_means() {
    let p = patterns(&table(vec![
        case("A").status("Review").opened_days_ago(4.0).build(),
        case("B").status("Review").opened_days_ago(8.0).build(),
    ]));
    assert_eq!(p.status_transition_patterns.status_duration["Review"], 6.0);
}

/// Without a source column the source section is empty.
#[test]
fn no_source_column_means_empty_source_patterns() {
    let csv = "Case Id,Create Date,Updated On,Case Severity,CaseStatus,Case Type,AssignmentGroup\n\
               C-1,2024-06-01,2024-06-01,Sev2,Review,Login Failure,SecurityOps\n";
    let t = engine().read_cases(csv.as_bytes()).expect("table loads");
    assert_eq!(patterns(&t).source_patterns, SourcePatterns::default());

    let with_source = patterns(&table(vec![case("A").source("Vendor Notice").build()]));
    assert_eq!(with_source.source_patterns.source_distribution["Vendor Notice"], 1);
}
