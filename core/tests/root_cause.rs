//! Root-cause analyzer tests — keyword themes, correlations, resolution factors.

mod common;

use caseflow_core::{
    analyzer::Analyzer,
    config::RootCauseConfig,
    keywords::KeywordSummarizer,
    root_cause_analyzer::{ResolutionFactors, RootCauseAnalysis, RootCauseAnalyzer},
    stats::LabelCount,
    table::CaseTable,
};
use common::{case, engine, table};

fn analysis(t: &CaseTable) -> RootCauseAnalysis {
    let engine = engine();
    RootCauseAnalyzer::from_config(&RootCauseConfig::default()).analyze(&engine.context(t))
}

/// Only case types with summaries produce root causes, most frequent first.
#[test]
fn root_causes_need_summaries() {
    let a = analysis(&table(vec![
        case("P-1").case_type("Phishing Report").summary("Spoofed invoice email").build(),
        case("P-2").case_type("Phishing Report").summary("Spoofed payroll email").build(),
        case("P-3").case_type("Phishing Report").build(),
        case("A-1").case_type("Access Review").summary("Quarterly entitlement review").build(),
        case("M-1").case_type("Malware Alert").build(),
        case("M-2").case_type("Malware Alert").build(),
        case("M-3").case_type("Malware Alert").build(),
        case("M-4").case_type("Malware Alert").build(),
    ]));
    let types: Vec<(&str, usize)> = a
        .common_root_causes
        .iter()
        .map(|r| (r.case_type.as_str(), r.frequency))
        .collect();
    assert_eq!(types, vec![("Phishing Report", 3), ("Access Review", 1)]);

    let phrases = &a.common_root_causes[0].common_phrases;
    assert_eq!(phrases[0], LabelCount { label: "spoofed".into(), count: 2 });
    assert!(
        phrases.iter().all(|p| p.label.chars().count() > 4),
        "short tokens must be dropped: {phrases:?}"
    );
    assert_eq!(phrases[1], LabelCount { label: "email".into(), count: 2 }, "ties keep first appearance");
}

/// At most five phrases are kept per case type.
#[test]
fn phrases_are_capped_at_five() {
    let a = analysis(&table(vec![case("X-1")
        .summary("alpha1 bravo2 charlie delta4 echo55 foxtrot golf77")
        .build()]));
    assert_eq!(a.common_root_causes[0].common_phrases.len(), 5);
}

/// Average resolution is over the type's resolved cases only.
#[test]
fn root_cause_average_resolution() {
    let a = analysis(&table(vec![
        case("L-1").summary("Expired password").opened_days_ago(20.0).closed_after(2.0).build(),
        case("L-2").summary("Expired password").opened_days_ago(20.0).closed_after(6.0).build(),
        case("L-3").summary("Expired password").build(),
    ]));
    assert_eq!(a.common_root_causes[0].avg_resolution, Some(4.0));
}

/// Correlation tables and severity drivers are zero-filled cross-tabs.
#[test]
fn correlations_and_drivers() {
    let a = analysis(&table(vec![
        case("A").case_type("Data Exposure").source("Audit Finding").severity("Sev0").build(),
        case("B").case_type("Login Failure").source("SIEM Alert").severity("Sev3").build(),
    ]));
    let corr = &a.case_type_correlations;
    assert_eq!(corr.type_source_correlation["Data Exposure"]["Audit Finding"], 1);
    assert_eq!(corr.type_source_correlation["Data Exposure"]["SIEM Alert"], 0);
    assert_eq!(corr.type_group_correlation["Login Failure"]["SecurityOps"], 1);
    assert_eq!(a.severity_drivers.source_severity["SIEM Alert"]["Sev0"], 0);
    assert_eq!(a.severity_drivers.high_severity_patterns.get("Data Exposure"), Some(&1));
    assert_eq!(a.severity_drivers.high_severity_patterns.get("Login Failure"), None);
}

/// Nothing resolved means empty resolution factors.
#[test]
fn resolution_factors_empty_without_resolved_cases() {
    let a = analysis(&table(vec![
        case("O-1").build(),
        case("N-1").opened_days_ago(5.0).closed_after(-1.0).build(),
    ]));
    assert_eq!(a.resolution_factors, ResolutionFactors::default());

    let b = analysis(&table(vec![case("C-1").opened_days_ago(9.0).closed_after(3.0).build()]));
    assert_eq!(b.resolution_factors.resolution_by_group["SecurityOps"], 3.0);
    assert_eq!(b.resolution_factors.resolution_by_source["SIEM Alert"], 3.0);
}

/// Without a source column, source cross-tabs stay empty rather than
/// filling up with "Unknown".
#[test]
fn source_tables_empty_without_source_column() {
    let csv = "Case Id,Create Date,Updated On,End Date,Case Severity,CaseStatus,Case Type,AssignmentGroup\n\
               C-1,2024-06-01,2024-06-01,2024-06-03,Sev1,Closed,Malware Alert,SecurityOps\n\
               C-2,2024-06-02,2024-06-02,,Sev2,Analysis,Phishing Report,SecurityOps\n";
    let t = engine().read_cases(csv.as_bytes()).expect("table loads");
    assert!(!t.columns.source);

    let a = analysis(&t);
    assert!(a.case_type_correlations.type_source_correlation.is_empty());
    assert!(a.severity_drivers.source_severity.is_empty());
    assert!(a.resolution_factors.resolution_by_source.is_empty());
    assert_eq!(a.case_type_correlations.type_group_correlation["Malware Alert"]["SecurityOps"], 1);
    assert_eq!(a.resolution_factors.resolution_by_group["SecurityOps"], 2.0);
}

struct FirstWord;

impl KeywordSummarizer for FirstWord {
    fn summarize(&self, texts: &[&str]) -> Vec<LabelCount> {
        texts
            .first()
            .and_then(|t| t.split_whitespace().next())
            .map(|w| vec![LabelCount { label: w.into(), count: 1 }])
            .unwrap_or_default()
    }
}

/// The keyword miner can be swapped without touching the analyzer.
#[test]
fn custom_summarizer() {
    let engine = engine();
    let t = table(vec![case("Z-1").summary("Quarantine host now").build()]);
    let a = RootCauseAnalyzer::with_summarizer(FirstWord).analyze(&engine.context(&t));
    assert_eq!(a.common_root_causes[0].common_phrases[0].label, "Quarantine");
}
