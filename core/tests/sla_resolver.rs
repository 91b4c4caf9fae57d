//! SLA resolver tests — sheet parsing, two-tier lookup, degraded loads.

mod common;

use caseflow_core::{
    clock::ReportClock,
    config::{InsightsConfig, DEFAULT_SLA_DAYS},
    engine::InsightEngine,
    sla::{load_sla_sheet, read_sla_sheet, SlaResolver, SlaRule, SlaRuleTable, SlaSource},
    warning::LoadWarning,
};
use common::{case, ts, NOW};
use std::io::Write;

fn defaults() -> std::collections::BTreeMap<u8, f64> {
    DEFAULT_SLA_DAYS.into_iter().collect()
}

fn resolver_from(sheet: &str) -> SlaResolver {
    let sheet = read_sla_sheet(sheet.as_bytes()).expect("sheet parses");
    SlaResolver::new(sheet.rules, defaults())
}

/// A 24-hour sheet entry for (Alpha, Sev0) resolves to exactly one day,
/// and the sheet is reported as the source.
#[test]
fn sheet_hours_become_days() {
    let resolver = resolver_from("Team,Severity,TTR_Hours\nAlpha,Sev0,24\n");
    assert_eq!(resolver.resolve("Alpha", 0), Some(1.0));
    assert_eq!(
        resolver.resolve_with_source("Alpha", 0),
        Some((1.0, SlaSource::TeamRule)),
        "an exact sheet match must come from the team rule tier"
    );
}

/// A pair present in the sheet never falls through to the default map,
/// even when the default differs.
#[test]
fn sheet_match_shadows_default() {
    let resolver = resolver_from("Team,Severity,TTR_Hours\nAlpha,Sev2,48\n");
    assert_eq!(resolver.resolve("Alpha", 2), Some(2.0), "sheet says 48h = 2 days, default says 10");
}

/// Teams without a rule fall back to the severity default; unmapped
/// severities resolve to nothing.
#[test]
fn fallback_and_unmapped() {
    let resolver = resolver_from("Team,Severity,TTR_Hours\nAlpha,Sev0,24\n");
    assert_eq!(resolver.resolve_with_source("Beta", 2), Some((10.0, SlaSource::Default)));
    assert_eq!(resolver.resolve("Alpha", 1), Some(5.0), "Alpha has no Sev1 rule");
    assert_eq!(resolver.resolve("Beta", 7), None, "severity 7 is in neither tier");
}

/// Duplicate (team, severity) rows keep the first occurrence.
#[test]
fn duplicate_rows_first_wins() {
    let resolver = resolver_from("Team,Severity,TTR_Hours\nAlpha,Sev1,24\nAlpha,Sev1,72\n");
    assert_eq!(resolver.resolve("Alpha", 1), Some(1.0));
    assert_eq!(resolver.rules().len(), 1);

    let mut table = SlaRuleTable::new();
    let rule = |days| SlaRule { team: "Alpha".into(), severity: 1, target_days: days };
    assert!(table.insert(rule(1.0)));
    assert!(!table.insert(rule(3.0)), "second insert of the same pair must be refused");
}

/// Incomplete or malformed rows are dropped and counted, never fatal.
#[test]
fn malformed_rows_are_dropped() {
    let sheet = read_sla_sheet(
        "Team,Severity,TTR_Hours\n\
         ,Sev1,24\n\
         Alpha,High,24\n\
         Alpha,Sev2,abc\n\
         Alpha,Sev3,\n\
         Gamma,Sev3,120\n"
            .as_bytes(),
    )
    .expect("sheet parses");
    assert_eq!(sheet.dropped, 4, "four rows lack a usable field");
    assert_eq!(sheet.rules.len(), 1);
    assert_eq!(sheet.rules.get("Gamma", 3), Some(5.0));
}

/// Resolution is a pure function of its inputs.
#[test]
fn resolution_is_deterministic() {
    let resolver = resolver_from("Team,Severity,TTR_Hours\nAlpha,Sev0,6\n");
    let first: Vec<_> = (0..5).map(|s| resolver.resolve("Alpha", s)).collect();
    let second: Vec<_> = (0..5).map(|s| resolver.resolve("Alpha", s)).collect();
    assert_eq!(first, second);
    assert_eq!(first[0], Some(0.25));
}

/// A missing sheet yields an empty rule table and a warning, not an error.
#[test]
fn missing_sheet_warns() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("SLA_sheet.csv");
    let (rules, warnings) = load_sla_sheet(&path);
    assert!(rules.is_empty());
    assert_eq!(warnings.len(), 1);
    assert!(
        matches!(warnings[0], LoadWarning::SlaSheetMissing { .. }),
        "expected SlaSheetMissing, got {:?}",
        warnings[0]
    );
}

/// A sheet without the expected header columns is unreadable but still
/// non-fatal.
#[test]
fn headerless_sheet_is_unreadable_not_fatal() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "Group,Priority,Hours\nAlpha,Sev0,24").expect("write");
    let (rules, warnings) = load_sla_sheet(file.path());
    assert!(rules.is_empty());
    assert!(matches!(warnings.as_slice(), [LoadWarning::SlaSheetUnreadable { .. }]));
}

/// A sheet on disk drives the normalizer's per-case targets, and dropped
/// rows surface as a warning on the compiled report.
#[test]
fn engine_uses_sheet_targets() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "Team,Severity,TTR_Hours\nAlpha,Sev0,24\nAlpha,Bad,1").expect("write");

    let engine = InsightEngine::build(
        InsightsConfig::default(),
        Some(file.path()),
        ReportClock::fixed(ts(NOW)),
    )
    .expect("engine builds");
    let table = engine.normalize_records(vec![
        case("A-1").group("Alpha").severity("Sev0").build(),
        case("B-1").group("Beta").severity("Sev0").build(),
        case("B-2").group("Beta").severity("High").build(),
    ]);

    assert_eq!(table.cases[0].sla_target_days, Some(1.0));
    assert_eq!(table.cases[1].sla_target_days, Some(1.0), "default Sev0 target is also one day");
    assert_eq!(table.cases[2].sla_target_days, None, "unparseable severity has no target");

    let report = engine.generate_report(&table);
    assert!(
        report.warnings.contains(&LoadWarning::SlaRowsDropped { count: 1 }),
        "report should carry the dropped-row warning: {:?}",
        report.warnings
    );
}

/// Without a sheet, the engine runs on defaults and warns about the path.
#[test]
fn engine_survives_missing_sheet() {
    let dir = tempfile::tempdir().expect("temp dir");
    let engine = InsightEngine::build(
        InsightsConfig::default(),
        Some(dir.path().join("absent.csv").as_path()),
        ReportClock::fixed(ts(NOW)),
    )
    .expect("engine builds");
    assert!(engine.resolver().rules().is_empty());
    assert_eq!(engine.resolver().resolve("Anyone", 3), Some(20.0));
    assert_eq!(engine.warnings().len(), 1);
}

/// Building a table from rules keeps sheet order and drops repeated pairs.
#[test]
fn rule_table_from_rules_keeps_order() {
    let rule = |team: &str, severity, days| SlaRule { team: team.into(), severity, target_days: days };
    let table = SlaRuleTable::from_rules([
        rule("Beta", 0, 0.5),
        rule("Alpha", 1, 2.0),
        rule("Beta", 0, 9.0),
    ]);
    let order: Vec<(&str, u8, f64)> = table
        .iter()
        .map(|r| (r.team.as_str(), r.severity, r.target_days))
        .collect();
    assert_eq!(order, vec![("Beta", 0, 0.5), ("Alpha", 1, 2.0)]);
}

/// A caller-supplied default map replaces the built-in one entirely.
#[test]
fn default_map_override() {
    let resolver = SlaResolver::defaults_only([(2, 3.0)].into_iter().collect());
    assert_eq!(resolver.resolve("Anyone", 2), Some(3.0));
    assert_eq!(resolver.resolve("Anyone", 0), None, "Sev0 is unmapped once overridden");

    let config = InsightsConfig::default().with_default_sla_days([(2, 3.0)].into_iter().collect());
    let engine = common::engine_with(config, SlaRuleTable::new());
    let table = engine.normalize_records(vec![
        case("A").severity("Sev2").build(),
        case("B").severity("Sev0").build(),
    ]);
    assert_eq!(table.cases[0].sla_target_days, Some(3.0));
    assert_eq!(table.cases[1].sla_target_days, None);
}
