//! Risk identifier tests — SLA exposure, high-priority backlog, aging, escalation.

mod common;

use caseflow_core::{
    analyzer::Analyzer,
    risk_analyzer::{RiskAnalyzer, Risks},
    table::CaseTable,
};
use common::{case, engine, table};

fn risks(t: &CaseTable) -> Risks {
    let engine = engine();
    RiskAnalyzer.analyze(&engine.context(t))
}

/// Open cases at or above 75% of their target are at risk, highest first.
/// Closed cases never are.
#[test]
fn sla_at_risk_threshold_and_order() {
    let r = risks(&table(vec![
        case("R-70").opened_days_ago(7.0).build(),
        case("R-75").opened_days_ago(7.5).build(),
        case("R-80").opened_days_ago(8.0).build(),
        case("R-200").severity("Sev0").opened_days_ago(2.0).build(),
        case("R-closed").severity("Sev0").opened_days_ago(9.0).closed_after(8.0).build(),
    ]));
    let ids: Vec<&str> = r.sla_at_risk.iter().map(|c| c.case_id.as_str()).collect();
    assert_eq!(ids, vec!["R-200", "R-80", "R-75"], "exactly 75% is at risk, 70% is not");
    assert!(r.sla_at_risk.iter().all(|c| c.sla_risk_pct >= 75.0));
    assert_eq!(r.sla_at_risk[0].sla_risk_pct, 200.0);
    assert_eq!(r.sla_at_risk[0].sla_target_days, 1.0);
    assert_eq!(r.sla_at_risk[2].sla_risk_pct, 75.0);
}

/// The at-risk list is capped at twenty, keeping the worst.
#[test]
fn sla_at_risk_is_capped() {
    let records = (0..25)
        .map(|i| case(&format!("S-{i:02}")).severity("Sev0").opened_days_ago(2.0 + i as f64).build())
        .collect();
    let r = risks(&table(records));
    assert_eq!(r.sla_at_risk.len(), 20);
    assert_eq!(r.sla_at_risk[0].case_id, "S-24");
    assert_eq!(r.sla_at_risk[19].case_id, "S-05");
    assert!(r
        .sla_at_risk
        .windows(2)
        .all(|w| w[0].sla_risk_pct >= w[1].sla_risk_pct));
}

/// Cases without a usable target or creation time are never at risk.
#[test]
fn unresolvable_cases_are_not_at_risk() {
    let r = risks(&table(vec![
        case("U-1").severity("Urgent").opened_days_ago(400.0).build(),
        case("U-2").severity("Sev0").created("").build(),
    ]));
    assert!(r.sla_at_risk.is_empty());
}

/// Every open Sev0/Sev1 case is listed, in table order; an undated one
/// carries a null age.
#[test]
fn high_priority_open_cases() {
    let r = risks(&table(vec![
        case("H-1").severity("Sev1").opened_days_ago(3.0).build(),
        case("H-2").severity("Sev0").created("").build(),
        case("H-3").severity("Sev0").opened_days_ago(9.0).closed_after(1.0).build(),
        case("L-1").severity("Sev3").build(),
    ]));
    let listed: Vec<(&str, Option<f64>)> = r
        .high_priority_open
        .iter()
        .map(|c| (c.case_id.as_str(), c.days_open))
        .collect();
    assert_eq!(listed, vec![("H-1", Some(3.0)), ("H-2", None)]);
}

/// Aging means strictly older than thirty days; oldest first.
#[test]
fn aging_cases_oldest_first() {
    let r = risks(&table(vec![
        case("A-30").opened_days_ago(30.0).build(),
        case("A-31").opened_days_ago(31.0).build(),
        case("A-90").opened_days_ago(90.0).build(),
        case("A-closed").opened_days_ago(90.0).closed_after(1.0).build(),
    ]));
    let ids: Vec<&str> = r.aging_cases.iter().map(|c| c.case_id.as_str()).collect();
    assert_eq!(ids, vec!["A-90", "A-31"]);
    assert_eq!(r.aging_cases[0].days_open, Some(90.0));
}

/// Watched statuses with open cases are reported, counting those older
/// than a week. Statuses with no open cases are omitted.
#[test]
fn escalation_status_counts() {
    let r = risks(&table(vec![
        case("E-1").status("Analysis").opened_days_ago(8.0).build(),
        case("E-2").status("Analysis").opened_days_ago(3.0).build(),
        case("E-3").status("Review").opened_days_ago(2.0).build(),
    ]));
    let stuck = &r.escalation_risks.cases_stuck_in_status;
    assert_eq!(stuck.get("Analysis"), Some(&1));
    assert_eq!(stuck.get("Review"), Some(&0));
    assert_eq!(stuck.get("Contain"), None);
    assert_eq!(r.escalation_risks.high_update_count_cases, 0);
}

/// Rows repeating one case id more than five times count as heavily updated.
#[test]
fn repeated_ids_flag_high_update_counts() {
    let mut records: Vec<_> = (0..6).map(|_| case("DUP-1").build()).collect();
    records.extend((0..5).map(|_| case("DUP-2").build()));
    let r = risks(&table(records));
    assert_eq!(r.escalation_risks.high_update_count_cases, 6);
}
