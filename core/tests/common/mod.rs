//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use caseflow_core::{
    clock::ReportClock,
    config::InsightsConfig,
    engine::InsightEngine,
    sla::SlaRuleTable,
    table::{CaseRecord, CaseTable},
};
use chrono::NaiveDateTime;

/// The fixed "now" every test report is computed against.
pub const NOW: &str = "2024-06-30 00:00:00";

pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").expect("test timestamp")
}

pub fn clock() -> ReportClock {
    ReportClock::fixed(ts(NOW))
}

/// `days` before the test clock, formatted as a case-table cell.
pub fn days_ago(days: f64) -> String {
    let secs = (days * 86_400.0).round() as i64;
    (ts(NOW) - chrono::Duration::seconds(secs))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn engine() -> InsightEngine {
    engine_with(InsightsConfig::default(), SlaRuleTable::new())
}

pub fn engine_with(config: InsightsConfig, rules: SlaRuleTable) -> InsightEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    InsightEngine::new(config, rules, clock())
}

pub fn table(records: Vec<CaseRecord>) -> CaseTable {
    engine().normalize_records(records)
}

/// Builder over a raw row. Defaults: open, Sev2, "Analysis",
/// "Login Failure", "SecurityOps", created ten days before the test clock.
pub struct CaseBuilder(CaseRecord);

impl CaseBuilder {
    pub fn new(id: &str) -> Self {
        let created = days_ago(10.0);
        Self(CaseRecord {
            case_id:          id.into(),
            created:          created.clone(),
            updated:          created,
            closed:           None,
            severity:         "Sev2".into(),
            status:           "Analysis".into(),
            case_type:        "Login Failure".into(),
            assignment_group: "SecurityOps".into(),
            source:           Some("SIEM Alert".into()),
            summary:          None,
            resolution:       None,
        })
    }

    pub fn created(mut self, at: &str) -> Self {
        self.0.created = at.into();
        self.0.updated = at.into();
        self
    }

    pub fn opened_days_ago(self, days: f64) -> Self {
        let at = days_ago(days);
        self.created(&at)
    }

    /// Closed `days` after creation. Negative values close before creation.
    pub fn closed_after(mut self, days: f64) -> Self {
        let created = NaiveDateTime::parse_from_str(&self.0.created, "%Y-%m-%d %H:%M:%S")
            .expect("builder timestamps use the canonical layout");
        let closed = created + chrono::Duration::seconds((days * 86_400.0).round() as i64);
        self.0.closed = Some(closed.format("%Y-%m-%d %H:%M:%S").to_string());
        self.0.status = "Closed".into();
        self
    }

    pub fn end_date(mut self, at: &str) -> Self {
        self.0.closed = Some(at.into());
        self
    }

    pub fn severity(mut self, sev: &str) -> Self {
        self.0.severity = sev.into();
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.0.status = status.into();
        self
    }

    pub fn case_type(mut self, t: &str) -> Self {
        self.0.case_type = t.into();
        self
    }

    pub fn group(mut self, g: &str) -> Self {
        self.0.assignment_group = g.into();
        self
    }

    pub fn source(mut self, s: &str) -> Self {
        self.0.source = Some(s.into());
        self
    }

    pub fn summary(mut self, s: &str) -> Self {
        self.0.summary = Some(s.into());
        self
    }

    pub fn resolution(mut self, s: &str) -> Self {
        self.0.resolution = Some(s.into());
        self
    }

    pub fn build(self) -> CaseRecord {
        self.0
    }
}

pub fn case(id: &str) -> CaseBuilder {
    CaseBuilder::new(id)
}
