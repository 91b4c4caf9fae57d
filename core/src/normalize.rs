//! Data normalizer — raw records to typed, derived cases.
//!
//! Runs once per table. Every field-level parse failure degrades that field
//! to absent; no record is ever rejected.

use crate::{
    clock::days_between,
    config::{InsightsConfig, COL_CLOSED, COL_CREATED, COL_UPDATED},
    severity::parse_severity_rank,
    sla::SlaResolver,
    table::{Case, CaseRecord, CaseRecords, CaseTable, ColumnPresence},
    timestamp::parse_timestamp,
    types::UNKNOWN_LABEL,
    warning::LoadWarning,
};
use chrono::NaiveDateTime;

pub struct Normalizer<'a> {
    resolver:        &'a SlaResolver,
    terminal_status: &'a str,
}

#[derive(Default)]
struct FailedParses {
    created: usize,
    updated: usize,
    closed:  usize,
}

impl<'a> Normalizer<'a> {
    pub fn new(resolver: &'a SlaResolver, config: &'a InsightsConfig) -> Self {
        Self { resolver, terminal_status: &config.terminal_status }
    }

    /// Normalize every record. Table-level warnings from reading are kept and
    /// unparseable timestamp counts are appended.
    pub fn normalize(&self, input: CaseRecords) -> CaseTable {
        let CaseRecords { records, columns, mut warnings } = input;
        let mut failed = FailedParses::default();

        let cases: Vec<Case> = records
            .into_iter()
            .map(|r| self.normalize_record(r, &mut failed))
            .collect();

        for (column, count) in [
            (COL_CREATED, failed.created),
            (COL_UPDATED, failed.updated),
            (COL_CLOSED, failed.closed),
        ] {
            if count > 0 {
                warnings.push(LoadWarning::UnparseableTimestamps { column: column.into(), count });
            }
        }
        for w in &warnings {
            w.log();
        }

        log::info!("Normalized {} cases", cases.len());
        CaseTable { cases, columns, warnings }
    }

    /// Normalize in-memory records, assuming every optional column exists.
    pub fn normalize_records(&self, records: Vec<CaseRecord>) -> CaseTable {
        self.normalize(CaseRecords {
            records,
            columns: ColumnPresence::all(),
            warnings: Vec::new(),
        })
    }

    fn normalize_record(&self, r: CaseRecord, failed: &mut FailedParses) -> Case {
        let created_at = lenient(&r.created, &mut failed.created);
        let updated_at = lenient(&r.updated, &mut failed.updated);
        let closed_at = r.closed.as_deref().and_then(|s| lenient(s, &mut failed.closed));

        let resolution_days = match (created_at, closed_at) {
            (Some(created), Some(closed)) => {
                Some(days_between(created, closed)).filter(|d| *d >= 0.0)
            }
            _ => None,
        };

        let severity = parse_severity_rank(&r.severity);
        let assignment_group = label_or_unknown(r.assignment_group);
        let sla_target_days = severity.and_then(|sev| self.resolver.resolve(&assignment_group, sev));

        Case {
            id: r.case_id,
            created_at,
            updated_at,
            closed_at,
            severity_label: label_or_unknown(r.severity),
            severity,
            is_closed: r.status == self.terminal_status,
            status: label_or_unknown(r.status),
            case_type: label_or_unknown(r.case_type),
            assignment_group,
            source: label_or_unknown(r.source.unwrap_or_default()),
            summary: r.summary.filter(|s| !s.trim().is_empty()),
            resolution_notes: r.resolution.filter(|s| !s.trim().is_empty()),
            resolution_days,
            is_high_priority: severity.is_some_and(|s| s <= 1),
            is_critical: severity == Some(0),
            sla_target_days,
        }
    }
}

fn lenient(raw: &str, failures: &mut usize) -> Option<NaiveDateTime> {
    let parsed = parse_timestamp(raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        *failures += 1;
    }
    parsed
}

fn label_or_unknown(label: String) -> String {
    if label.trim().is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        label
    }
}
