//! Seeded synthetic case tables.
//!
//! Produces raw `CaseRecord`s, so synthetic data travels the same
//! normalization path as a loaded file. Same seed, same table.

use crate::{
    rng::{RngBank, StreamRng, StreamSlot},
    table::CaseRecord,
};
use chrono::{Duration, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SEVERITIES: [(&str, f64); 5] = [
    ("Sev0", 0.04),
    ("Sev1", 0.14),
    ("Sev2", 0.37),
    ("Sev3", 0.33),
    ("Sev4", 0.12),
];

const GROUPS: [(&str, f64); 6] = [
    ("SecurityOps", 0.30),
    ("NetworkOps", 0.20),
    ("IdentityTeam", 0.18),
    ("AppSupport", 0.14),
    ("DataGovernance", 0.10),
    ("ThirdPartyRisk", 0.08),
];

const SOURCES: [(&str, f64); 4] = [
    ("SIEM Alert", 0.45),
    ("User Report", 0.25),
    ("Audit Finding", 0.15),
    ("Vendor Notice", 0.15),
];

const OPEN_STATUSES: [(&str, f64); 5] = [
    ("Draft", 0.10),
    ("Analysis", 0.35),
    ("Contain", 0.20),
    ("Review", 0.20),
    ("Pending", 0.15),
];

/// Case type with its relative frequency and summary templates.
const CASE_TYPES: [(&str, f64, &[&str]); 6] = [
    ("Login Failure", 0.28, &[
        "Repeated login failures from unfamiliar location",
        "Account locked after password spraying attempt",
        "Multiple failed logins against service account",
    ]),
    ("Malware Alert", 0.18, &[
        "Endpoint flagged suspicious executable download",
        "Quarantined attachment with macro payload",
    ]),
    ("Data Exposure", 0.14, &[
        "Sensitive report shared with external recipient",
        "Public bucket exposing customer records",
    ]),
    ("Access Review", 0.16, &[
        "Stale privileged access requires revocation",
        "Quarterly access certification overdue",
    ]),
    ("Policy Violation", 0.14, &[
        "Unapproved software installed on workstation",
        "Removable media usage outside policy",
    ]),
    ("Phishing Report", 0.10, &[
        "User reported credential harvesting email",
        "Spoofed invoice email targeting finance",
    ]),
];

const RESOLUTIONS: [&str; 4] = [
    "Credentials reset and user notified",
    "Host reimaged and indicators blocked",
    "Access revoked and owner confirmed",
    "False positive after investigation",
];

/// Shape of a synthetic table.
#[derive(Debug, Clone)]
pub struct SyntheticSpec {
    pub cases:       usize,
    pub seed:        u64,
    /// Earliest creation time.
    pub start:       NaiveDateTime,
    /// Creation times spread over this many days after `start`.
    pub span_days:   i64,
    pub closed_rate: f64,
}

impl SyntheticSpec {
    pub fn new(cases: usize, seed: u64, start: NaiveDateTime) -> Self {
        Self { cases, seed, start, span_days: 120, closed_rate: 0.6 }
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::days(self.span_days)
    }
}

/// Generate the table described by `spec`.
pub fn generate_records(spec: &SyntheticSpec) -> Vec<CaseRecord> {
    let bank = RngBank::new(spec.seed);
    let mut streams = Streams {
        arrival:   bank.stream(StreamSlot::Arrival),
        severity:  bank.stream(StreamSlot::Severity),
        taxonomy:  bank.stream(StreamSlot::Taxonomy),
        lifecycle: bank.stream(StreamSlot::Lifecycle),
        narrative: bank.stream(StreamSlot::Narrative),
    };

    let records: Vec<CaseRecord> = (0..spec.cases)
        .map(|i| synthesize(i, spec, &mut streams))
        .collect();
    log::info!("Generated {} synthetic cases (seed {})", records.len(), spec.seed);
    records
}

struct Streams {
    arrival:   StreamRng,
    severity:  StreamRng,
    taxonomy:  StreamRng,
    lifecycle: StreamRng,
    narrative: StreamRng,
}

fn synthesize(index: usize, spec: &SyntheticSpec, s: &mut Streams) -> CaseRecord {
    let span_secs = (spec.span_days.max(1) * 86_400) as f64;
    let created = spec.start + Duration::seconds((s.arrival.next_f64() * span_secs) as i64);

    let severity = s.severity.weighted(&SEVERITIES).copied().unwrap_or("Sev2");
    let group = s.taxonomy.weighted(&GROUPS).copied().unwrap_or("SecurityOps");
    let source = s.taxonomy.weighted(&SOURCES).copied().unwrap_or("SIEM Alert");
    let type_weights: Vec<(usize, f64)> = CASE_TYPES.iter().enumerate().map(|(i, t)| (i, t.1)).collect();
    let (case_type, _, templates) = CASE_TYPES[s.taxonomy.weighted(&type_weights).copied().unwrap_or(0)];

    // High severity closes faster; a few rows carry a close date before
    // their creation date, as exports sometimes do.
    let sev_scale = match severity {
        "Sev0" => 0.3,
        "Sev1" => 0.6,
        _ => 1.0,
    };
    let (status, closed) = if s.lifecycle.chance(spec.closed_rate) {
        let days = (s.lifecycle.pareto(0.5, 1.4) * sev_scale).min(90.0);
        let delta = Duration::seconds((days * 86_400.0) as i64);
        let closed = if s.lifecycle.chance(0.02) { created - delta } else { created + delta };
        ("Closed", Some(closed))
    } else {
        (s.lifecycle.weighted(&OPEN_STATUSES).copied().unwrap_or("Analysis"), None)
    };
    let updated = closed.unwrap_or_else(|| {
        created + Duration::hours(s.lifecycle.below(24 * 14) as i64)
    });

    let summary = s
        .narrative
        .chance(0.9)
        .then(|| s.narrative.pick(templates).map(|t| t.to_string()))
        .flatten();
    let resolution = closed
        .filter(|_| s.narrative.chance(0.85))
        .and_then(|_| s.narrative.pick(&RESOLUTIONS).map(|t| t.to_string()));

    CaseRecord {
        case_id:          format!("CASE-{:06}", index + 1),
        created:          created.format(TIMESTAMP_FORMAT).to_string(),
        updated:          updated.format(TIMESTAMP_FORMAT).to_string(),
        closed:           closed.map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
        severity:         severity.to_string(),
        status:           status.to_string(),
        case_type:        case_type.to_string(),
        assignment_group: group.to_string(),
        source:           Some(source.to_string()),
        summary,
        resolution,
    }
}
