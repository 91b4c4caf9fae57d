//! Case table — raw rows in, normalized cases out.
//!
//! RULE: Only this module reads the case file.
//! Analyzers receive a `CaseTable` and never see raw text cells.

use crate::{
    config::{
        COL_CASE_ID, COL_CLOSED, COL_CREATED, COL_GROUP, COL_RESOLUTION, COL_SEVERITY,
        COL_SOURCE, COL_STATUS, COL_SUMMARY, COL_TYPE, COL_UPDATED,
    },
    error::{InsightError, InsightResult},
    stats::Tally,
    types::{CaseId, Days, SeverityRank},
    warning::LoadWarning,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 7] = [
    COL_CASE_ID,
    COL_CREATED,
    COL_UPDATED,
    COL_SEVERITY,
    COL_STATUS,
    COL_TYPE,
    COL_GROUP,
];

/// One input row, exactly as read. Optional columns are `None` when the
/// column is absent or the cell is blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CaseRecord {
    pub case_id:          String,
    pub created:          String,
    pub updated:          String,
    pub closed:           Option<String>,
    pub severity:         String,
    pub status:           String,
    pub case_type:        String,
    pub assignment_group: String,
    pub source:           Option<String>,
    pub summary:          Option<String>,
    pub resolution:       Option<String>,
}

/// Which optional columns the input actually carried.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnPresence {
    pub closed:     bool,
    pub source:     bool,
    pub summary:    bool,
    pub resolution: bool,
}

impl ColumnPresence {
    pub fn all() -> Self {
        Self { closed: true, source: true, summary: true, resolution: true }
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = REQUIRED_COLUMNS.to_vec();
        if self.closed {
            names.push(COL_CLOSED);
        }
        if self.source {
            names.push(COL_SOURCE);
        }
        if self.summary {
            names.push(COL_SUMMARY);
        }
        if self.resolution {
            names.push(COL_RESOLUTION);
        }
        names
    }
}

impl Default for ColumnPresence {
    fn default() -> Self {
        Self::all()
    }
}

/// A normalized case. Derived fields are computed once, at load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    pub id:               CaseId,
    pub created_at:       Option<NaiveDateTime>,
    pub updated_at:       Option<NaiveDateTime>,
    pub closed_at:        Option<NaiveDateTime>,
    pub severity_label:   String,
    pub severity:         Option<SeverityRank>,
    pub status:           String,
    pub case_type:        String,
    pub assignment_group: String,
    pub source:           String,
    pub summary:          Option<String>,
    pub resolution_notes: Option<String>,

    // ── Derived ───────────────────────────────────
    pub resolution_days:  Option<Days>,
    pub is_closed:        bool,
    pub is_high_priority: bool,
    pub is_critical:      bool,
    pub sla_target_days:  Option<Days>,
}

impl Case {
    /// Resolution time, but only for closed cases. This is the subset every
    /// resolution-time statistic is computed over.
    pub fn closed_resolution_days(&self) -> Option<Days> {
        if self.is_closed {
            self.resolution_days
        } else {
            None
        }
    }

    pub fn is_open(&self) -> bool {
        !self.is_closed
    }
}

/// The normalized, read-only input of one report.
#[derive(Debug, Clone, Default)]
pub struct CaseTable {
    pub cases:    Vec<Case>,
    pub columns:  ColumnPresence,
    pub warnings: Vec<LoadWarning>,
}

impl CaseTable {
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Case> {
        self.cases.iter()
    }

    pub fn open_cases(&self) -> impl Iterator<Item = &Case> {
        self.cases.iter().filter(|c| c.is_open())
    }

    /// Count cases per label, in first-seen order.
    pub fn tally_by<F>(&self, label: F) -> Tally<String>
    where
        F: Fn(&Case) -> &str,
    {
        self.cases.iter().map(|c| label(c).to_string()).collect()
    }

    /// Closed cases with a defined, non-negative resolution time.
    pub fn resolved(&self) -> impl Iterator<Item = (&Case, Days)> {
        self.cases
            .iter()
            .filter_map(|c| c.closed_resolution_days().map(|d| (c, d)))
    }
}

/// Raw rows plus what the header row told us.
#[derive(Debug, Clone, Default)]
pub struct CaseRecords {
    pub records:  Vec<CaseRecord>,
    pub columns:  ColumnPresence,
    pub warnings: Vec<LoadWarning>,
}

/// Read a case table from CSV. Fails only when a required column is missing
/// or the CSV itself is malformed.
pub fn read_case_records<R: Read>(reader: R) -> InsightResult<CaseRecords> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let mut required = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = position(name).ok_or_else(|| InsightError::MissingColumn { column: name.into() })?;
    }
    let [id_col, created_col, updated_col, sev_col, status_col, type_col, group_col] = required;

    let closed_col = position(COL_CLOSED);
    let source_col = position(COL_SOURCE);
    let summary_col = position(COL_SUMMARY);
    let resolution_col = position(COL_RESOLUTION);

    let columns = ColumnPresence {
        closed:     closed_col.is_some(),
        source:     source_col.is_some(),
        summary:    summary_col.is_some(),
        resolution: resolution_col.is_some(),
    };
    let warnings: Vec<LoadWarning> = [
        (closed_col, COL_CLOSED),
        (source_col, COL_SOURCE),
        (summary_col, COL_SUMMARY),
        (resolution_col, COL_RESOLUTION),
    ]
    .into_iter()
    .filter(|(col, _)| col.is_none())
    .map(|(_, name)| LoadWarning::OptionalColumnMissing { column: name.into() })
    .collect();

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let cell = |i: usize| row.get(i).unwrap_or_default().to_string();
        let optional = |col: Option<usize>| {
            col.and_then(|i| row.get(i))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        records.push(CaseRecord {
            case_id:          cell(id_col),
            created:          cell(created_col),
            updated:          cell(updated_col),
            closed:           optional(closed_col),
            severity:         cell(sev_col),
            status:           cell(status_col),
            case_type:        cell(type_col),
            assignment_group: cell(group_col),
            source:           optional(source_col),
            summary:          optional(summary_col),
            resolution:       optional(resolution_col),
        });
    }

    log::info!("Read {} case rows", records.len());
    Ok(CaseRecords { records, columns, warnings })
}

/// Open and read the case table at `path`.
pub fn load_case_records(path: impl AsRef<Path>) -> InsightResult<CaseRecords> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| InsightError::CaseTableUnreadable {
        path:   path.display().to_string(),
        source: e.into(),
    })?;
    read_case_records(file)
}
