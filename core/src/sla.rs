//! SLA target resolution.
//!
//! Two tiers, checked in order:
//!   1. the per-team rule table loaded from the SLA sheet
//!   2. the global severity → days default map
//!
//! A (team, severity) pair present in tier 1 never falls through to tier 2.

use crate::{
    config::{SLA_COL_SEVERITY, SLA_COL_TEAM, SLA_COL_TTR_HOURS},
    error::InsightResult,
    severity::parse_sev_label,
    types::{Days, SeverityRank},
    warning::LoadWarning,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

const HOURS_PER_DAY: f64 = 24.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlaRule {
    pub team:        String,
    pub severity:    SeverityRank,
    pub target_days: Days,
}

/// Which tier produced a resolved target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlaSource {
    TeamRule,
    Default,
}

/// Ordered per-team rules, unique per (team, severity).
#[derive(Debug, Clone, Default)]
pub struct SlaRuleTable {
    rules: Vec<SlaRule>,
    index: HashMap<(String, SeverityRank), usize>,
}

impl SlaRuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rules in sheet order. A repeated pair keeps its first entry.
    pub fn from_rules(rules: impl IntoIterator<Item = SlaRule>) -> Self {
        let mut table = Self::new();
        for rule in rules {
            table.insert(rule);
        }
        table
    }

    /// Returns false when the pair already exists and the rule was ignored.
    pub fn insert(&mut self, rule: SlaRule) -> bool {
        let key = (rule.team.clone(), rule.severity);
        if self.index.contains_key(&key) {
            log::debug!(
                "Duplicate SLA rule for ({}, Sev{}) ignored; first entry wins",
                rule.team,
                rule.severity
            );
            return false;
        }
        self.index.insert(key, self.rules.len());
        self.rules.push(rule);
        true
    }

    pub fn get(&self, team: &str, severity: SeverityRank) -> Option<Days> {
        self.index
            .get(&(team.to_string(), severity))
            .map(|&i| self.rules[i].target_days)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlaRule> {
        self.rules.iter()
    }
}

/// Result of reading an SLA sheet: the rules kept and how many rows were dropped.
#[derive(Debug, Clone, Default)]
pub struct SlaSheet {
    pub rules:   SlaRuleTable,
    pub dropped: usize,
}

/// Parse an SLA sheet with `Team`, `Severity` ("SevN") and `TTR_Hours` columns.
///
/// Rows with a blank field, a non-numeric or non-finite `TTR_Hours`, or a
/// severity without the `Sev` prefix are dropped and counted.
pub fn read_sla_sheet<R: Read>(reader: R) -> InsightResult<SlaSheet> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let (team_col, sev_col, ttr_col) =
        match (column(SLA_COL_TEAM), column(SLA_COL_SEVERITY), column(SLA_COL_TTR_HOURS)) {
            (Some(t), Some(s), Some(h)) => (t, s, h),
            _ => {
                return Err(anyhow::anyhow!(
                    "SLA sheet must have '{SLA_COL_TEAM}', '{SLA_COL_SEVERITY}' and '{SLA_COL_TTR_HOURS}' columns"
                )
                .into())
            }
        };

    let mut sheet = SlaSheet::default();
    for record in rdr.records() {
        let record = record?;
        let field = |i: usize| record.get(i).filter(|v| !v.is_empty());

        let parsed = match (field(team_col), field(sev_col), field(ttr_col)) {
            (Some(team), Some(sev), Some(hours)) => hours
                .parse::<f64>()
                .ok()
                .filter(|h| h.is_finite())
                .zip(parse_sev_label(sev))
                .map(|(hours, severity)| SlaRule {
                    team: team.to_string(),
                    severity,
                    target_days: hours / HOURS_PER_DAY,
                }),
            _ => None,
        };

        match parsed {
            Some(rule) => {
                sheet.rules.insert(rule);
            }
            None => sheet.dropped += 1,
        }
    }
    Ok(sheet)
}

/// Load the SLA sheet at `path`. Never fails: a missing or unreadable sheet
/// yields an empty table and a warning.
pub fn load_sla_sheet(path: impl AsRef<Path>) -> (SlaRuleTable, Vec<LoadWarning>) {
    let path = path.as_ref();
    let display = path.display().to_string();
    let mut warnings = Vec::new();

    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warnings.push(LoadWarning::SlaSheetMissing { path: display });
            return (SlaRuleTable::new(), warnings);
        }
        Err(e) => {
            warnings.push(LoadWarning::SlaSheetUnreadable { path: display, reason: e.to_string() });
            return (SlaRuleTable::new(), warnings);
        }
    };

    match read_sla_sheet(file) {
        Ok(sheet) => {
            log::info!("Loaded {} SLA rules from {display}", sheet.rules.len());
            if sheet.dropped > 0 {
                warnings.push(LoadWarning::SlaRowsDropped { count: sheet.dropped });
            }
            (sheet.rules, warnings)
        }
        Err(e) => {
            warnings.push(LoadWarning::SlaSheetUnreadable { path: display, reason: e.to_string() });
            (SlaRuleTable::new(), warnings)
        }
    }
}

/// Resolves (team, severity) to a target duration in days.
#[derive(Debug, Clone)]
pub struct SlaResolver {
    rules:    SlaRuleTable,
    defaults: BTreeMap<SeverityRank, Days>,
}

impl SlaResolver {
    pub fn new(rules: SlaRuleTable, defaults: BTreeMap<SeverityRank, Days>) -> Self {
        Self { rules, defaults }
    }

    /// A resolver with no team rules.
    pub fn defaults_only(defaults: BTreeMap<SeverityRank, Days>) -> Self {
        Self::new(SlaRuleTable::new(), defaults)
    }

    pub fn resolve(&self, team: &str, severity: SeverityRank) -> Option<Days> {
        self.resolve_with_source(team, severity).map(|(days, _)| days)
    }

    /// Like [`resolve`](Self::resolve), also reporting which tier matched.
    pub fn resolve_with_source(
        &self,
        team: &str,
        severity: SeverityRank,
    ) -> Option<(Days, SlaSource)> {
        if let Some(days) = self.rules.get(team, severity) {
            return Some((days, SlaSource::TeamRule));
        }
        self.default_for(severity).map(|days| (days, SlaSource::Default))
    }

    pub fn default_for(&self, severity: SeverityRank) -> Option<Days> {
        self.defaults.get(&severity).copied()
    }

    pub fn defaults(&self) -> &BTreeMap<SeverityRank, Days> {
        &self.defaults
    }

    pub fn rules(&self) -> &SlaRuleTable {
        &self.rules
    }
}
