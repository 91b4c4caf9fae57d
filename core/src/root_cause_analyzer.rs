//! Root-cause analyzer — keyword themes per case type, categorical
//! correlations, severity drivers and resolution-time factors.

use crate::{
    analyzer::{AnalysisContext, Analyzer},
    config::RootCauseConfig,
    inefficiency_analyzer::mean_resolution,
    keywords::{FrequencySummarizer, KeywordSummarizer},
    pattern_analyzer::resolution_by,
    stats::{cross_tab, CrossTab, LabelCount, Tally},
    table::{Case, CaseTable},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootCause {
    pub case_type:      String,
    pub frequency:      usize,
    pub common_phrases: Vec<LabelCount>,
    pub avg_resolution: Option<f64>,
}

/// Source tables are empty when the input has no source column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseTypeCorrelations {
    pub type_severity_correlation: CrossTab,
    pub type_source_correlation:   CrossTab,
    pub type_group_correlation:    CrossTab,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeverityDrivers {
    pub source_severity:        CrossTab,
    pub type_severity:          CrossTab,
    /// Case type → number of high-priority cases.
    pub high_severity_patterns: BTreeMap<String, usize>,
}

/// Empty maps when no case has a usable resolution time. The source map
/// is also empty when the input has no source column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResolutionFactors {
    pub resolution_by_type:     BTreeMap<String, f64>,
    pub resolution_by_severity: BTreeMap<String, f64>,
    pub resolution_by_group:    BTreeMap<String, f64>,
    pub resolution_by_source:   BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootCauseAnalysis {
    pub common_root_causes:     Vec<RootCause>,
    pub case_type_correlations: CaseTypeCorrelations,
    pub severity_drivers:       SeverityDrivers,
    pub resolution_factors:     ResolutionFactors,
}

/// Generic over the keyword miner so callers can swap the tokenizer.
pub struct RootCauseAnalyzer<S = FrequencySummarizer> {
    summarizer: S,
}

impl RootCauseAnalyzer<FrequencySummarizer> {
    pub fn from_config(config: &RootCauseConfig) -> Self {
        Self { summarizer: FrequencySummarizer::from_config(config) }
    }
}

impl<S: KeywordSummarizer> RootCauseAnalyzer<S> {
    pub fn with_summarizer(summarizer: S) -> Self {
        Self { summarizer }
    }
}

impl<S: KeywordSummarizer> Analyzer for RootCauseAnalyzer<S> {
    type Output = RootCauseAnalysis;

    fn name(&self) -> &'static str {
        "root_cause_analysis"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> RootCauseAnalysis {
        let table = ctx.table;
        RootCauseAnalysis {
            common_root_causes:     self.common_root_causes(table),
            case_type_correlations: case_type_correlations(table),
            severity_drivers:       severity_drivers(table),
            resolution_factors:     resolution_factors(table),
        }
    }
}

impl<S: KeywordSummarizer> RootCauseAnalyzer<S> {
    /// Case types carrying at least one summary, most frequent first
    /// (ties in first-seen order).
    fn common_root_causes(&self, table: &CaseTable) -> Vec<RootCause> {
        let types: Tally<String> = table.tally_by(|c| c.case_type.as_str());
        types
            .ranked()
            .into_iter()
            .filter_map(|(case_type, frequency)| {
                let cases: Vec<&Case> = table.iter().filter(|c| c.case_type == case_type).collect();
                let summaries: Vec<&str> = cases.iter().filter_map(|c| c.summary.as_deref()).collect();
                if summaries.is_empty() {
                    return None;
                }
                Some(RootCause {
                    common_phrases: self.summarizer.summarize(&summaries),
                    avg_resolution: mean_resolution(&cases),
                    case_type,
                    frequency,
                })
            })
            .collect()
    }
}

fn case_type_correlations(table: &CaseTable) -> CaseTypeCorrelations {
    CaseTypeCorrelations {
        type_severity_correlation: pairs(table, |c| (c.case_type.as_str(), c.severity_label.as_str())),
        type_source_correlation:   source_pairs(table, |c| (c.case_type.as_str(), c.source.as_str())),
        type_group_correlation:    pairs(table, |c| (c.case_type.as_str(), c.assignment_group.as_str())),
    }
}

fn severity_drivers(table: &CaseTable) -> SeverityDrivers {
    SeverityDrivers {
        source_severity: source_pairs(table, |c| (c.source.as_str(), c.severity_label.as_str())),
        type_severity:   pairs(table, |c| (c.case_type.as_str(), c.severity_label.as_str())),
        high_severity_patterns: table
            .iter()
            .filter(|c| c.is_high_priority)
            .map(|c| c.case_type.clone())
            .collect::<Tally<String>>()
            .to_map(),
    }
}

fn resolution_factors(table: &CaseTable) -> ResolutionFactors {
    if table.resolved().next().is_none() {
        return ResolutionFactors::default();
    }
    ResolutionFactors {
        resolution_by_type:     resolution_by(table, |c| c.case_type.as_str()),
        resolution_by_severity: resolution_by(table, |c| c.severity_label.as_str()),
        resolution_by_group:    resolution_by(table, |c| c.assignment_group.as_str()),
        resolution_by_source:   if table.columns.source {
            resolution_by(table, |c| c.source.as_str())
        } else {
            BTreeMap::new()
        },
    }
}

fn pairs<'a, F>(table: &'a CaseTable, f: F) -> CrossTab
where
    F: Fn(&'a Case) -> (&'a str, &'a str),
{
    cross_tab(table.iter().map(f))
}

/// Like `pairs`, but empty when the input never carried a source column.
fn source_pairs<'a, F>(table: &'a CaseTable, f: F) -> CrossTab
where
    F: Fn(&'a Case) -> (&'a str, &'a str),
{
    if !table.columns.source {
        return CrossTab::new();
    }
    pairs(table, f)
}
