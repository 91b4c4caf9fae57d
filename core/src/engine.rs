//! The insight engine — one table in, one report out.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   0. SLA sheet load          (once, at build)
//!   1. Case table load + normalization
//!   2. KPI aggregator
//!   3. Pattern detector
//!   4. Risk identifier
//!   5. Inefficiency detector
//!   6. Root-cause analyzer
//!   7. Report compiler
//!
//! RULES:
//!   - Every analyzer reads the same normalized table and nothing else.
//!   - No analyzer calls another analyzer's `analyze()`.
//!   - Every "now" flows through the engine's ReportClock.
//!   - Load degradations become warnings on the report, never errors,
//!     except for the case table itself.

use crate::{
    analyzer::{AnalysisContext, Analyzer},
    clock::ReportClock,
    config::InsightsConfig,
    error::InsightResult,
    inefficiency_analyzer::InefficiencyAnalyzer,
    kpi_analyzer::KpiAnalyzer,
    normalize::Normalizer,
    pattern_analyzer::PatternAnalyzer,
    report::{InsightBag, InsightReport},
    risk_analyzer::RiskAnalyzer,
    root_cause_analyzer::RootCauseAnalyzer,
    sla::{load_sla_sheet, SlaResolver, SlaRuleTable},
    table::{load_case_records, read_case_records, CaseRecord, CaseRecords, CaseTable},
    warning::LoadWarning,
};
use std::io::Read;
use std::path::Path;

pub struct InsightEngine {
    pub config: InsightsConfig,
    pub clock:  ReportClock,
    resolver:   SlaResolver,
    warnings:   Vec<LoadWarning>,
}

impl InsightEngine {
    /// Wire an engine from parts. Does not validate `config`; `build` does.
    pub fn new(config: InsightsConfig, rules: SlaRuleTable, clock: ReportClock) -> Self {
        let resolver = SlaResolver::new(rules, config.default_sla_days.clone());
        Self { config, clock, resolver, warnings: Vec::new() }
    }

    /// Build a fully wired engine. An invalid config is fatal; a missing or
    /// unreadable SLA sheet leaves the engine on default targets and records
    /// a warning.
    pub fn build(
        config: InsightsConfig,
        sla_sheet: Option<&Path>,
        clock: ReportClock,
    ) -> InsightResult<Self> {
        config.validate()?;
        let (rules, warnings) = match sla_sheet {
            Some(path) => load_sla_sheet(path),
            None => (SlaRuleTable::new(), Vec::new()),
        };
        for w in &warnings {
            w.log();
        }
        let mut engine = Self::new(config, rules, clock);
        engine.warnings = warnings;
        log::info!(
            "Insight engine ready: {} SLA rules, clock {}{}",
            engine.resolver.rules().len(),
            engine.clock.now,
            if engine.clock.fixed { " (fixed)" } else { "" },
        );
        Ok(engine)
    }

    pub fn resolver(&self) -> &SlaResolver {
        &self.resolver
    }

    /// Warnings raised while building the engine (SLA sheet).
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    // ── Loading ──────────────────────────────────────────────────────────

    /// Load and normalize the case table at `path`. The only fatal step.
    pub fn load_cases(&self, path: impl AsRef<Path>) -> InsightResult<CaseTable> {
        Ok(self.normalize(load_case_records(path)?))
    }

    pub fn read_cases<R: Read>(&self, reader: R) -> InsightResult<CaseTable> {
        Ok(self.normalize(read_case_records(reader)?))
    }

    pub fn normalize(&self, records: CaseRecords) -> CaseTable {
        Normalizer::new(&self.resolver, &self.config).normalize(records)
    }

    pub fn normalize_records(&self, records: Vec<CaseRecord>) -> CaseTable {
        Normalizer::new(&self.resolver, &self.config).normalize_records(records)
    }

    // ── Analysis ─────────────────────────────────────────────────────────

    pub fn context<'a>(&'a self, table: &'a CaseTable) -> AnalysisContext<'a> {
        AnalysisContext::new(table, &self.config, self.clock)
    }

    /// Run every analyzer once, in the documented order.
    pub fn run_analyses(&self, table: &CaseTable) -> InsightBag {
        let ctx = self.context(table);
        InsightBag {
            kpis:                run(&KpiAnalyzer, &ctx),
            patterns:            run(&PatternAnalyzer, &ctx),
            risks:               run(&RiskAnalyzer, &ctx),
            inefficiencies:      run(&InefficiencyAnalyzer, &ctx),
            root_cause_analysis: run(&RootCauseAnalyzer::from_config(&self.config.root_cause), &ctx),
        }
    }

    /// Run the analyses and compile the report. Engine and table warnings
    /// are carried on the report.
    pub fn generate_report(&self, table: &CaseTable) -> InsightReport {
        let insights = self.run_analyses(table);
        let warnings = self
            .warnings
            .iter()
            .chain(table.warnings.iter())
            .cloned()
            .collect();
        InsightReport::compile(self.clock.now, insights, &self.config, warnings)
    }
}

fn run<A: Analyzer>(analyzer: &A, ctx: &AnalysisContext<'_>) -> A::Output {
    log::debug!("Running analysis '{}' over {} cases", analyzer.name(), ctx.table.len());
    analyzer.analyze(ctx)
}
