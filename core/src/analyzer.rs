//! Analyzer trait and the read-only context every analyzer receives.
//!
//! RULE: Analyzers never mutate the table and never call each other's
//! `analyze()`. Shared reductions live as free functions in the module
//! that owns them.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    clock::ReportClock,
    config::InsightsConfig,
    table::{Case, CaseTable},
    types::Days,
};
use serde::Serialize;

/// Everything an analysis may read.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub table:  &'a CaseTable,
    pub config: &'a InsightsConfig,
    pub clock:  ReportClock,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(table: &'a CaseTable, config: &'a InsightsConfig, clock: ReportClock) -> Self {
        Self { table, config, clock }
    }

    /// Days between creation and the report clock. None without a creation time.
    pub fn days_open(&self, case: &Case) -> Option<Days> {
        case.created_at.map(|created| self.clock.days_since(created))
    }
}

/// The contract every analysis fulfills.
pub trait Analyzer {
    /// The structured result stored in the insight bag.
    type Output: Serialize;

    /// Stable key of this analysis in the insight bag.
    fn name(&self) -> &'static str;

    /// Reduce the table. Edge cases default to zero or null; nothing fails.
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Self::Output;
}
