//! Non-fatal load degradations.
//!
//! RULE: Only the case table itself may abort a report.
//! Everything else that goes wrong while loading is recorded here,
//! logged once, and carried on the compiled report.

use serde::{Deserialize, Serialize};

/// Every degradation the loaders can report.
/// Variants are added as loaders grow, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoadWarning {
    // ── SLA sheet ──────────────────────────────────
    SlaSheetMissing {
        path: String,
    },
    SlaSheetUnreadable {
        path: String,
        reason: String,
    },
    SlaRowsDropped {
        count: usize,
    },

    // ── Case table ─────────────────────────────────
    OptionalColumnMissing {
        column: String,
    },
    UnparseableTimestamps {
        column: String,
        count: usize,
    },
}

impl LoadWarning {
    /// Emit this warning through the `log` facade.
    pub fn log(&self) {
        match self {
            Self::SlaSheetMissing { path } => {
                log::warn!("SLA sheet {path} not found; using default SLA targets")
            }
            Self::SlaSheetUnreadable { path, reason } => {
                log::warn!("SLA sheet {path} could not be loaded ({reason}); using default SLA targets")
            }
            Self::SlaRowsDropped { count } => {
                log::warn!("Dropped {count} incomplete or malformed SLA sheet rows")
            }
            Self::OptionalColumnMissing { column } => {
                log::warn!("Optional column '{column}' absent; dependent analyses will be empty")
            }
            Self::UnparseableTimestamps { column, count } => {
                log::warn!("{count} values in '{column}' could not be parsed and were treated as absent")
            }
        }
    }
}
