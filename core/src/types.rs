//! Shared primitive types used across the entire engine.

/// Ordinal severity. 0 = critical … 4 = informational.
pub type SeverityRank = u8;

/// A duration expressed in fractional days.
pub type Days = f64;

/// The opaque identifier carried by each case row.
pub type CaseId = String;

/// Label used for missing or blank categorical values so that every
/// frequency table still partitions the full case set.
pub const UNKNOWN_LABEL: &str = "Unknown";
