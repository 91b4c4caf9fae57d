//! caseflow-core — case-management insight engine.
//!
//! A case table goes in; KPIs, patterns, risks, inefficiencies and
//! root-cause signals come out, compiled into one immutable report.
//! See engine.rs for the fixed execution order.

pub mod analyzer;
pub mod clock;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod inefficiency_analyzer;
pub mod keywords;
pub mod kpi_analyzer;
pub mod narrative;
pub mod normalize;
pub mod pattern_analyzer;
pub mod report;
pub mod risk_analyzer;
pub mod rng;
pub mod root_cause_analyzer;
pub mod sample;
pub mod severity;
pub mod sla;
pub mod stats;
pub mod table;
pub mod timestamp;
pub mod types;
pub mod warning;
