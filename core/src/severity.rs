//! Severity label parsing.

use crate::types::SeverityRank;
use regex::Regex;
use std::sync::OnceLock;

fn first_integer() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)").expect("static regex"))
}

fn sev_prefixed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Sev(\d+)").expect("static regex"))
}

/// Rank of a case-table severity label: the first run of digits.
/// `"Sev2"` → 2, `"2 - Medium"` → 2, `"High"` → None.
pub fn parse_severity_rank(label: &str) -> Option<SeverityRank> {
    first_integer()
        .captures(label)
        .and_then(|c| c[1].parse().ok())
}

/// Rank of an SLA-sheet severity label, which must carry the `Sev` prefix.
pub fn parse_sev_label(label: &str) -> Option<SeverityRank> {
    sev_prefixed()
        .captures(label)
        .and_then(|c| c[1].parse().ok())
}

/// Human name for a rank, as used in narrative context.
pub fn severity_name(rank: SeverityRank) -> String {
    match rank {
        0 => "Critical".into(),
        1 => "High".into(),
        2 => "Medium".into(),
        3 => "Low".into(),
        4 => "Informational".into(),
        n => format!("Severity {n}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_labels_take_first_integer() {
        assert_eq!(parse_severity_rank("Sev2"), Some(2));
        assert_eq!(parse_severity_rank("2 - Medium"), Some(2));
        assert_eq!(parse_severity_rank("0"), Some(0));
        assert_eq!(parse_severity_rank("High"), None);
        assert_eq!(parse_severity_rank(""), None);
    }

    #[test]
    fn sheet_labels_need_sev_prefix() {
        assert_eq!(parse_sev_label("Sev0"), Some(0));
        assert_eq!(parse_sev_label("Sev4"), Some(4));
        assert_eq!(parse_sev_label("4"), None);
        assert_eq!(parse_sev_label("Severity"), None);
    }

    #[test]
    fn out_of_range_digits_are_rejected() {
        assert_eq!(parse_severity_rank("Sev999"), None);
    }
}
