//! Small, opinionated reductions shared by every analyzer.
//!
//! Ordering contract for ranked output: count descending, then the order in
//! which a key was first seen in the table. All maps are `BTreeMap` so that
//! serialized reports are byte-stable.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

/// Row label → column label → count. Every row carries every observed
/// column, zero-filled.
pub type CrossTab = BTreeMap<String, BTreeMap<String, usize>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile_of(values, 0.5, 1)
}

/// Linear-interpolated quantile (`q` in [0, 1]) over unsorted values.
///
/// Undefined for fewer than two values: a single observation has no spread
/// to be "above", so threshold checks built on it never fire.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    quantile_of(values, q, 2)
}

fn quantile_of(values: &[f64], q: f64, min_len: usize) -> Option<f64> {
    if values.len() < min_len || values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// An insertion-ordered counter.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    order:  Vec<K>,
    counts: HashMap<K, usize>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self { order: Vec::new(), counts: HashMap::new() }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        match self.counts.get_mut(&key) {
            Some(n) => *n += 1,
            None => {
                self.order.push(key.clone());
                self.counts.insert(key, 1);
            }
        }
    }

    pub fn count(&self, key: &K) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys with their counts, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.order.iter().map(|k| (k, self.counts[k]))
    }

    /// Count descending; ties keep first-seen order.
    pub fn ranked(&self) -> Vec<(K, usize)> {
        let mut out: Vec<(K, usize)> = self.iter().map(|(k, n)| (k.clone(), n)).collect();
        out.sort_by(|a, b| b.1.cmp(&a.1));
        out
    }

    pub fn top(&self, n: usize) -> Vec<(K, usize)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }

    /// Most frequent key; ties go to the first one seen.
    pub fn mode(&self) -> Option<&K> {
        let mut best: Option<(&K, usize)> = None;
        for (k, n) in self.iter() {
            if best.map_or(true, |(_, b)| n > b) {
                best = Some((k, n));
            }
        }
        best.map(|(k, _)| k)
    }
}

impl<K: Eq + Hash + Clone + Ord> Tally<K> {
    pub fn to_map(&self) -> BTreeMap<K, usize> {
        self.iter().map(|(k, n)| (k.clone(), n)).collect()
    }
}

impl Tally<String> {
    pub fn top_labels(&self, n: usize) -> Vec<LabelCount> {
        self.top(n)
            .into_iter()
            .map(|(label, count)| LabelCount { label, count })
            .collect()
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for k in iter {
            tally.add(k);
        }
        tally
    }
}

/// Accumulates values per key and reports the mean of each.
#[derive(Debug, Clone, Default)]
pub struct GroupedMean {
    sums: BTreeMap<String, (f64, usize)>,
}

impl GroupedMean {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, value: f64) {
        let entry = self.sums.entry(key.to_string()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    pub fn mean_of(&self, key: &str) -> Option<f64> {
        self.sums.get(key).map(|(sum, n)| sum / *n as f64)
    }

    pub fn means(&self) -> BTreeMap<String, f64> {
        self.sums
            .iter()
            .map(|(k, (sum, n))| (k.clone(), sum / *n as f64))
            .collect()
    }
}

impl<'a> FromIterator<(&'a str, f64)> for GroupedMean {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        let mut grouped = GroupedMean::new();
        for (k, v) in iter {
            grouped.add(k, v);
        }
        grouped
    }
}

/// Zero-filled contingency table of (row, column) label pairs.
pub fn cross_tab<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> CrossTab {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    let mut columns: BTreeSet<&str> = BTreeSet::new();
    for (row, col) in pairs {
        *counts.entry((row, col)).or_insert(0) += 1;
        columns.insert(col);
    }

    let mut table = CrossTab::new();
    for &(row, _) in counts.keys() {
        table.entry(row.to_string()).or_insert_with(|| {
            columns.iter().map(|c| (c.to_string(), 0)).collect()
        });
    }
    for ((row, col), n) in counts {
        if let Some(r) = table.get_mut(row) {
            r.insert(col.to_string(), n);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_between_ranks() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&v, 0.75), Some(4.0));
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.75), Some(3.25));
        assert_eq!(quantile(&[4.0, 1.0, 3.0, 2.0], 0.75), Some(3.25));
    }

    #[test]
    fn quantile_is_undefined_for_tiny_inputs() {
        assert_eq!(quantile(&[], 0.75), None);
        assert_eq!(quantile(&[7.0], 0.75), None);
        assert_eq!(quantile(&[2.0, 2.0], 0.75), Some(2.0));
    }

    #[test]
    fn median_handles_even_and_single() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(median(&[9.0]), Some(9.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn tally_ranks_ties_by_first_seen() {
        let t: Tally<&str> = ["b", "a", "c", "a", "b", "d"].into_iter().collect();
        assert_eq!(t.ranked(), vec![("b", 2), ("a", 2), ("c", 1), ("d", 1)]);
        assert_eq!(t.mode(), Some(&"b"));
        assert_eq!(t.total(), 6);
    }

    #[test]
    fn cross_tab_zero_fills_rows() {
        let tab = cross_tab([("A", "Sev1"), ("A", "Sev2"), ("B", "Sev1")]);
        assert_eq!(tab["B"]["Sev2"], 0);
        assert_eq!(tab["A"]["Sev1"], 1);
        assert_eq!(tab["B"]["Sev1"], 1);
    }

    #[test]
    fn pct_of_nothing_is_zero() {
        assert_eq!(pct(3, 0), 0.0);
        assert_eq!(pct(3, 4), 75.0);
    }
}
