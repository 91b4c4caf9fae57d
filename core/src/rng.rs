//! Deterministic random number generation for synthetic case tables.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All randomness flows through StreamRng instances derived from a
//! single master seed.
//!
//! Each facet of a synthetic case draws from its own stream, seeded
//! from (master_seed XOR slot_index). This means:
//!   - Adding a new stream never changes existing streams.
//!   - Changing how one facet is drawn leaves every other facet intact.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for one stream.
pub struct StreamRng {
    pub name: &'static str,
    inner:    Pcg64Mcg,
}

impl StreamRng {
    /// The slot index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self { name: "unnamed", inner: Pcg64Mcg::seed_from_u64(derived_seed) }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll an index in [0, n). Returns 0 for an empty range.
    pub fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        (self.inner.next_u64() % n as u64) as usize
    }

    /// Bernoulli trial: true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform pick from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.below(items.len()))
    }

    /// Pick by relative weight. Zero total weight falls back to uniform.
    pub fn weighted<'a, T>(&mut self, items: &'a [(T, f64)]) -> Option<&'a T> {
        let total: f64 = items.iter().map(|(_, w)| w.max(0.0)).sum();
        if total <= 0.0 {
            return self.pick(items).map(|(t, _)| t);
        }
        let mut roll = self.next_f64() * total;
        for (item, w) in items {
            roll -= w.max(0.0);
            if roll < 0.0 {
                return Some(item);
            }
        }
        items.last().map(|(t, _)| t)
    }

    /// Sample from a simplified Pareto distribution.
    /// x_min: minimum value, alpha: shape (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }
}

/// All streams of one generator run.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn stream(&self, slot: StreamSlot) -> StreamRng {
        StreamRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// Append only: a slot's index is its seed offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Arrival = 0,
    Severity = 1,
    Taxonomy = 2,
    Lifecycle = 3,
    Narrative = 4,
    // New streams go here.
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Arrival => "arrival",
            Self::Severity => "severity",
            Self::Taxonomy => "taxonomy",
            Self::Lifecycle => "lifecycle",
            Self::Narrative => "narrative",
        }
    }
}
