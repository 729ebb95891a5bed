//! Weighted random selection helpers.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// ShufflingList: weighted shuffle without replacement
// ---------------------------------------------------------------------------

struct WeightedEntry<U> {
    data: U,
    weight: u32,
    sort_key: f64,
}

/// A list that can be reordered by a weighted random draw without
/// replacement. Entries with larger weights tend to come first; weight zero
/// always sorts last.
pub struct ShufflingList<U> {
    entries: Vec<WeightedEntry<U>>,
}

impl<U> Default for ShufflingList<U> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<U> ShufflingList<U> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, data: U, weight: u32) {
        self.entries.push(WeightedEntry {
            data,
            weight,
            sort_key: 0.0,
        });
    }

    /// Reorder by sorting on `-u^(1/w)` with `u` uniform in `[0, 1)`.
    /// Ties keep insertion order.
    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        for entry in &mut self.entries {
            let u: f64 = rng.gen();
            entry.sort_key = if entry.weight == 0 {
                0.0
            } else {
                -u.powf(1.0 / entry.weight as f64)
            };
        }
        self.entries.sort_by(|a, b| a.sort_key.total_cmp(&b.sort_key));
    }

    pub fn iter(&self) -> impl Iterator<Item = &U> {
        self.entries.iter().map(|e| &e.data)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut U> {
        self.entries.iter_mut().map(|e| &mut e.data)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Single weighted draw
// ---------------------------------------------------------------------------

/// Pick an index with probability proportional to `weight(item)`.
/// Returns `None` when the list is empty or every weight is zero.
pub fn random_index<T>(items: &[T], weight: impl Fn(&T) -> u64, rng: &mut impl Rng) -> Option<usize> {
    let total: u64 = items.iter().map(&weight).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for (i, item) in items.iter().enumerate() {
        let w = weight(item);
        if roll < w {
            return Some(i);
        }
        roll -= w;
    }
    None
}

// ---------------------------------------------------------------------------
// TickRange
// ---------------------------------------------------------------------------

/// Inclusive uniform range of ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRange {
    pub min: u64,
    pub max: u64,
}

impl TickRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// A range that always samples `ticks`.
    pub const fn fixed(ticks: u64) -> Self {
        Self::new(ticks, ticks)
    }

    pub fn sample(&self, rng: &mut impl Rng) -> u64 {
        if self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    pub fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}
