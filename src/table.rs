//! Per-key running statistics.

use ahash::AHashMap;
use tracing::trace;

use crate::error::{Error, Result};
use crate::record;

/// Running statistics for one key.
///
/// The total is kept as a Neumaier-compensated sum, so merging tables in a
/// different order gives the same total in practice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyStats {
    pub min: f64,
    pub max: f64,
    pub count: u64,
    sum: f64,
    carry: f64,
}

impl KeyStats {
    pub fn new(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            count: 1,
            sum: value,
            carry: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.add(value);
        self.count += 1;
    }

    /// Folds `other` into `self`. Commutative and associative, up to the
    /// rounding of the total.
    pub fn merge(&mut self, other: &KeyStats) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.add(other.sum);
        self.carry += other.carry;
        self.count += other.count;
    }

    fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.carry += (self.sum - t) + value;
        } else {
            self.carry += (value - t) + self.sum;
        }
        self.sum = t;
    }

    /// Sum of every contributing value.
    pub fn total(&self) -> f64 {
        self.sum + self.carry
    }

    pub fn mean(&self) -> f64 {
        self.total() / self.count as f64
    }
}

/// Key to [`KeyStats`] map. Keys borrow from the byte source.
#[derive(Debug, Default)]
pub struct Table<'a> {
    entries: AHashMap<&'a [u8], KeyStats>,
    limit: Option<usize>,
    skipped: u64,
}

impl<'a> Table<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table that refuses to hold more than `limit` distinct keys.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Parses one line and records it, or counts it as skipped.
    pub fn ingest(&mut self, line: &'a [u8]) -> Result<()> {
        match record::parse(line) {
            Ok(r) => self.record(r.key, r.value),
            Err(reason) => {
                trace!(%reason, line = %String::from_utf8_lossy(line), "skipping line");
                self.skipped += 1;
                Ok(())
            }
        }
    }

    pub fn record(&mut self, key: &'a [u8], value: f64) -> Result<()> {
        if let Some(stats) = self.entries.get_mut(key) {
            stats.update(value);
            return Ok(());
        }
        self.make_room()?;
        self.entries.insert(key, KeyStats::new(value));
        Ok(())
    }

    /// Merges every entry of `other` by key equality.
    pub fn absorb(&mut self, other: Table<'a>) -> Result<()> {
        self.skipped += other.skipped;
        for (key, stats) in other.entries {
            if let Some(dest) = self.entries.get_mut(key) {
                dest.merge(&stats);
                continue;
            }
            self.make_room()?;
            self.entries.insert(key, stats);
        }
        Ok(())
    }

    fn make_room(&mut self) -> Result<()> {
        if let Some(limit) = self.limit {
            if self.entries.len() >= limit {
                return Err(Error::TooManyKeys { limit });
            }
        }
        self.entries
            .try_reserve(1)
            .map_err(|source| Error::Allocation {
                what: "aggregation table",
                source,
            })
    }

    pub fn get(&self, key: &[u8]) -> Option<&KeyStats> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines that did not parse into a record.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Records aggregated across all keys.
    pub fn records(&self) -> u64 {
        self.entries.values().map(|s| s.count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a [u8], &KeyStats)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn into_entries(self) -> Vec<(&'a [u8], KeyStats)> {
        self.entries.into_iter().collect()
    }
}
