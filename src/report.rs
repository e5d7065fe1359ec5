//! Sorted `<key>: <min>/<mean>/<max>` output.

use std::fmt;
use std::io::{self, Write};

use crate::table::{KeyStats, Table};

/// The global table frozen into key order.
pub struct Report<'a> {
    rows: Vec<(&'a [u8], KeyStats)>,
}

impl<'a> Report<'a> {
    /// Sorts by raw key bytes. Entries with no records are dropped.
    pub fn from_table(table: Table<'a>) -> Self {
        let mut rows: Vec<_> = table
            .into_entries()
            .into_iter()
            .filter(|(_, stats)| stats.count > 0)
            .collect();
        rows.sort_unstable_by(|a, b| a.0.cmp(b.0));
        Self { rows }
    }

    pub fn rows(&self) -> &[(&'a [u8], KeyStats)] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes one line per key. Key bytes are written unchanged.
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        for (key, stats) in &self.rows {
            out.write_all(key)?;
            writeln!(out, ": {}", Triple(stats))?;
        }
        out.flush()
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, stats) in &self.rows {
            writeln!(f, "{}: {}", String::from_utf8_lossy(key), Triple(stats))?;
        }
        Ok(())
    }
}

struct Triple<'s>(&'s KeyStats);

impl fmt::Display for Triple<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}/{:.1}/{:.1}",
            round_tenth(self.0.min),
            round_tenth(self.0.mean()),
            round_tenth(self.0.max)
        )
    }
}

/// Rounds to one decimal place, halves away from zero.
///
/// Ties are judged after scaling the binary value, so `0.15` (stored as
/// 0.1499...) becomes 0.2 where C's `%.1f` prints 0.1.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
