//! Synthetic measurement files for testing and benchmarking.

use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_SEED: u64 = 10;

pub const CITIES: [&str; 100] = [
    "New York", "Los Angeles", "Chicago", "Houston", "Phoenix", "Philadelphia", "San Antonio",
    "San Diego", "Dallas", "San Jose", "Austin", "Jacksonville", "Fort Worth", "Columbus",
    "San Francisco", "Charlotte", "Indianapolis", "Seattle", "Denver", "Washington", "Boston",
    "El Paso", "Nashville", "Detroit", "Oklahoma City", "Portland", "Las Vegas", "Memphis",
    "Louisville", "Baltimore", "Milwaukee", "Albuquerque", "Tucson", "Fresno", "Sacramento",
    "Kansas City", "Long Beach", "Mesa", "Atlanta", "Colorado Springs", "Virginia Beach",
    "Raleigh", "Omaha", "Miami", "Oakland", "Minneapolis", "Tulsa", "Wichita", "New Orleans",
    "Arlington", "Cleveland", "Bakersfield", "Tampa", "Aurora", "Honolulu", "Anaheim",
    "Santa Ana", "Corpus Christi", "Riverside", "Lexington", "St. Louis", "Stockton",
    "Pittsburgh", "Saint Paul", "Cincinnati", "Anchorage", "Henderson", "Greensboro", "Plano",
    "Newark", "Toledo", "Lincoln", "Orlando", "Chula Vista", "Jersey City", "Chandler",
    "Fort Wayne", "Buffalo", "Durham", "St. Petersburg", "Irvine", "Laredo", "Madison",
    "Norfolk", "Lubbock", "Gilbert", "Winston-Salem", "Glendale", "Hialeah", "Garland",
    "Scottsdale", "Irving", "Chesapeake", "North Las Vegas", "Fremont", "Baton Rouge",
    "Richmond", "Boise", "San Bernardino", "Birmingham",
];

/// Writes `lines` records of `<city>;<-?DD.D>`. The same seed always
/// produces the same bytes.
pub fn write_measurements<W: Write>(mut out: W, lines: u64, seed: u64) -> io::Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..lines {
        let city = CITIES[rng.random_range(0..CITIES.len())];
        let sign = if rng.random_bool(0.5) { "-" } else { "" };
        let whole = rng.random_range(0..100u32);
        let tenth = rng.random_range(0..10u32);
        writeln!(out, "{city};{sign}{whole}.{tenth}")?;
    }
    out.flush()
}

/// In-memory variant of [`write_measurements`].
pub fn measurements(lines: u64, seed: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(lines as usize * 16);
    // Writing into a Vec cannot fail.
    let _ = write_measurements(&mut buf, lines, seed);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    #[test]
    fn same_seed_same_output() {
        assert_eq!(measurements(500, 7), measurements(500, 7));
        assert_ne!(measurements(500, 7), measurements(500, 8));
    }

    #[test]
    fn every_line_is_a_valid_record() {
        let bytes = measurements(2_000, DEFAULT_SEED);
        let lines: Vec<&[u8]> = bytes.split(|&b| b == b'\n').collect();
        assert_eq!(lines.len(), 2_001);
        assert!(lines[2_000].is_empty());
        for line in &lines[..2_000] {
            let r = record::parse(line).unwrap();
            assert!(CITIES.iter().any(|c| c.as_bytes() == r.key));
            assert!(r.value > -100.0 && r.value < 100.0);
        }
    }
}
