//! Splitting the input into one contiguous range per worker.
//!
//! Both splitters return exactly `workers` half-open ranges that together
//! cover the input once. Trailing ranges may be empty when there is less
//! input than workers.

use std::ops::Range;

use memchr::memchr;

/// Splits `line_count` lines into equal runs. The last worker also takes
/// the remainder.
pub fn by_lines(line_count: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let chunk = line_count / workers;
    (0..workers)
        .map(|t| {
            let start = t * chunk;
            let end = if t == workers - 1 {
                line_count
            } else {
                (t + 1) * chunk
            };
            start..end
        })
        .collect()
}

/// Splits `bytes` into roughly equal byte runs. Each boundary is moved
/// forward past the next `\n`, so no line is split between two workers.
pub fn by_bytes(bytes: &[u8], workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let len = bytes.len();
    let chunk = len / workers;
    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;

    for i in 0..workers {
        let end = if i == workers - 1 {
            len
        } else {
            let pos = (start + chunk).min(len);
            match memchr(b'\n', &bytes[pos..]) {
                Some(nl) => pos + nl + 1,
                None => len,
            }
        };
        ranges.push(start..end);
        start = end;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(ranges: &[Range<usize>], total: usize) {
        let mut next = 0;
        for r in ranges {
            assert_eq!(r.start, next, "gap or overlap in {ranges:?}");
            assert!(r.start <= r.end);
            next = r.end;
        }
        assert_eq!(next, total);
    }

    #[test]
    fn even_split() {
        assert_eq!(by_lines(8, 4), vec![0..2, 2..4, 4..6, 6..8]);
    }

    #[test]
    fn last_worker_takes_remainder() {
        assert_eq!(by_lines(10, 3), vec![0..3, 3..6, 6..10]);
    }

    #[test]
    fn more_workers_than_lines() {
        let ranges = by_lines(2, 4);
        assert_eq!(ranges, vec![0..0, 0..0, 0..0, 0..2]);
        assert_covers(&ranges, 2);
    }

    #[test]
    fn line_ranges_cover_everything() {
        for lines in [1, 2, 7, 100, 1001] {
            for workers in 1..=lines.min(16) {
                let ranges = by_lines(lines, workers);
                assert_eq!(ranges.len(), workers);
                assert_covers(&ranges, lines);
            }
        }
    }

    #[test]
    fn byte_ranges_end_on_line_boundaries() {
        let bytes = b"Paris;10.0\nLondon;5.0\nOslo;-3.2\nRome;20.1\nLima;15.5";
        for workers in 1..=8 {
            let ranges = by_bytes(bytes, workers);
            assert_eq!(ranges.len(), workers);
            assert_covers(&ranges, bytes.len());
            for r in &ranges[..workers - 1] {
                if !r.is_empty() {
                    assert!(r.end == bytes.len() || bytes[r.end - 1] == b'\n');
                }
            }
        }
    }

    #[test]
    fn byte_ranges_leave_trailing_workers_empty() {
        let bytes = b"Paris;10.0\nLondon;5.0\nOslo;-3.2\nRome;20.1\nLima;15.5";
        let ranges = by_bytes(bytes, 8);
        assert_covers(&ranges, bytes.len());
        let first_empty = ranges.iter().position(|r| r.is_empty()).unwrap();
        assert_eq!(ranges[first_empty - 1].end, bytes.len());
        assert!(ranges[first_empty..]
            .iter()
            .all(|r| *r == (bytes.len()..bytes.len())));
    }

    #[test]
    fn byte_ranges_of_single_long_line() {
        let bytes = b"abcdefghijklmnopqrstuvwxyz;1.0";
        let ranges = by_bytes(bytes, 4);
        assert_eq!(ranges[0], 0..bytes.len());
        assert_covers(&ranges, bytes.len());
    }
}
