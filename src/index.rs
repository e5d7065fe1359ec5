//! Line-start index over the byte source.

use std::ops::Range;

use memchr::memchr_iter;

use crate::error::{Error, Result};

const INITIAL_CAPACITY: usize = 10_000;

/// Byte offsets of every line start, built in one sequential pass.
///
/// Offset 0 is always present, even for an empty buffer. A terminator at
/// the very last byte does not open a new line, so a file ending in `\n`
/// has no empty trailing line.
pub struct LineIndex<'a> {
    bytes: &'a [u8],
    offsets: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn build(bytes: &'a [u8]) -> Result<Self> {
        let mut offsets = Vec::new();
        grow(&mut offsets, INITIAL_CAPACITY.min(bytes.len() / 8 + 1))?;
        offsets.push(0);

        for nl in memchr_iter(b'\n', bytes) {
            let next = nl + 1;
            if next < bytes.len() {
                if offsets.len() == offsets.capacity() {
                    let additional = offsets.len();
                    grow(&mut offsets, additional)?;
                }
                offsets.push(next);
            }
        }

        Ok(Self { bytes, offsets })
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Line `i` without its terminator.
    ///
    /// Every line but the last ends one byte before the next line's start.
    /// The last line runs to the end of the buffer, minus a final `\n`.
    pub fn line(&self, i: usize) -> &'a [u8] {
        let start = self.offsets[i];
        match self.offsets.get(i + 1) {
            Some(&next) => &self.bytes[start..next - 1],
            None => {
                let last = &self.bytes[start..];
                last.strip_suffix(b"\n").unwrap_or(last)
            }
        }
    }

    pub fn lines(&self, range: Range<usize>) -> impl Iterator<Item = &'a [u8]> + '_ {
        range.map(move |i| self.line(i))
    }
}

fn grow(offsets: &mut Vec<usize>, additional: usize) -> Result<()> {
    offsets
        .try_reserve(additional)
        .map_err(|source| Error::Allocation {
            what: "line index",
            source,
        })
}
