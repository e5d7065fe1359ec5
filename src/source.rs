//! Acquisition of the input as one immutable, contiguous buffer.

use std::fs::{self, File};
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;
use tracing::debug;

use crate::config::ReadMode;
use crate::error::{Error, Result};

enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

/// The whole input, either memory-mapped or read into memory.
///
/// The buffer is never handed out mutably and is released when the source
/// is dropped, on success and error paths alike.
pub struct ByteSource {
    backing: Backing,
}

impl ByteSource {
    /// Opens `path` and acquires its contents. Empty files are rejected.
    pub fn open(path: &Path, mode: ReadMode) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| Error::Open {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        if len == 0 {
            return Err(Error::Empty {
                path: path.to_path_buf(),
            });
        }

        let backing = match mode {
            ReadMode::Mmap => {
                // SAFETY: the mapping is read-only and the input is not
                // expected to change while the run is in progress.
                let mmap = unsafe { Mmap::map(&file) }.map_err(|source| Error::Map {
                    path: path.to_path_buf(),
                    source,
                })?;
                #[cfg(unix)]
                {
                    let _ = mmap.advise(memmap2::Advice::WillNeed);
                }
                Backing::Mapped(mmap)
            }
            ReadMode::Read => {
                drop(file);
                Backing::Owned(fs::read(path).map_err(|source| Error::Read {
                    path: path.to_path_buf(),
                    source,
                })?)
            }
        };

        let source = Self { backing };
        if source.is_empty() {
            // The file was truncated between stat and read.
            return Err(Error::Empty {
                path: path.to_path_buf(),
            });
        }
        debug!(path = %path.display(), ?mode, bytes = source.len(), "acquired input");
        Ok(source)
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.backing, Backing::Mapped(_))
    }
}

impl Deref for ByteSource {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(m) => m,
            Backing::Owned(v) => v,
        }
    }
}
