use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fatal errors. Any of these aborts the whole run before a report is written.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open {}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("cannot read {}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot map {}", path.display())]
    Map { path: PathBuf, source: io::Error },

    #[error("{} is empty", path.display())]
    Empty { path: PathBuf },

    #[error("out of memory while growing the {what}")]
    Allocation {
        what: &'static str,
        source: TryReserveError,
    },

    /// Only reachable when a distinct-key limit is configured.
    #[error("more than {limit} distinct keys")]
    TooManyKeys { limit: usize },

    #[error("failed to start worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid configuration: {0}")]
    Config(String),
}
