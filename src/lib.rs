//! Parallel min/mean/max aggregation over `<key>;<value>` files.
//!
//! The pipeline: [`source::ByteSource`] holds the input, [`index::LineIndex`]
//! records line starts, [`partition`] assigns ranges to workers,
//! [`engine::aggregate`] builds and merges per-worker [`table::Table`]s, and
//! [`report::Report`] sorts and prints the result.

pub mod config;
pub mod engine;
pub mod error;
pub mod generate;
pub mod index;
pub mod logging;
pub mod partition;
pub mod record;
pub mod report;
pub mod source;
pub mod table;

pub use config::{EngineConfig, ReadMode, Strategy};
pub use engine::aggregate;
pub use error::{Error, Result};
pub use report::Report;
pub use source::ByteSource;
pub use table::{KeyStats, Table};
