use std::thread;

use clap::ValueEnum;

use crate::error::{Error, Result};

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_BATCH_LINES: usize = 1024;

/// How the input is split between workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// Index every line start, then give each worker an equal number of lines.
    #[default]
    Lines,
    /// Split by byte offset, moving each boundary forward to the next line.
    Bytes,
    /// One reader feeds batches of lines to consumers over a bounded channel.
    Queue,
    /// Single thread, no partitioning.
    Serial,
}

/// How the input file is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReadMode {
    #[default]
    Mmap,
    Read,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub threads: usize,
    pub strategy: Strategy,
    /// Distinct-key limit. `None` means the tables grow as needed.
    pub max_keys: Option<usize>,
    /// Batches the queue strategy buffers before the reader blocks.
    pub queue_capacity: usize,
    /// Lines per batch sent by the queue strategy's reader.
    pub batch_lines: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            strategy: Strategy::default(),
            max_keys: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            batch_lines: DEFAULT_BATCH_LINES,
        }
    }
}

impl EngineConfig {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_keys(mut self, max_keys: Option<usize>) -> Self {
        self.max_keys = max_keys;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_batch_lines(mut self, lines: usize) -> Self {
        self.batch_lines = lines;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(Error::Config("thread count must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(Error::Config("queue capacity must be at least 1".into()));
        }
        if self.batch_lines == 0 {
            return Err(Error::Config("batch size must be at least 1 line".into()));
        }
        if self.max_keys == Some(0) {
            return Err(Error::Config("key limit must be at least 1".into()));
        }
        Ok(())
    }
}

/// Number of hardware threads, or 1 if that cannot be determined.
pub fn default_threads() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}
