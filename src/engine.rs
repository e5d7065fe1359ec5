//! Parallel scan and merge.
//!
//! Every strategy ends the same way. Each worker builds a private
//! [`Table`] with no synchronization, then folds it into the shared
//! [`Reducer`] under a single lock. The global table is only read after
//! every worker has been joined.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use memchr::memchr_iter;
use rayon::ThreadPool;
use tracing::{debug, info};

use crate::config::{EngineConfig, Strategy};
use crate::error::{Error, Result};
use crate::index::LineIndex;
use crate::partition;
use crate::table::Table;

/// Lines a worker processes between checks of the stop flag.
const CANCEL_CHECK_INTERVAL: usize = 1024;

/// Aggregates every record in `bytes` into one global table.
///
/// The first fatal error from any worker stops the others and is returned.
pub fn aggregate<'a>(bytes: &'a [u8], config: &EngineConfig) -> Result<Table<'a>> {
    config.validate()?;
    let started = Instant::now();

    let table = match config.strategy {
        Strategy::Lines => by_lines(bytes, config)?,
        Strategy::Bytes => by_bytes(bytes, config)?,
        Strategy::Queue => queued(bytes, config)?,
        Strategy::Serial => serial(bytes, config)?,
    };

    info!(
        strategy = ?config.strategy,
        threads = config.threads,
        keys = table.len(),
        records = table.records(),
        skipped = table.skipped(),
        elapsed = ?started.elapsed(),
        "aggregation finished"
    );
    Ok(table)
}

/// The global table. Workers fold into it one at a time.
pub struct Reducer<'a> {
    global: Mutex<Table<'a>>,
}

impl<'a> Reducer<'a> {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            global: Mutex::new(Table::with_limit(limit)),
        }
    }

    /// Merges a worker's table. The lock is held only for the fold.
    pub fn fold(&self, local: Table<'a>) -> Result<()> {
        let mut global = self.global.lock().unwrap_or_else(PoisonError::into_inner);
        global.absorb(local)
    }

    pub fn into_inner(self) -> Table<'a> {
        self.global
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared stop flag plus the first fatal error raised by any worker.
#[derive(Default)]
pub struct Cancel {
    stopped: AtomicBool,
    first: Mutex<Option<Error>>,
}

impl Cancel {
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    pub fn fail(&self, err: Error) {
        self.stopped.store(true, Ordering::Relaxed);
        let mut first = self.first.lock().unwrap_or_else(PoisonError::into_inner);
        first.get_or_insert(err);
    }

    pub fn finish(self) -> Result<()> {
        match self
            .first
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Scans lines `range` of `index` into `table`.
pub fn scan_indexed<'a>(
    index: &LineIndex<'a>,
    range: Range<usize>,
    table: &mut Table<'a>,
    cancel: &Cancel,
) -> Result<()> {
    for (n, line) in index.lines(range).enumerate() {
        if n % CANCEL_CHECK_INTERVAL == 0 && cancel.is_stopped() {
            break;
        }
        table.ingest(line)?;
    }
    Ok(())
}

/// Scans a region holding whole lines. A final line without `\n` counts.
pub fn scan_region<'a>(region: &'a [u8], table: &mut Table<'a>, cancel: &Cancel) -> Result<()> {
    let mut start = 0;
    for (n, nl) in memchr_iter(b'\n', region).enumerate() {
        if n % CANCEL_CHECK_INTERVAL == 0 && cancel.is_stopped() {
            return Ok(());
        }
        table.ingest(&region[start..nl])?;
        start = nl + 1;
    }
    if start < region.len() {
        table.ingest(&region[start..])?;
    }
    Ok(())
}

fn build_pool(threads: usize) -> Result<ThreadPool> {
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("onebrc-worker-{i}"))
        .build()?)
}

/// Runs one worker: scan into a fresh table, then fold it.
fn work<'a>(
    worker: usize,
    config: &EngineConfig,
    reducer: &Reducer<'a>,
    cancel: &Cancel,
    scan: impl FnOnce(&mut Table<'a>) -> Result<()>,
) {
    let mut local = Table::with_limit(config.max_keys);
    let result = scan(&mut local).and_then(|()| {
        debug!(
            worker,
            keys = local.len(),
            records = local.records(),
            skipped = local.skipped(),
            "worker finished scan"
        );
        if cancel.is_stopped() {
            return Ok(());
        }
        reducer.fold(local)
    });
    if let Err(err) = result {
        cancel.fail(err);
    }
}

fn by_lines<'a>(bytes: &'a [u8], config: &EngineConfig) -> Result<Table<'a>> {
    let index = LineIndex::build(bytes)?;
    let ranges = partition::by_lines(index.len(), config.threads);
    debug!(lines = index.len(), ?ranges, "partitioned by lines");

    let pool = build_pool(config.threads)?;
    let reducer = Reducer::new(config.max_keys);
    let cancel = Cancel::default();

    pool.scope(|s| {
        for (worker, range) in ranges.into_iter().enumerate() {
            let (index, reducer, cancel) = (&index, &reducer, &cancel);
            s.spawn(move |_| {
                work(worker, config, reducer, cancel, |table| {
                    scan_indexed(index, range, table, cancel)
                });
            });
        }
    });

    cancel.finish()?;
    Ok(reducer.into_inner())
}

fn by_bytes<'a>(bytes: &'a [u8], config: &EngineConfig) -> Result<Table<'a>> {
    let ranges = partition::by_bytes(bytes, config.threads);
    debug!(bytes = bytes.len(), ?ranges, "partitioned by bytes");

    let pool = build_pool(config.threads)?;
    let reducer = Reducer::new(config.max_keys);
    let cancel = Cancel::default();

    pool.scope(|s| {
        for (worker, range) in ranges.into_iter().enumerate() {
            let (reducer, cancel) = (&reducer, &cancel);
            s.spawn(move |_| {
                work(worker, config, reducer, cancel, |table| {
                    scan_region(&bytes[range], table, cancel)
                });
            });
        }
    });

    cancel.finish()?;
    Ok(reducer.into_inner())
}

/// Producer/consumer over a bounded channel. Runs on plain scoped threads
/// since both sides block.
fn queued<'a>(bytes: &'a [u8], config: &EngineConfig) -> Result<Table<'a>> {
    let (tx, rx) = crossbeam_channel::bounded::<&'a [u8]>(config.queue_capacity);
    let reducer = Reducer::new(config.max_keys);
    let cancel = Cancel::default();

    thread::scope(|s| {
        for worker in 0..config.threads {
            let rx = rx.clone();
            let (reducer, cancel) = (&reducer, &cancel);
            s.spawn(move || {
                work(worker, config, reducer, cancel, |table| {
                    // Ends once the reader has hung up and the queue is drained.
                    for batch in rx.iter() {
                        if cancel.is_stopped() {
                            break;
                        }
                        scan_region(batch, table, cancel)?;
                    }
                    Ok(())
                });
            });
        }
        drop(rx);

        let cancel = &cancel;
        s.spawn(move || {
            let mut sent = 0usize;
            for batch in Batches::new(bytes, config.batch_lines) {
                // A send error means every consumer has already stopped.
                if cancel.is_stopped() || tx.send(batch).is_err() {
                    break;
                }
                sent += 1;
            }
            debug!(batches = sent, "reader finished");
        });
    });

    cancel.finish()?;
    Ok(reducer.into_inner())
}

fn serial<'a>(bytes: &'a [u8], config: &EngineConfig) -> Result<Table<'a>> {
    let mut table = Table::with_limit(config.max_keys);
    scan_region(bytes, &mut table, &Cancel::default())?;
    Ok(table)
}

/// Consecutive slices of at most `lines` lines. Every slice but the last
/// ends with `\n`.
pub struct Batches<'a> {
    bytes: &'a [u8],
    pos: usize,
    lines: usize,
}

impl<'a> Batches<'a> {
    pub fn new(bytes: &'a [u8], lines: usize) -> Self {
        Self {
            bytes,
            pos: 0,
            lines: lines.max(1),
        }
    }
}

impl<'a> Iterator for Batches<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let rest = &self.bytes[self.pos..];
        if rest.is_empty() {
            return None;
        }
        let end = memchr_iter(b'\n', rest)
            .nth(self.lines - 1)
            .map_or(rest.len(), |nl| nl + 1);
        self.pos += end;
        Some(&rest[..end])
    }
}
