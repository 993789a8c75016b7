// External crates
use crossbeam::channel::Sender;
use log::{debug, info, warn};

// Standard library imports
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::progress::{Progress, DEFAULT_PROGRESS_INTERVAL};
use crate::record::{build_record, FileRecord};
use crate::sink::ResultSink;

/// Outcome of one pass over a work list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Paths in the work list.
    pub total: u64,
    /// Paths that produced a record.
    pub processed: u64,
    /// Records carrying an error.
    pub errors: u64,
    /// Lines the sink appended to the output.
    pub written: u64,
    pub elapsed: Duration,
    /// True when a stop request left part of the work list untouched.
    pub cancelled: bool,
}

/// Hashes a work list on a fixed pool of worker threads and funnels the
/// records into a single `ResultSink`.
pub struct Collector {
    jobs: usize,
    progress_interval: u64,
    file_limit: Option<u64>,
    stop: Arc<AtomicBool>,
}

impl Collector {
    pub fn new(jobs: usize) -> Self {
        Collector {
            jobs: jobs.max(1),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            file_limit: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Raises the stop flag once `limit` files have been recorded. Workers
    /// already hashing finish their file, so a few more may be written.
    pub fn with_file_limit(mut self, limit: u64) -> Self {
        self.file_limit = Some(limit.max(1));
        self
    }

    /// Flag that, once set, stops workers from claiming new paths. Paths
    /// already being hashed still finish and reach the output.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn run(&self, paths: &[String], output: &Path, write_header: bool) -> Result<RunSummary> {
        let sink = ResultSink::start(output, write_header, self.stop_flag())?;
        let progress = Progress::new(paths.len() as u64, self.progress_interval);
        let workers = self.jobs.min(paths.len()).max(1);
        debug!("Hashing {} files with {} workers", paths.len(), workers);

        let cursor = AtomicUsize::new(0);
        let panicked = {
            let cursor = &cursor;
            let progress = &progress;
            thread::scope(|scope| {
                let handles: Vec<_> = (0..workers)
                    .map(|_| {
                        let sender = sink.sender();
                        scope.spawn(move || self.work(paths, cursor, progress, sender))
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| handle.join())
                    .filter(|joined| joined.is_err())
                    .count()
            })
        };

        // Every worker has returned and dropped its sender, so nothing else
        // can be queued; finish() closes the channel and waits for the drain.
        let written = sink.finish()?;
        if panicked > 0 {
            return Err(Error::Panicked("worker"));
        }

        let summary = RunSummary {
            total: progress.total(),
            processed: progress.processed(),
            errors: progress.errors(),
            written,
            elapsed: progress.elapsed(),
            cancelled: progress.processed() < progress.total(),
        };

        if summary.cancelled {
            info!(
                "Stopped after {} of {} files; run again to resume",
                summary.processed, summary.total
            );
        }

        Ok(summary)
    }

    fn work(
        &self,
        paths: &[String],
        cursor: &AtomicUsize,
        progress: &Progress,
        sender: Sender<FileRecord>,
    ) {
        while !self.stop.load(Ordering::Relaxed) {
            let index = cursor.fetch_add(1, Ordering::Relaxed);
            let Some(path) = paths.get(index) else {
                break;
            };

            let record = build_record(path);
            if let Some(error) = &record.error {
                progress.record_error();
                warn!("Error in file {}: {}", path, error);
            }

            // Fails only if the sink died on a write error; finish() reports it
            if sender.send(record).is_err() {
                break;
            }
            let processed = progress.record_processed();
            if self.file_limit.is_some_and(|limit| processed >= limit) {
                self.stop.store(true, Ordering::SeqCst);
            }
        }
    }
}
