use log::info;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub const DEFAULT_PROGRESS_INTERVAL: u64 = 250;

/// Counters shared by every worker of a run.
pub struct Progress {
    processed: AtomicU64,
    errors: AtomicU64,
    total: u64,
    interval: u64,
    started: Instant,
}

impl Progress {
    pub fn new(total: u64, interval: u64) -> Self {
        Progress {
            processed: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            total,
            interval: interval.max(1),
            started: Instant::now(),
        }
    }

    pub fn record_error(&self) -> u64 {
        self.errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Counts one finished path and logs a progress line every `interval` paths.
    pub fn record_processed(&self) -> u64 {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if processed % self.interval == 0 {
            info!(
                "{} out of {} files processed after {} minutes ({} errors so far)",
                processed,
                self.total,
                self.elapsed().as_secs() / 60,
                self.errors()
            );
        }
        processed
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Minutes with one decimal, as printed in the run summary.
pub fn format_minutes(elapsed: Duration) -> String {
    format!("{:.1}", elapsed.as_secs_f64() / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counters_under_contention() {
        let progress = Arc::new(Progress::new(8000, DEFAULT_PROGRESS_INTERVAL));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let progress = Arc::clone(&progress);
                thread::spawn(move || {
                    for i in 0..1000 {
                        if i % 10 == 0 {
                            progress.record_error();
                        }
                        progress.record_processed();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(progress.processed(), 8000);
        assert_eq!(progress.errors(), 800);
        assert_eq!(progress.total(), 8000);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let progress = Progress::new(3, 0);
        assert_eq!(progress.record_processed(), 1);
        assert_eq!(progress.record_processed(), 2);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(Duration::from_secs(0)), "0.0");
        assert_eq!(format_minutes(Duration::from_secs(90)), "1.5");
        assert_eq!(format_minutes(Duration::from_secs(3600)), "60.0");
    }
}
