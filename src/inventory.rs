// External crates
use clap::ArgMatches;
use log::info;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

// Standard library imports
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::collector::{Collector, RunSummary};
use crate::error::{Error, Result};
use crate::listing::{ensure_file_list, read_file_list};
use crate::options::Options;
use crate::progress::format_minutes;
use crate::resume::filter_processed;

/// Runs the main logic of the program.
pub fn run(matches: ArgMatches) -> Result<()> {
    let options = Options::from_matches(&matches)?;
    let mut collector =
        Collector::new(options.jobs).with_progress_interval(options.progress_interval);
    if let Some(limit) = options.file_limit {
        collector = collector.with_file_limit(limit);
    }

    install_stop_handler(&collector.stop_flag())?;
    run_inventory(&options, &collector)?;
    Ok(())
}

/// The first SIGINT/SIGTERM raises `stop`: listing is abandoned, dispatch
/// ends and files already being hashed still reach the output. A second
/// signal terminates the process.
pub fn install_stop_handler(stop: &Arc<AtomicBool>) -> Result<()> {
    for signal in [SIGINT, SIGTERM] {
        // Must come first so it sees the flag as it was before this signal
        flag::register_conditional_shutdown(signal, 1, Arc::clone(stop))
            .map_err(Error::Signal)?;
        flag::register(signal, Arc::clone(stop)).map_err(Error::Signal)?;
    }
    Ok(())
}

/// Lists the source tree if needed, drops paths an earlier run already
/// recorded, and hashes the rest into the output file.
pub fn run_inventory(options: &Options, collector: &Collector) -> Result<RunSummary> {
    let stop = collector.stop_flag();
    if !ensure_file_list(&options.source_dir, &options.work_dir, &options.file_list, &stop)? {
        return Ok(RunSummary {
            total: 0,
            processed: 0,
            errors: 0,
            written: 0,
            elapsed: Duration::ZERO,
            cancelled: true,
        });
    }
    let paths = read_file_list(&options.file_list)?;
    let paths = filter_processed(paths, &options.output)
        .map_err(|e| Error::setup("cannot read previous output", &options.output, e))?;

    let summary = collector.run(&paths, &options.output, !options.existing_output)?;

    if !summary.cancelled {
        info!("All files examined");
    }
    info!(
        "{} files examined in {} mins ({} errors) - details exported to '{}'",
        summary.processed,
        format_minutes(summary.elapsed),
        summary.errors,
        options.output.display()
    );

    Ok(summary)
}
