use chrono::Local;
use clap::ArgMatches;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use crate::error::{Error, Result};
use crate::progress::DEFAULT_PROGRESS_INTERVAL;

pub const FILE_LIST_NAME: &str = "FileList.txt";
pub const OUTPUT_NAME: &str = "FileInfo.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub source_dir: PathBuf,
    pub work_dir: PathBuf,
    pub file_list: PathBuf,
    pub output: PathBuf,
    /// Output from an earlier run is present: append to it without a header.
    pub existing_output: bool,
    pub jobs: usize,
    pub progress_interval: u64,
    /// Stop cleanly after this many files; the next run picks up the rest.
    pub file_limit: Option<u64>,
}

impl Options {
    pub fn new(source_dir: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        let output = work_dir.join(OUTPUT_NAME);
        Options {
            source_dir: source_dir.into(),
            file_list: work_dir.join(FILE_LIST_NAME),
            existing_output: has_content(&output),
            output,
            work_dir,
            jobs: default_jobs(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            file_limit: None,
        }
    }

    /// Validates the directories named on the command line and fills in defaults.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let source = matches
            .get_one::<String>("source")
            .map(PathBuf::from)
            .unwrap_or_default();
        if !source.is_dir() {
            return Err(Error::setup(
                "source directory does not exist",
                source,
                io::Error::from(io::ErrorKind::NotFound),
            ));
        }

        let work_dir = match matches.get_one::<String>("work-dir") {
            Some(dir) => {
                let dir = PathBuf::from(dir);
                if !dir.is_dir() {
                    return Err(Error::setup(
                        "work folder is not an existing directory",
                        dir,
                        io::Error::from(io::ErrorKind::NotFound),
                    ));
                }
                dir
            }
            None => default_work_dir(),
        };

        let mut options = Options::new(source, work_dir);
        if let Some(&jobs) = matches.get_one::<u64>("jobs") {
            options.jobs = jobs as usize;
        }
        if let Some(&every) = matches.get_one::<u64>("progress-every") {
            options.progress_interval = every;
        }
        options.file_limit = matches.get_one::<u64>("max-files").copied();
        Ok(options)
    }
}

fn default_jobs() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(format!("filecensus_{}", Local::now().format("%Y%m%d%H%M%S")))
}

/// An empty output file left by a run that died before the header counts as fresh.
fn has_content(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}
