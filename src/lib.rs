// src/lib.rs

pub mod args;
pub mod collector;
pub mod error;
pub mod inventory;
pub mod listing;
pub mod options;
pub mod platform;
pub mod progress;
pub mod record;
pub mod resume;
pub mod sink;

pub use args::parse_args;
pub use collector::{Collector, RunSummary};
pub use error::{Error, Result};
pub use inventory::{run, run_inventory};
pub use options::Options;
pub use record::{build_record, FileRecord};
