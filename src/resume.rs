// External crates
use log::info;

// Standard library imports
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::sink::{DELIMITER, FIELD_COUNT, HEADER};

/// Removes every path already listed in a previous run's output.
///
/// Paths whose earlier line carries an error are skipped as well: a resumed
/// run finishes the inventory, it does not retry failures. Repeated paths in
/// `all_paths` are kept once, in first-seen order.
pub fn filter_processed(
    all_paths: Vec<String>,
    existing_output: &Path,
) -> io::Result<Vec<String>> {
    let mut seen = if existing_output.exists() {
        read_processed_paths(existing_output)?
    } else {
        HashSet::new()
    };

    let total = all_paths.len();
    let already_processed = seen.len();
    let remaining: Vec<String> = all_paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect();

    let skipped = total - remaining.len();
    if skipped > 0 && already_processed > 0 {
        info!(
            "Skipped {} files already processed in file '{}'",
            skipped,
            existing_output.display()
        );
    }

    Ok(remaining)
}

/// Collects the path column of every complete data line in an output file.
///
/// A final line without its line break, or any line with fewer than six
/// fields, was cut short by a failed write and does not count as processed.
pub fn read_processed_paths(output: &Path) -> io::Result<HashSet<String>> {
    let mut reader = BufReader::new(File::open(output)?);
    let mut paths = HashSet::new();
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let Some(row) = line.strip_suffix('\n') else {
            break;
        };
        let row = row.strip_suffix('\r').unwrap_or(row);
        if row == HEADER || row.matches(DELIMITER).count() < FIELD_COUNT - 1 {
            continue;
        }
        if let Some((path, _)) = row.split_once(DELIMITER) {
            paths.insert(path.to_string());
        }
    }

    Ok(paths)
}
