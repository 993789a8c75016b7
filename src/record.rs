// External crates
use chrono::{DateTime, Utc};
use log::trace;

// Standard library imports
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use std::time::SystemTime;

use crate::platform::MetadataExtOps;

/// Read buffer used while streaming a file through the digest.
const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// What a single scan learned about one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: String,
    pub exists: bool,
    pub size: u64,
    pub created: Option<SystemTime>,
    /// Lowercase hex MD5 of the content.
    pub checksum: Option<String>,
    pub error: Option<String>,
}

impl FileRecord {
    fn new(path: &str) -> Self {
        FileRecord {
            path: path.to_string(),
            exists: false,
            size: 0,
            created: None,
            checksum: None,
            error: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Inspects and hashes one path. Never fails: any I/O problem ends up in
/// `FileRecord::error` with the content fields left empty.
pub fn build_record(path: &str) -> FileRecord {
    let mut record = FileRecord::new(path);

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            record.error = Some(e.to_string());
            return record;
        }
    };

    // Directories and other non-regular entries are reported as absent files
    record.exists = metadata.is_file();
    if !record.exists {
        return record;
    }

    let result = hash_file(Path::new(path))
        .and_then(|(size, checksum)| Ok((size, checksum, metadata.creation_time()?)));

    match result {
        Ok((size, checksum, created)) => {
            trace!("Hashed {} ({} bytes)", path, size);
            record.size = size;
            record.checksum = Some(checksum);
            record.created = Some(created);
        }
        Err(e) => record.error = Some(e.to_string()),
    }

    record
}

/// Streams the file through MD5, returning the number of bytes read and the hex digest.
pub fn hash_file(path: &Path) -> io::Result<(u64, String)> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(HASH_BUFFER_SIZE, file);
    let mut context = md5::Context::new();
    let size = io::copy(&mut reader, &mut context)?;
    Ok((size, format!("{:x}", context.compute())))
}

pub fn format_timestamp(time: SystemTime) -> String {
    let datetime: DateTime<Utc> = time.into();
    datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
