// External crates
use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, warn};

// Standard library imports
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};
use crate::record::{format_timestamp, FileRecord};

pub const DELIMITER: char = '|';
pub const FIELD_COUNT: usize = 6;
pub const HEADER: &str = "File Path|File Exists?|Size|Created|Checksum|Error";

/// The single writer of the output file. Producers hold clones of the
/// sender; the consumer thread runs until every sender is gone and the
/// channel is empty.
pub struct ResultSink {
    sender: Sender<FileRecord>,
    handle: JoinHandle<Result<u64>>,
}

impl ResultSink {
    /// Opens `output` for appending and starts the consumer thread.
    ///
    /// If an earlier run died partway through a line, a line break is written
    /// first so the torn row stays on its own line.
    pub fn start(output: &Path, write_header: bool, stop: Arc<AtomicBool>) -> Result<Self> {
        let torn = ends_mid_line(output).map_err(|e| Error::sink(output, e))?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(output)
            .map_err(|e| Error::sink(output, e))?;

        let mut writer = BufWriter::new(file);
        if torn {
            warn!(
                "Last line of '{}' is incomplete, starting a new line",
                output.display()
            );
            writeln!(writer)
                .and_then(|_| writer.flush())
                .map_err(|e| Error::sink(output, e))?;
        }

        Self::spawn(writer, output.to_path_buf(), write_header, stop)
    }

    /// Starts the consumer thread on any writer. `path` names the writer in
    /// errors. A write failure raises `stop` so producers quit claiming work.
    pub fn spawn<W: Write + Send + 'static>(
        writer: W,
        path: PathBuf,
        write_header: bool,
        stop: Arc<AtomicBool>,
    ) -> Result<Self> {
        let (sender, receiver) = channel::unbounded();
        let thread_path = path.clone();
        let handle = thread::Builder::new()
            .name("filecensus-sink".to_string())
            .spawn(move || {
                debug!("Writing records to {}", thread_path.display());
                consume(receiver, writer, write_header).map_err(|e| {
                    stop.store(true, Ordering::SeqCst);
                    Error::sink(&thread_path, e)
                })
            })
            .map_err(|e| Error::sink(&path, e))?;

        Ok(ResultSink { sender, handle })
    }

    pub fn sender(&self) -> Sender<FileRecord> {
        self.sender.clone()
    }

    /// Closes the sink's own sender and waits for the consumer to drain.
    /// Records still queued by producers that already finished are written
    /// before this returns. Yields the number of records written.
    pub fn finish(self) -> Result<u64> {
        drop(self.sender);
        self.handle.join().map_err(|_| Error::Panicked("sink"))?
    }
}

/// True when the file is non-empty and its last byte is not a line break.
fn ends_mid_line(path: &Path) -> io::Result<bool> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    let metadata = file.metadata()?;
    if !metadata.is_file() || metadata.len() == 0 {
        return Ok(false);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Consumer loop: one line per record, flushed immediately.
pub fn consume<W: Write>(
    receiver: Receiver<FileRecord>,
    mut writer: W,
    write_header: bool,
) -> io::Result<u64> {
    if write_header {
        writeln!(writer, "{}", HEADER)?;
        writer.flush()?;
    }

    let mut written = 0u64;
    // recv fails only once the channel is disconnected and empty
    while let Ok(record) = receiver.recv() {
        writeln!(writer, "{}", format_record(&record))?;
        writer.flush()?;
        written += 1;
    }

    debug!("Sink drained after {} records", written);
    Ok(written)
}

pub fn format_record(record: &FileRecord) -> String {
    let created = record.created.map(format_timestamp).unwrap_or_default();
    let checksum = record.checksum.as_deref().unwrap_or_default();
    let error = record
        .error
        .as_deref()
        .map(collapse_line_breaks)
        .unwrap_or_default();

    format!(
        "{path}{d}{exists}{d}{size}{d}{created}{d}{checksum}{d}{error}",
        path = record.path,
        exists = record.exists,
        size = record.size,
        d = DELIMITER,
    )
}

/// Keeps a multi-line error message on one physical row.
fn collapse_line_breaks(text: &str) -> String {
    text.replace("\r\n", ",").replace(['\r', '\n'], ",")
}
