use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that stop a run. Per-file problems never become an `Error`;
/// they are recorded in the file's output line instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The work list could not be produced or read, or the work folder is unusable.
    #[error("{context} '{}': {source}", .path.display())]
    Setup {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output file could not be opened or written.
    #[error("cannot write output file '{}': {source}", .path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The SIGINT/SIGTERM handler could not be installed.
    #[error("cannot install stop signal handler: {0}")]
    Signal(#[source] io::Error),

    /// A worker or the sink thread panicked.
    #[error("{0} thread panicked")]
    Panicked(&'static str),
}

impl Error {
    pub fn setup(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Setup {
            context,
            path: path.into(),
            source,
        }
    }

    pub fn sink(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Sink {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_message() {
        let err = Error::setup(
            "cannot read file list",
            "/tmp/FileList.txt",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(
            err.to_string(),
            "cannot read file list '/tmp/FileList.txt': missing"
        );
    }

    #[test]
    fn test_sink_error_message() {
        let err = Error::sink("out.txt", io::Error::other("disk full"));
        assert_eq!(err.to_string(), "cannot write output file 'out.txt': disk full");
    }
}
