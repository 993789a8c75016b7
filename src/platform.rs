use std::fs::Metadata;
use std::io;
#[cfg(target_os = "linux")]
use std::os::linux::fs::MetadataExt;
#[cfg(any(target_os = "freebsd", target_os = "macos"))]
use std::os::unix::fs::MetadataExt;
use std::time::SystemTime;

#[cfg(any(target_os = "linux", target_os = "freebsd", target_os = "macos"))]
use log::debug;

pub trait MetadataExtOps {
    /// Birth time of the file, or the closest thing the platform records.
    fn creation_time(&self) -> io::Result<SystemTime>;
}

#[cfg(target_os = "linux")]
impl MetadataExtOps for Metadata {
    fn creation_time(&self) -> io::Result<SystemTime> {
        // statx birth time is missing on older kernels and some filesystems (NFS, tmpfs)
        self.created().or_else(|e| {
            debug!("Birth time unavailable ({}), using inode change time", e);
            Ok(unix_time(self.st_ctime(), self.st_ctime_nsec()))
        })
    }
}

#[cfg(any(target_os = "macos", target_os = "freebsd"))]
impl MetadataExtOps for Metadata {
    fn creation_time(&self) -> io::Result<SystemTime> {
        self.created().or_else(|e| {
            debug!("Birth time unavailable ({}), using inode change time", e);
            Ok(unix_time(self.ctime(), self.ctime_nsec()))
        })
    }
}

#[cfg(not(any(target_os = "linux", target_os = "freebsd", target_os = "macos")))]
impl MetadataExtOps for Metadata {
    fn creation_time(&self) -> io::Result<SystemTime> {
        self.created()
    }
}

#[cfg(any(target_os = "linux", target_os = "freebsd", target_os = "macos"))]
fn unix_time(secs: i64, nsecs: i64) -> SystemTime {
    use std::time::{Duration, UNIX_EPOCH};

    let nanos = nsecs.clamp(0, 999_999_999) as u32;
    if secs >= 0 {
        UNIX_EPOCH + Duration::new(secs as u64, nanos)
    } else {
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs()) + Duration::from_nanos(nanos as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    #[test]
    fn test_creation_time_of_new_file() {
        let dir = TempDir::new("platform_test").unwrap();
        let path = dir.path().join("fresh.txt");
        fs::write(&path, b"fresh").unwrap();

        let metadata = fs::metadata(&path).unwrap();
        let created = metadata.creation_time().unwrap();
        assert!(created > SystemTime::UNIX_EPOCH);
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd", target_os = "macos"))]
    #[test]
    fn test_unix_time() {
        use std::time::{Duration, UNIX_EPOCH};

        assert_eq!(
            unix_time(1609459200, 500),
            UNIX_EPOCH + Duration::new(1609459200, 500)
        );
        assert_eq!(unix_time(0, 0), UNIX_EPOCH);
        assert_eq!(unix_time(-10, 0), UNIX_EPOCH - Duration::from_secs(10));
    }
}
