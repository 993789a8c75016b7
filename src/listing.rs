// External crates
use log::{error, info, warn};
use walkdir::WalkDir;

// Standard library imports
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Lazily yields every regular file below `root`. Symbolic links are not
/// followed; unreadable entries are logged and skipped.
pub fn walk_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                error!("Failed to read directory entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
}

/// Writes the recursive listing of `source` to `list_path`, unless a listing
/// from an earlier run is already there.
///
/// Returns `false` when `stop` was raised during the walk; the partial
/// listing is discarded and the next run walks the tree again.
pub fn ensure_file_list(
    source: &Path,
    work_dir: &Path,
    list_path: &Path,
    stop: &AtomicBool,
) -> Result<bool> {
    if list_path.exists() {
        info!(
            "{} already found in work folder, skipping file listing",
            list_path.display()
        );
        return Ok(true);
    }

    fs::create_dir_all(work_dir)
        .map_err(|e| Error::setup("cannot create work folder", work_dir, e))?;

    let root = fs::canonicalize(source)
        .map_err(|e| Error::setup("cannot resolve source directory", source, e))?;
    info!(
        "Extracting recursive file list for directory '{}' to file '{}'",
        root.display(),
        list_path.display()
    );

    match write_file_list(&root, list_path, stop)
        .map_err(|e| Error::setup("cannot write file list", list_path, e))?
    {
        Some(count) => {
            info!("Listed {} files", count);
            Ok(true)
        }
        None => {
            info!("Stopped while listing '{}'", root.display());
            Ok(false)
        }
    }
}

fn write_file_list(
    root: &Path,
    list_path: &Path,
    stop: &AtomicBool,
) -> io::Result<Option<u64>> {
    // Write to a side file so an interrupted walk never looks like a finished listing
    let partial = list_path.with_extension("partial");
    let mut writer = BufWriter::new(File::create(&partial)?);
    let mut count = 0u64;

    for path in walk_files(root) {
        if stop.load(Ordering::Relaxed) {
            drop(writer);
            fs::remove_file(&partial)?;
            return Ok(None);
        }
        match path.to_str() {
            Some(path) if !path.contains(['\n', '\r']) => {
                writeln!(writer, "{}", path)?;
                count += 1;
            }
            _ => warn!("Skipping unrepresentable path: {}", path.display()),
        }
    }

    writer.flush()?;
    drop(writer);
    fs::rename(&partial, list_path)?;
    Ok(Some(count))
}

/// Reads a newline-delimited path list, dropping blank lines and stray `\r`.
pub fn read_file_list(list_path: &Path) -> Result<Vec<String>> {
    let file =
        File::open(list_path).map_err(|e| Error::setup("cannot read file list", list_path, e))?;

    let mut paths = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| Error::setup("cannot read file list", list_path, e))?;
        let line = line.trim_end_matches('\r');
        if !line.trim().is_empty() {
            paths.push(line.to_string());
        }
    }

    info!("Found {} files in '{}'", paths.len(), list_path.display());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn keep_going() -> AtomicBool {
        AtomicBool::new(false)
    }

    fn build_tree(dir: &Path) {
        fs::create_dir_all(dir.join("sub").join("deeper")).unwrap();
        fs::write(dir.join("top.txt"), "top").unwrap();
        fs::write(dir.join("sub").join("mid.txt"), "mid").unwrap();
        fs::write(dir.join("sub").join("deeper").join("low.txt"), "low").unwrap();
    }

    #[test]
    fn test_walk_files_lists_only_files() {
        let dir = TempDir::new("listing_test").unwrap();
        build_tree(dir.path());

        let mut names: Vec<String> = walk_files(dir.path())
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["low.txt", "mid.txt", "top.txt"]);
    }

    #[test]
    fn test_ensure_file_list_creates_work_folder() {
        let source = TempDir::new("listing_src").unwrap();
        build_tree(source.path());
        let work = TempDir::new("listing_work").unwrap();
        let work_dir = work.path().join("nested");
        let list_path = work_dir.join("FileList.txt");

        assert!(ensure_file_list(source.path(), &work_dir, &list_path, &keep_going()).unwrap());

        let paths = read_file_list(&list_path).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| Path::new(p).is_absolute()));
        assert!(!list_path.with_extension("partial").exists());
    }

    #[test]
    fn test_existing_file_list_is_reused() {
        let source = TempDir::new("listing_src").unwrap();
        build_tree(source.path());
        let work = TempDir::new("listing_work").unwrap();
        let list_path = work.path().join("FileList.txt");
        fs::write(&list_path, "/only/this/one\n").unwrap();

        assert!(ensure_file_list(source.path(), work.path(), &list_path, &keep_going()).unwrap());
        assert_eq!(read_file_list(&list_path).unwrap(), vec!["/only/this/one"]);
    }

    #[test]
    fn test_read_file_list_skips_blank_lines() {
        let work = TempDir::new("listing_work").unwrap();
        let list_path = work.path().join("FileList.txt");
        fs::write(&list_path, "C:\\a.txt\r\n\r\n/b.txt\n   \n").unwrap();

        assert_eq!(read_file_list(&list_path).unwrap(), vec!["C:\\a.txt", "/b.txt"]);
    }

    #[test]
    fn test_read_missing_file_list_is_setup_error() {
        let work = TempDir::new("listing_work").unwrap();
        let err = read_file_list(&work.path().join("FileList.txt")).unwrap_err();
        assert!(matches!(err, Error::Setup { .. }));
    }

    #[test]
    fn test_stop_during_listing_discards_partial_list() {
        let source = TempDir::new("listing_src").unwrap();
        build_tree(source.path());
        let work = TempDir::new("listing_work").unwrap();
        let list_path = work.path().join("FileList.txt");

        let stop = AtomicBool::new(true);
        let complete = ensure_file_list(source.path(), work.path(), &list_path, &stop).unwrap();

        assert!(!complete);
        assert!(!list_path.exists());
        assert!(!list_path.with_extension("partial").exists());
    }
}
