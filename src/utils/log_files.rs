//! Log file rotation
//!
//! Rotation happens once, when logging is initialised: an oversized log file
//! is shifted to `<file>.1`, `<file>.1` to `<file>.2` and so on, dropping the
//! oldest backup.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Path of the `index`-th backup of `path` (`app.log` -> `app.log.2`)
pub fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

/// Rotate `path` if it is at least `max_bytes` long. Returns whether it rotated.
///
/// A `max_bytes` of zero disables rotation; `max_backups` of zero discards the
/// old log instead of keeping it.
pub fn rotate_if_needed(path: &Path, max_bytes: u64, max_backups: usize) -> io::Result<bool> {
    let size = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    if max_bytes == 0 || size < max_bytes {
        return Ok(false);
    }

    if max_backups == 0 {
        fs::remove_file(path)?;
        return Ok(true);
    }

    for index in (1..max_backups).rev() {
        let from = backup_path(path, index);
        if from.exists() {
            fs::rename(&from, backup_path(path, index + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))?;

    Ok(true)
}

/// Open `path` for appending, creating parent directories as needed
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
