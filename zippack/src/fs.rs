//! File system helpers around the packer: the encryption suffix hook and
//! single-file saves.
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{wrap_io_err, Error};

/// Suffix some devices append to every file when storage encryption is on
pub const ENCRYPTION_SUFFIX: &str = ".rem";

const TMP_EXT: &str = ".tmp";

/// Remove `suffix` from the end of `name` if present
pub fn strip_encryption_suffix<'a>(name: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return name;
    }
    name.strip_suffix(suffix).unwrap_or(name)
}

fn temp_path(target: &Path) -> PathBuf {
    let mut tmp = OsString::from(target.as_os_str());
    tmp.push(TMP_EXT);
    PathBuf::from(tmp)
}

/// Write `data` to `path`, replacing any existing file.
///
/// When `path` already exists the data goes to `<path>.tmp` first and is
/// renamed over the target, so a failed write leaves the old file intact.
pub fn save_file(path: impl AsRef<Path>, data: &[u8]) -> Result<(), Error> {
    let path = path.as_ref();

    if !path.exists() {
        return write_new(path, data);
    }

    let tmp = temp_path(path);
    if tmp.exists() {
        fs::remove_file(&tmp).map_err(wrap_io_err!(tmp, "Removing stale temp file"))?;
    }

    if let Err(err) = write_new(&tmp, data) {
        if let Err(rm_err) = fs::remove_file(&tmp) {
            log::debug!("Failed to remove {}: {}", tmp.display(), rm_err);
        }
        return Err(err);
    }

    fs::rename(&tmp, path).map_err(wrap_io_err!(path, "Replacing file"))
}

fn write_new(path: &Path, data: &[u8]) -> Result<(), Error> {
    let mut file = File::create(path).map_err(wrap_io_err!(path, "Creating file"))?;
    file.write_all(data).map_err(wrap_io_err!(path, "Writing file"))?;
    file.flush().map_err(wrap_io_err!(path, "Flushing file"))
}

/// Create `path` and any missing parents. Existing directories are fine.
pub fn create_dir_all(path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(wrap_io_err!(path, "Creating directory"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{create_dir_all, save_file, strip_encryption_suffix, ENCRYPTION_SUFFIX};

    #[test]
    fn strips_only_trailing_suffix() {
        assert_eq!(strip_encryption_suffix("photo.jpg.rem", ENCRYPTION_SUFFIX), "photo.jpg");
        assert_eq!(strip_encryption_suffix("a.rem/b.txt", ENCRYPTION_SUFFIX), "a.rem/b.txt");
        assert_eq!(strip_encryption_suffix("notes.txt", ENCRYPTION_SUFFIX), "notes.txt");
        assert_eq!(strip_encryption_suffix("notes.txt", ""), "notes.txt");
    }

    #[test]
    fn save_new_and_replace() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("file.txt");

        save_file(&path, b"first").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"first");

        save_file(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!tmp.path().join("file.txt.tmp").exists());
    }

    #[test]
    fn save_into_missing_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(save_file(tmp.path().join("missing/file.txt"), b"x").is_err());
    }

    #[test]
    fn nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a/b/c");
        create_dir_all(&path).unwrap();
        create_dir_all(&path).unwrap();
        assert!(path.is_dir());
    }
}
