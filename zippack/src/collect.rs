use std::fs;
use std::path::{Path, PathBuf};

use crate::{wrap_io_err, Error};

/// Walk `root` depth-first and return every file and directory below it.
///
/// Children are visited in the order the file system lists them. A
/// directory is pushed after its contents, and `root` itself is never
/// included. Symlinks are returned as leaves and never descended into.
///
/// Any error aborts the walk; no partial list is returned.
pub fn collect_paths(root: impl AsRef<Path>) -> Result<Vec<PathBuf>, Error> {
    let root = root.as_ref();
    let mut paths = Vec::new();
    collect_dir(root, &mut paths)?;
    log::debug!("Collected {} paths under {}", paths.len(), root.display());
    Ok(paths)
}

fn collect_dir(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<(), Error> {
    let read_dir = fs::read_dir(dir).map_err(wrap_io_err!(dir, "Listing directory"))?;

    for entry_res in read_dir {
        let entry = entry_res.map_err(wrap_io_err!(dir, "Listing directory"))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(wrap_io_err!(path, "Reading file type"))?;

        if file_type.is_dir() {
            collect_dir(&path, paths)?;
        }
        paths.push(path);
    }
    Ok(())
}
