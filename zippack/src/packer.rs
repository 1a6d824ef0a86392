use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::BufWriter;
use std::path::{Component, Path};

use crate::fs::strip_encryption_suffix;
use crate::{
    collect_paths, wrap_io_err, ArchiveWriter, EntryEncoder, Error, Timestamp, READ_WRITE_BUF_SIZE,
};

/// Knobs for [`Packer`]. The defaults match [`pack`].
#[derive(Clone, Debug)]
pub struct PackOptions {
    /// Timestamp stamped on every entry
    pub timestamp: Timestamp,
    /// Files up to this many bytes are read into memory in one go; larger
    /// files are streamed twice (once to hash, once to write)
    pub max_buffered: u64,
    /// Suffix removed from every path component of an entry name, such as
    /// [`ENCRYPTION_SUFFIX`](crate::fs::ENCRYPTION_SUFFIX). Packing fails
    /// with [`Error::InvalidPath`] if two paths end up with the same name,
    /// e.g. `a.txt` and `a.txt.rem`.
    pub encryption_suffix: Option<String>,
}

impl Default for PackOptions {
    fn default() -> Self {
        PackOptions {
            timestamp: Timestamp::Now,
            max_buffered: READ_WRITE_BUF_SIZE as u64,
            encryption_suffix: None,
        }
    }
}

impl PackOptions {
    pub fn timestamp(mut self, timestamp: Timestamp) -> PackOptions {
        self.timestamp = timestamp;
        self
    }

    pub fn max_buffered(mut self, max_buffered: u64) -> PackOptions {
        self.max_buffered = max_buffered;
        self
    }

    pub fn encryption_suffix(mut self, suffix: impl Into<String>) -> PackOptions {
        self.encryption_suffix = Some(suffix.into());
        self
    }
}

/// Result of a successful pack
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackSummary {
    /// Files and directories written
    pub entries: usize,
    /// Archive size in bytes
    pub size: u64,
}

/// Packs a directory tree into a stored ZIP archive
#[derive(Clone, Debug, Default)]
pub struct Packer {
    options: PackOptions,
}

impl Packer {
    pub fn new(options: PackOptions) -> Packer {
        Packer { options }
    }

    /// Pack everything below `source` into `output`, replacing `output` if
    /// it exists.
    ///
    /// On failure the error is returned as-is and whatever was written so far
    /// stays on disk; the partial archive is not valid.
    pub fn pack(&self, source: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<PackSummary, Error> {
        let source = source.as_ref();
        let output = output.as_ref();

        let mut paths = collect_paths(source)?;

        if output.exists() {
            // Packing into the source tree must not pick up the old archive
            let stale = fs::canonicalize(output).map_err(wrap_io_err!(output, "Resolving archive path"))?;
            paths.retain(|path| match fs::canonicalize(path) {
                Ok(canonical) => canonical != stale,
                Err(_) => true,
            });

            fs::remove_file(output).map_err(wrap_io_err!(output, "Removing existing archive"))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(output)
            .map_err(wrap_io_err!(output, "Creating archive"))?;

        let mut writer = ArchiveWriter::new(BufWriter::new(file));
        let mut encoder = EntryEncoder::new(self.options.timestamp, self.options.max_buffered);

        let mut names = HashSet::with_capacity(paths.len());
        for path in &paths {
            let name = self.entry_name(source, path)?;
            if !names.insert(name.clone()) {
                return Err(Error::InvalidPath {
                    path: path.clone(),
                    reason: "archive name already used by another path",
                });
            }
            let entry = encoder.encode(path, &name)?;
            writer.add_entry(entry)?;
        }

        let size = writer.finish()?;
        writer.close();

        log::info!(
            "Packed {} entries from {} into {} ({} bytes)",
            paths.len(),
            source.display(),
            output.display(),
            size
        );

        Ok(PackSummary {
            entries: paths.len(),
            size,
        })
    }

    /// Archive name of `path`: its components below `source`, joined with `/`
    pub fn entry_name(&self, source: &Path, path: &Path) -> Result<String, Error> {
        let relative = path.strip_prefix(source).map_err(|_| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "not inside the source directory",
        })?;

        let mut name = String::new();
        for component in relative.components() {
            let part = match component {
                Component::Normal(part) => part.to_str().ok_or_else(|| Error::InvalidPath {
                    path: path.to_path_buf(),
                    reason: "name is not valid UTF-8",
                })?,
                _ => {
                    return Err(Error::InvalidPath {
                        path: path.to_path_buf(),
                        reason: "unexpected path component",
                    })
                }
            };
            let part = match &self.options.encryption_suffix {
                Some(suffix) => strip_encryption_suffix(part, suffix),
                None => part,
            };

            if !name.is_empty() {
                name.push('/');
            }
            name.push_str(part);
        }

        if name.is_empty() {
            return Err(Error::InvalidPath {
                path: path.to_path_buf(),
                reason: "path is the source directory itself",
            });
        }
        Ok(name)
    }
}

/// Pack `source` into `output` with default [`PackOptions`]
pub fn pack(source: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<PackSummary, Error> {
    Packer::default().pack(source, output)
}
