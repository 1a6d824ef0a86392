mod archive;
mod collect;
mod encode;
pub mod fs;
mod packer;

pub use archive::*;
pub use collect::*;
pub use encode::*;
pub use packer::*;

pub use zippack_core::{DosDateTime, EntryHeader, EntryKind};

use std::io::{self, Read, Write};
use std::path::PathBuf;

use thiserror::Error;

/// Size of the chunks used when streaming file content
pub const READ_WRITE_BUF_SIZE: usize = 4 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Core(#[from] zippack_core::Error),

    #[error("{context}{}", display_path(.path))]
    Io {
        #[source]
        source: io::Error,
        path: Option<PathBuf>,
        context: &'static str,
    },

    #[error("Invalid path {}: {reason}", .path.display())]
    InvalidPath {
        path: PathBuf,
        reason: &'static str,
    },

    #[error("Entry {entry} size mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        entry: String,
        actual: u64,
        expected: u64,
    },

    #[error("Entry {entry} checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        entry: String,
        actual: u32,
        expected: u32,
    },

    #[error("Cannot {operation} while the archive writer is {state}")]
    InvalidState {
        operation: &'static str,
        state: WriterState,
    },
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" {}", path.display()),
        None => String::new(),
    }
}

/// Coarse classification of every failure a pack operation can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed path, or a path that cannot become an archive name
    InvalidPath,
    /// File system or target unreachable
    NotAccessible,
    /// Not enough room for the data being written
    InsufficientSpace,
    /// Read of a missing file
    NotFound,
    /// Any other failure mid-operation
    IoFault,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidPath { .. } => ErrorKind::InvalidPath,
            Error::Core(zippack_core::Error::InvalidName)
            | Error::Core(zippack_core::Error::NameTooLong(_)) => ErrorKind::InvalidPath,
            Error::Core(zippack_core::Error::Overflow)
            | Error::Core(zippack_core::Error::TooManyEntries(_)) => ErrorKind::InsufficientSpace,
            Error::Io { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => ErrorKind::NotFound,
                io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                    ErrorKind::NotAccessible
                }
                io::ErrorKind::StorageFull
                | io::ErrorKind::QuotaExceeded
                | io::ErrorKind::FileTooLarge => ErrorKind::InsufficientSpace,
                io::ErrorKind::InvalidInput => ErrorKind::InvalidPath,
                _ => ErrorKind::IoFault,
            },
            _ => ErrorKind::IoFault,
        }
    }
}

/// Wrap an `io::Error` with a context string and, optionally, the path that
/// was being accessed. Expands to a closure for use with `map_err`.
#[macro_export]
macro_rules! wrap_io_err {
    ($context:expr) => {
        |source| $crate::Error::Io {
            source,
            path: None,
            context: $context,
        }
    };
    ($path:expr, $context:expr) => {
        |source| $crate::Error::Io {
            source,
            path: Some(::std::path::PathBuf::from(&$path)),
            context: $context,
        }
    };
}

/// Copy everything from `read` to `write` in `buf` sized chunks, returning
/// the number of bytes copied and their CRC-32
pub fn copy_and_crc<R: Read, W: Write>(
    mut read: R,
    mut write: W,
    buf: &mut [u8],
) -> io::Result<(u64, u32)> {
    let mut hasher = crc32fast::Hasher::new();
    let mut total = 0;
    loop {
        let count = match read.read(buf) {
            Ok(0) => break,
            Ok(count) => count,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        total += count as u64;
        write.write_all(&buf[..count])?;
        hasher.update(&buf[..count]);
    }
    Ok((total, hasher.finalize()))
}
