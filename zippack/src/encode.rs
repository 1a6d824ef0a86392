use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Timelike};
use zippack_core::{DosDateTime, EntryHeader};

use crate::{copy_and_crc, wrap_io_err, Error, READ_WRITE_BUF_SIZE};

/// Where the content of an encoded entry comes from at write time
pub enum EntryData {
    Directory,
    /// Content already held in memory
    Buffer(Vec<u8>),
    /// Content streamed from this file. The writer checks that it still has
    /// the length and CRC-32 recorded in the header.
    File(PathBuf),
}

impl fmt::Debug for EntryData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntryData::Directory => write!(f, "EntryData::Directory"),
            EntryData::Buffer(data) => write!(f, "EntryData::Buffer({} bytes)", data.len()),
            EntryData::File(p) => write!(f, "EntryData::File({:?})", p),
        }
    }
}

/// One fully encoded file or directory, ready to be appended to an archive
#[derive(Debug)]
pub struct ArchiveEntry {
    header: EntryHeader,
    data: EntryData,
}

impl ArchiveEntry {
    pub fn directory(name: impl Into<String>, last_modified: DosDateTime) -> Result<ArchiveEntry, Error> {
        Ok(ArchiveEntry {
            header: EntryHeader::directory(name, last_modified)?,
            data: EntryData::Directory,
        })
    }

    /// A file entry whose content is `data`
    pub fn from_bytes(
        name: impl Into<String>,
        data: Vec<u8>,
        last_modified: DosDateTime,
    ) -> Result<ArchiveEntry, Error> {
        let crc32 = crc32fast::hash(&data);
        Ok(ArchiveEntry {
            header: EntryHeader::file(name, crc32, data.len() as u64, last_modified)?,
            data: EntryData::Buffer(data),
        })
    }

    pub fn header(&self) -> &EntryHeader {
        &self.header
    }

    pub fn data(&self) -> &EntryData {
        &self.data
    }

    pub fn into_parts(self) -> (EntryHeader, EntryData) {
        (self.header, self.data)
    }
}

/// Source of the DOS timestamp stamped on each entry
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Timestamp {
    /// Local wall-clock time at the moment each entry is encoded
    #[default]
    Now,
    /// The same timestamp for every entry, for reproducible archives
    Fixed(DosDateTime),
}

impl Timestamp {
    pub fn resolve(&self) -> Result<DosDateTime, Error> {
        match self {
            Timestamp::Now => dos_date_time(&chrono::Local::now()),
            Timestamp::Fixed(dt) => Ok(*dt),
        }
    }
}

/// Convert any chrono date/time to DOS format
pub fn dos_date_time<T: Datelike + Timelike>(dt: &T) -> Result<DosDateTime, Error> {
    // Years chrono can represent but u16 cannot are rejected by DosDateTime
    let year = u16::try_from(dt.year()).unwrap_or(0);
    Ok(DosDateTime::new(
        year,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
    )?)
}

/// Turns paths on disk into [`ArchiveEntry`]s
#[derive(Debug)]
pub struct EntryEncoder {
    timestamp: Timestamp,
    max_buffered: u64,
    buf: Vec<u8>,
}

impl Default for EntryEncoder {
    fn default() -> Self {
        EntryEncoder::new(Timestamp::Now, READ_WRITE_BUF_SIZE as u64)
    }
}

impl EntryEncoder {
    /// Files up to `max_buffered` bytes are read into memory; larger ones are
    /// hashed now and streamed again when written.
    pub fn new(timestamp: Timestamp, max_buffered: u64) -> EntryEncoder {
        EntryEncoder {
            timestamp,
            max_buffered,
            buf: Vec::new(),
        }
    }

    /// Encode the file or directory at `path` as the archive entry `name`
    pub fn encode(&mut self, path: impl AsRef<Path>, name: &str) -> Result<ArchiveEntry, Error> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(wrap_io_err!(path, "Reading metadata"))?;
        let last_modified = self.timestamp.resolve()?;

        if metadata.is_dir() {
            return ArchiveEntry::directory(name, last_modified);
        }

        if metadata.len() > u64::from(u32::MAX) {
            return Err(zippack_core::Error::Overflow.into());
        }

        if metadata.len() <= self.max_buffered {
            let data = fs::read(path).map_err(wrap_io_err!(path, "Reading source file"))?;
            return ArchiveEntry::from_bytes(name, data, last_modified);
        }

        if self.buf.is_empty() {
            self.buf = vec![0; READ_WRITE_BUF_SIZE];
        }
        let file = File::open(path).map_err(wrap_io_err!(path, "Opening source file"))?;
        let (size, crc32) = copy_and_crc(file, io::sink(), &mut self.buf)
            .map_err(wrap_io_err!(path, "Hashing source file"))?;

        Ok(ArchiveEntry {
            header: EntryHeader::file(name, crc32, size, last_modified)?,
            data: EntryData::File(path.to_path_buf()),
        })
    }
}
