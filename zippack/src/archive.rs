use std::fmt;
use std::fs::File;
use std::io::Write;

use zippack_core::{EndOfCentralDirectory, EntryHeader, MAX_ENTRIES};

use crate::{copy_and_crc, wrap_io_err, ArchiveEntry, EntryData, Error, READ_WRITE_BUF_SIZE};

/// Lifecycle of an [`ArchiveWriter`]. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriterState {
    /// Constructed, nothing written
    Open,
    /// At least one entry written
    Writing,
    /// Central directory and end record written and flushed
    Finalized,
    /// A write failed part way; the output holds a partial record and only
    /// [`close`](ArchiveWriter::close) is allowed
    Failed,
    /// Output released
    Closed,
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = match self {
            WriterState::Open => "open",
            WriterState::Writing => "writing",
            WriterState::Finalized => "finalized",
            WriterState::Failed => "failed",
            WriterState::Closed => "closed",
        };
        f.write_str(state)
    }
}

/// Written entry, remembered for the central directory
#[derive(Debug)]
struct CentralRecord {
    header: EntryHeader,
    local_header_offset: u32,
}

/// Streams entries into a stored ZIP archive.
///
/// Each [`add_entry`](ArchiveWriter::add_entry) writes the local header, name
/// and content immediately; only the header metadata is kept.
/// [`finish`](ArchiveWriter::finish) then writes the central directory and
/// the end record. The writer assumes it is the only thing writing to `W`
/// and that `W` starts at offset 0.
///
/// The output is flushed and released on [`close`](ArchiveWriter::close) or
/// when the writer is dropped, whichever comes first.
///
/// # Example
/// ```
/// use std::io::Cursor;
///
/// use zippack::{ArchiveEntry, ArchiveWriter, DosDateTime};
///
/// let modified = DosDateTime::new(2024, 1, 1, 0, 0, 0).unwrap();
///
/// let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()));
/// writer.add_entry(ArchiveEntry::directory("docs", modified).unwrap()).unwrap();
/// writer.add_entry(
///         ArchiveEntry::from_bytes("docs/readme.txt", b"hello".to_vec(), modified).unwrap()
///     ).unwrap();
/// let size = writer.finish().unwrap();
///
/// let archive = writer.into_inner().unwrap().into_inner();
/// assert_eq!(size, archive.len() as u64);
/// assert_eq!(&archive[..4], b"PK\x03\x04");
/// ```
pub struct ArchiveWriter<W: Write> {
    writer: Option<W>,
    records: Vec<CentralRecord>,
    /// Position right after the last written entry
    offset: u64,
    state: WriterState,
    buf: Vec<u8>,
}

impl<W: Write> ArchiveWriter<W> {
    pub fn new(writer: W) -> ArchiveWriter<W> {
        ArchiveWriter {
            writer: Some(writer),
            records: Vec::new(),
            offset: 0,
            state: WriterState::Open,
            buf: Vec::new(),
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Number of entries written so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bytes written so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Append one entry. Its content is written and then dropped.
    ///
    /// A failed write leaves a partial entry in the output and moves the
    /// writer to [`WriterState::Failed`]; the archive should be discarded.
    /// Limit errors are raised before anything is written.
    pub fn add_entry(&mut self, entry: ArchiveEntry) -> Result<(), Error> {
        const OPERATION: &str = "add an entry";

        if !matches!(self.state, WriterState::Open | WriterState::Writing) {
            return Err(Error::InvalidState {
                operation: OPERATION,
                state: self.state,
            });
        }
        if self.records.len() >= MAX_ENTRIES {
            return Err(zippack_core::Error::TooManyEntries(self.records.len() + 1).into());
        }

        let local_header_offset = u32::try_from(self.offset)
            .map_err(|_| zippack_core::Error::Overflow)?;
        let end = self.offset + entry.header().entry_size();
        if end > u64::from(u32::MAX) {
            // The central directory would start past what a u32 can address
            return Err(zippack_core::Error::Overflow.into());
        }

        let (header, data) = entry.into_parts();
        log::debug!("Writing {} at offset {}", header, local_header_offset);

        let state = self.state;
        let writer = self.writer.as_mut().ok_or(Error::InvalidState {
            operation: OPERATION,
            state,
        })?;
        if let Err(err) = write_local(writer, &header, data, &mut self.buf) {
            self.state = WriterState::Failed;
            return Err(err);
        }

        self.offset = end;
        self.records.push(CentralRecord {
            header,
            local_header_offset,
        });
        self.state = WriterState::Writing;
        Ok(())
    }

    /// Write the central directory and end record, then flush. Returns the
    /// total size of the archive.
    pub fn finish(&mut self) -> Result<u64, Error> {
        if !matches!(self.state, WriterState::Open | WriterState::Writing) {
            return Err(Error::InvalidState {
                operation: "finish the archive",
                state: self.state,
            });
        }

        let state = self.state;
        let writer = self.writer.as_mut().ok_or(Error::InvalidState {
            operation: "finish the archive",
            state,
        })?;
        match write_central(writer, &self.records, self.offset) {
            Ok(size) => {
                self.offset = size;
                self.state = WriterState::Finalized;
                Ok(size)
            }
            Err(err) => {
                self.state = WriterState::Failed;
                Err(err)
            }
        }
    }

    /// Flush and release the output. Valid in any state; errors are logged
    /// and otherwise ignored, since any primary error was already returned.
    pub fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(err) = writer.flush() {
                log::warn!("Failed to flush archive on close: {}", err);
            }
        }
        self.state = WriterState::Closed;
    }

    /// Give back the output without closing it. `None` if already closed.
    pub fn into_inner(mut self) -> Option<W> {
        self.writer.take()
    }
}

/// Central directory and end record for `records`, starting at
/// `central_dir_offset`. Returns the total archive size.
fn write_central<W: Write>(
    writer: &mut W,
    records: &[CentralRecord],
    central_dir_offset: u64,
) -> Result<u64, Error> {
    let mut central_dir_size = 0;
    let mut entries_size = 0;

    for record in records {
        let header = &record.header;
        writer
            .write_all(bytemuck::bytes_of(&header.central_header(record.local_header_offset)))
            .map_err(wrap_io_err!("Writing central header"))?;
        writer
            .write_all(header.name().as_bytes())
            .map_err(wrap_io_err!("Writing central header name"))?;

        central_dir_size += header.central_size();
        entries_size += header.entry_size();
    }
    debug_assert_eq!(entries_size, central_dir_offset);

    let end = EndOfCentralDirectory::new(records.len(), central_dir_size, central_dir_offset)?;
    writer
        .write_all(bytemuck::bytes_of(&end))
        .map_err(wrap_io_err!("Writing end of central directory"))?;
    writer.flush().map_err(wrap_io_err!("Flushing archive"))?;

    Ok(central_dir_offset + central_dir_size + zippack_core::END_RECORD_SIZE as u64)
}

/// Local header, name and content of one entry
fn write_local<W: Write>(
    writer: &mut W,
    header: &EntryHeader,
    data: EntryData,
    buf: &mut Vec<u8>,
) -> Result<(), Error> {
    writer
        .write_all(bytemuck::bytes_of(&header.local_header()))
        .map_err(wrap_io_err!("Writing local header"))?;
    writer
        .write_all(header.name().as_bytes())
        .map_err(wrap_io_err!("Writing entry name"))?;

    match data {
        EntryData::Directory => {}
        EntryData::Buffer(content) => {
            writer
                .write_all(&content)
                .map_err(wrap_io_err!("Writing entry content"))?;
        }
        EntryData::File(path) => {
            if buf.is_empty() {
                buf.resize(READ_WRITE_BUF_SIZE, 0);
            }
            let file = File::open(&path).map_err(wrap_io_err!(path, "Opening source file"))?;
            let (size, crc32) = copy_and_crc(file, &mut *writer, buf)
                .map_err(wrap_io_err!(path, "Copying source file"))?;

            if size != u64::from(header.size()) {
                return Err(Error::LengthMismatch {
                    entry: header.name().to_string(),
                    actual: size,
                    expected: u64::from(header.size()),
                });
            }
            if crc32 != header.crc32() {
                return Err(Error::ChecksumMismatch {
                    entry: header.name().to_string(),
                    actual: crc32,
                    expected: header.crc32(),
                });
            }
        }
    }
    Ok(())
}

impl<W: Write> Drop for ArchiveWriter<W> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<W: Write> fmt::Debug for ArchiveWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ArchiveWriter")
            .field("state", &self.state)
            .field("entries", &self.records)
            .field("offset", &self.offset)
            .finish()
    }
}
