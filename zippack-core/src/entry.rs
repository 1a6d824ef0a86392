//! Per-entry header metadata, kept by the writer after an entry's content
//! has been written so the central directory can be emitted later
use alloc::string::String;
use core::fmt::Display;

use crate::{
    CentralFileHeader, CommonHeader, DosDateTime, Error, ExternalAttributes, GeneralPurposeFlags,
    LocalFileHeader, CENTRAL_HEADER_SIZE, LOCAL_HEADER_SIZE, METHOD_STORED, VERSION_NEEDED,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryHeader {
    name: String,
    kind: EntryKind,
    crc32: u32,
    size: u32,
    last_modified: DosDateTime,
}

impl Display for EntryHeader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "name={:?} kind={:?} crc32={:08x} size={} modified={}",
            self.name, self.kind, self.crc32, self.size, self.last_modified
        )
    }
}

impl EntryHeader {
    /// Header for a regular file whose content has the given CRC-32 and length
    pub fn file(
        name: impl Into<String>,
        crc32: u32,
        size: u64,
        last_modified: DosDateTime,
    ) -> Result<EntryHeader, Error> {
        let name = name.into();
        check_name(&name)?;
        let size = u32::try_from(size).map_err(|_| Error::Overflow)?;
        Ok(EntryHeader {
            name,
            kind: EntryKind::File,
            crc32,
            size,
            last_modified,
        })
    }

    /// Header for a directory. A trailing `/` is appended to the name if it
    /// is missing, which is how readers tell directories from empty files.
    pub fn directory(name: impl Into<String>, last_modified: DosDateTime) -> Result<EntryHeader, Error> {
        let mut name = name.into();
        if !name.ends_with('/') {
            name.push('/');
        }
        check_name(&name)?;
        Ok(EntryHeader {
            name,
            kind: EntryKind::Directory,
            crc32: 0,
            size: 0,
            last_modified,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    /// Content length; compressed and uncompressed sizes are the same
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn last_modified(&self) -> DosDateTime {
        self.last_modified
    }

    pub fn attributes(&self) -> ExternalAttributes {
        match self.kind {
            EntryKind::File => ExternalAttributes::ARCHIVE,
            EntryKind::Directory => ExternalAttributes::DIRECTORY,
        }
    }

    pub fn flags(&self) -> GeneralPurposeFlags {
        if self.name.is_ascii() {
            GeneralPurposeFlags::empty()
        } else {
            GeneralPurposeFlags::UTF8
        }
    }

    fn name_len(&self) -> u16 {
        // Checked on construction
        self.name.len() as u16
    }

    pub fn common(&self) -> CommonHeader {
        CommonHeader::new(
            VERSION_NEEDED,
            self.flags().bits(),
            METHOD_STORED,
            self.last_modified,
            self.crc32,
            self.size,
            self.name_len(),
        )
    }

    pub fn local_header(&self) -> LocalFileHeader {
        LocalFileHeader::new(self.common())
    }

    pub fn central_header(&self, local_header_offset: u32) -> CentralFileHeader {
        CentralFileHeader::new(self.common(), self.attributes().bits(), local_header_offset)
    }

    /// Bytes occupied by local header, name and content
    pub fn entry_size(&self) -> u64 {
        LOCAL_HEADER_SIZE as u64 + u64::from(self.name_len()) + u64::from(self.size)
    }

    /// Bytes occupied by this entry's central header and name
    pub fn central_size(&self) -> u64 {
        CENTRAL_HEADER_SIZE as u64 + u64::from(self.name_len())
    }
}

fn check_name(name: &str) -> Result<(), Error> {
    if name.is_empty() || name == "/" || name.starts_with('/') || name.contains('\0') {
        return Err(Error::InvalidName);
    }
    if name.len() > usize::from(u16::MAX) {
        return Err(Error::NameTooLong(name.len()));
    }
    Ok(())
}
