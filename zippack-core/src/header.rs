//! The packed structs represent the on-disk format of a stored ZIP archive.
//!
//! Every multi-byte field is held in little-endian byte order regardless of
//! the host, so `bytemuck::bytes_of` yields the exact bytes to write. Use the
//! accessor methods to read fields back as native integers.
use bytemuck::{Pod, Zeroable};

use crate::{
    DosDateTime, Error, CENTRAL_HEADER_SIGNATURE, END_RECORD_SIGNATURE, LOCAL_HEADER_SIGNATURE,
    VERSION_MADE_BY,
};

/// Fields shared, in this order, by the local and central file headers
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C, packed)]
pub struct CommonHeader {
    pub version_needed: u16,
    /// General purpose bit flags
    pub flags: u16,
    /// Compression method, always stored
    pub method: u16,
    /// Packed DOS time (low half) and date (high half)
    pub last_modified: u32,
    /// CRC-32 of the uncompressed data
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name_len: u16,
    /// Always zero, no extra fields are written
    pub extra_len: u16,
}

impl CommonHeader {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version_needed: u16,
        flags: u16,
        method: u16,
        last_modified: DosDateTime,
        crc32: u32,
        size: u32,
        name_len: u16,
    ) -> CommonHeader {
        CommonHeader {
            version_needed: version_needed.to_le(),
            flags: flags.to_le(),
            method: method.to_le(),
            last_modified: last_modified.bits().to_le(),
            crc32: crc32.to_le(),
            compressed_size: size.to_le(),
            uncompressed_size: size.to_le(),
            name_len: name_len.to_le(),
            extra_len: 0,
        }
    }

    pub fn version_needed(&self) -> u16 {
        u16::from_le(self.version_needed)
    }

    pub fn flags(&self) -> u16 {
        u16::from_le(self.flags)
    }

    pub fn method(&self) -> u16 {
        u16::from_le(self.method)
    }

    pub fn last_modified(&self) -> DosDateTime {
        DosDateTime::from_bits(u32::from_le(self.last_modified))
    }

    pub fn crc32(&self) -> u32 {
        u32::from_le(self.crc32)
    }

    pub fn compressed_size(&self) -> u32 {
        u32::from_le(self.compressed_size)
    }

    pub fn uncompressed_size(&self) -> u32 {
        u32::from_le(self.uncompressed_size)
    }

    pub fn name_len(&self) -> u16 {
        u16::from_le(self.name_len)
    }
}

/// Precedes the name and content of every entry
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C, packed)]
pub struct LocalFileHeader {
    pub signature: u32,
    pub common: CommonHeader,
}

impl LocalFileHeader {
    pub fn new(common: CommonHeader) -> LocalFileHeader {
        LocalFileHeader {
            signature: LOCAL_HEADER_SIGNATURE.to_le(),
            common,
        }
    }

    pub fn signature(&self) -> u32 {
        u32::from_le(self.signature)
    }

    pub fn common(&self) -> CommonHeader {
        self.common
    }
}

/// One record of the central directory, followed by the entry name
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C, packed)]
pub struct CentralFileHeader {
    pub signature: u32,
    pub version_made_by: u16,
    pub common: CommonHeader,
    pub comment_len: u16,
    pub disk_start: u16,
    pub internal_attrs: u16,
    /// DOS attributes, see [`ExternalAttributes`](crate::ExternalAttributes)
    pub external_attrs: u32,
    /// Offset of the matching local header from the start of the archive
    pub local_header_offset: u32,
}

impl CentralFileHeader {
    pub fn new(common: CommonHeader, external_attrs: u32, local_header_offset: u32) -> CentralFileHeader {
        CentralFileHeader {
            signature: CENTRAL_HEADER_SIGNATURE.to_le(),
            version_made_by: VERSION_MADE_BY.to_le(),
            common,
            comment_len: 0,
            disk_start: 0,
            internal_attrs: 0,
            external_attrs: external_attrs.to_le(),
            local_header_offset: local_header_offset.to_le(),
        }
    }

    pub fn signature(&self) -> u32 {
        u32::from_le(self.signature)
    }

    pub fn common(&self) -> CommonHeader {
        self.common
    }

    pub fn version_made_by(&self) -> u16 {
        u16::from_le(self.version_made_by)
    }

    pub fn external_attrs(&self) -> u32 {
        u32::from_le(self.external_attrs)
    }

    pub fn local_header_offset(&self) -> u32 {
        u32::from_le(self.local_header_offset)
    }
}

/// Trailer of a single-disk archive
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C, packed)]
pub struct EndOfCentralDirectory {
    pub signature: u32,
    pub disk: u16,
    pub central_dir_disk: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    /// Size in bytes of all central headers and their names
    pub central_dir_size: u32,
    /// Offset of the first central header
    pub central_dir_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    /// Fails with [`Error::TooManyEntries`] or [`Error::Overflow`] when the
    /// values do not fit the classic (non-ZIP64) record
    pub fn new(entries: usize, central_dir_size: u64, central_dir_offset: u64) -> Result<EndOfCentralDirectory, Error> {
        let entries = u16::try_from(entries).map_err(|_| Error::TooManyEntries(entries))?;
        let central_dir_size = u32::try_from(central_dir_size).map_err(|_| Error::Overflow)?;
        let central_dir_offset = u32::try_from(central_dir_offset).map_err(|_| Error::Overflow)?;

        Ok(EndOfCentralDirectory {
            signature: END_RECORD_SIGNATURE.to_le(),
            disk: 0,
            central_dir_disk: 0,
            disk_entries: entries.to_le(),
            total_entries: entries.to_le(),
            central_dir_size: central_dir_size.to_le(),
            central_dir_offset: central_dir_offset.to_le(),
            comment_len: 0,
        })
    }

    pub fn signature(&self) -> u32 {
        u32::from_le(self.signature)
    }

    pub fn total_entries(&self) -> u16 {
        u16::from_le(self.total_entries)
    }

    pub fn central_dir_size(&self) -> u32 {
        u32::from_le(self.central_dir_size)
    }

    pub fn central_dir_offset(&self) -> u32 {
        u32::from_le(self.central_dir_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_header_bytes() {
        let common = CommonHeader::new(10, 0, 0, DosDateTime::from_bits(0x586F_6DAF), 0xCBF4_3926, 9, 10);
        let header = LocalFileHeader::new(common);
        let bytes = bytemuck::bytes_of(&header);

        assert_eq!(&bytes[0..4], &[0x50, 0x4b, 0x03, 0x04]);
        assert_eq!(&bytes[4..6], &[10, 0]);
        assert_eq!(&bytes[6..10], &[0, 0, 0, 0]);
        // time first, then date
        assert_eq!(&bytes[10..14], &[0xAF, 0x6D, 0x6F, 0x58]);
        assert_eq!(&bytes[14..18], &[0x26, 0x39, 0xF4, 0xCB]);
        assert_eq!(&bytes[18..22], &[9, 0, 0, 0]);
        assert_eq!(&bytes[22..26], &[9, 0, 0, 0]);
        assert_eq!(&bytes[26..28], &[10, 0]);
        assert_eq!(&bytes[28..30], &[0, 0]);
    }

    #[test]
    fn central_header_bytes() {
        let common = CommonHeader::new(10, 0, 0, DosDateTime::epoch(), 0, 0, 6);
        let header = CentralFileHeader::new(common, 0x10, 0x0102_0304);
        let bytes = bytemuck::bytes_of(&header);

        assert_eq!(&bytes[0..4], &[0x50, 0x4b, 0x01, 0x02]);
        assert_eq!(&bytes[4..6], &[20, 0]);
        assert_eq!(&bytes[32..38], &[0; 6]);
        assert_eq!(&bytes[38..42], &[0x10, 0, 0, 0]);
        assert_eq!(&bytes[42..46], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(header.local_header_offset(), 0x0102_0304);
        assert_eq!(header.common.name_len(), 6);
    }

    #[test]
    fn end_record_bytes() {
        let end = EndOfCentralDirectory::new(5, 300, 200).unwrap();
        let bytes = bytemuck::bytes_of(&end);

        assert_eq!(&bytes[0..4], &[0x50, 0x4b, 0x05, 0x06]);
        assert_eq!(&bytes[4..8], &[0; 4]);
        assert_eq!(&bytes[8..12], &[5, 0, 5, 0]);
        assert_eq!(end.central_dir_size(), 300);
        assert_eq!(end.central_dir_offset(), 200);
        assert_eq!(&bytes[20..22], &[0, 0]);
    }

    #[test]
    fn end_record_limits() {
        assert_eq!(
            EndOfCentralDirectory::new(70_000, 0, 0).unwrap_err(),
            Error::TooManyEntries(70_000)
        );
        assert_eq!(
            EndOfCentralDirectory::new(1, 0, u64::from(u32::MAX) + 1).unwrap_err(),
            Error::Overflow
        );
    }
}
