#![no_std]
extern crate alloc;

use core::mem;

pub use crate::dos_time::DosDateTime;
pub use crate::entry::{EntryHeader, EntryKind};
pub use crate::error::Error;
pub use crate::flags::{ExternalAttributes, GeneralPurposeFlags};
pub use crate::header::{CentralFileHeader, CommonHeader, EndOfCentralDirectory, LocalFileHeader};

mod dos_time;
mod entry;
mod error;
mod flags;
mod header;

pub const LOCAL_HEADER_SIZE: usize = mem::size_of::<LocalFileHeader>();
pub const CENTRAL_HEADER_SIZE: usize = mem::size_of::<CentralFileHeader>();
pub const END_RECORD_SIZE: usize = mem::size_of::<EndOfCentralDirectory>();

pub const LOCAL_HEADER_SIGNATURE: u32 = 0x04034b50;
pub const CENTRAL_HEADER_SIGNATURE: u32 = 0x02014b50;
pub const END_RECORD_SIGNATURE: u32 = 0x06054b50;

/// Version needed to extract: 1.0, no ZIP64 or other special features
pub const VERSION_NEEDED: u16 = 10;
/// Version made by: 2.0, MS-DOS host (so external attributes are DOS bits)
pub const VERSION_MADE_BY: u16 = 20;
/// Compression method 0, content is stored verbatim
pub const METHOD_STORED: u16 = 0;

/// Most entries a single end record can declare without ZIP64
pub const MAX_ENTRIES: usize = u16::MAX as usize;

#[cfg(test)]
mod tests {
    use core::mem;

    use crate::{
        CentralFileHeader, CommonHeader, EndOfCentralDirectory, LocalFileHeader,
        CENTRAL_HEADER_SIZE, END_RECORD_SIZE, LOCAL_HEADER_SIZE,
    };

    #[test]
    fn common_size() {
        assert_eq!(mem::size_of::<CommonHeader>(), 26);
    }

    #[test]
    fn local_header_size() {
        assert_eq!(mem::size_of::<LocalFileHeader>(), 30);
        assert_eq!(LOCAL_HEADER_SIZE, 30);
    }

    #[test]
    fn central_header_size() {
        assert_eq!(mem::size_of::<CentralFileHeader>(), 46);
        assert_eq!(CENTRAL_HEADER_SIZE, 46);
    }

    #[test]
    fn end_record_size() {
        assert_eq!(mem::size_of::<EndOfCentralDirectory>(), 22);
        assert_eq!(END_RECORD_SIZE, 22);
    }
}
