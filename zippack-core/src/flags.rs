use bitflags::bitflags;

bitflags! {
    /// MS-DOS file attributes, stored in the low byte of the central header's
    /// external attributes field
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExternalAttributes: u32 {
        const DIRECTORY = 0x10;
        const ARCHIVE = 0x20;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GeneralPurposeFlags: u16 {
        /// File name is encoded as UTF-8
        const UTF8 = 1 << 11;
    }
}

#[cfg(test)]
mod tests {
    use super::{ExternalAttributes, GeneralPurposeFlags};

    #[test]
    fn dos_attribute_values() {
        assert_eq!(ExternalAttributes::DIRECTORY.bits(), 16);
        assert_eq!(ExternalAttributes::ARCHIVE.bits(), 32);
        assert_ne!(ExternalAttributes::DIRECTORY, ExternalAttributes::ARCHIVE);
    }

    #[test]
    fn utf8_flag_is_bit_11() {
        assert_eq!(GeneralPurposeFlags::UTF8.bits(), 0x0800);
    }
}
