//! Walks packed archives record by record with the core header types
use std::error::Error;
use std::fs;
use std::path::Path;

use zippack::{DosDateTime, PackOptions, Packer, Timestamp};
use zippack_core::{
    CentralFileHeader, EndOfCentralDirectory, ExternalAttributes, GeneralPurposeFlags,
    LocalFileHeader, CENTRAL_HEADER_SIGNATURE, CENTRAL_HEADER_SIZE, END_RECORD_SIGNATURE,
    END_RECORD_SIZE, LOCAL_HEADER_SIGNATURE, LOCAL_HEADER_SIZE,
};

struct Central {
    header: CentralFileHeader,
    name: String,
}

fn end_record(archive: &[u8]) -> EndOfCentralDirectory {
    let at = archive.len() - END_RECORD_SIZE;
    bytemuck::pod_read_unaligned(&archive[at..])
}

fn central_directory(archive: &[u8]) -> Vec<Central> {
    let end = end_record(archive);
    let mut at = end.central_dir_offset() as usize;
    let mut records = Vec::new();
    for _ in 0..end.total_entries() {
        let header: CentralFileHeader =
            bytemuck::pod_read_unaligned(&archive[at..at + CENTRAL_HEADER_SIZE]);
        let name_len = header.common().name_len() as usize;
        let name_at = at + CENTRAL_HEADER_SIZE;
        let name = String::from_utf8(archive[name_at..name_at + name_len].to_vec()).unwrap();
        at = name_at + name_len;
        records.push(Central { header, name });
    }
    records
}

fn pack_tree(root: &Path, output: &Path) -> Result<Vec<u8>, Box<dyn Error>> {
    fs::create_dir_all(root.join("a/b"))?;
    fs::create_dir_all(root.join("empty"))?;
    fs::write(root.join("top.txt"), b"top level")?;
    fs::write(root.join("a/one.txt"), b"1")?;
    fs::write(root.join("a/b/two.txt"), b"22")?;
    fs::write(root.join("a/b/zero.txt"), b"")?;

    let options = PackOptions::default().timestamp(Timestamp::Fixed(
        DosDateTime::new(2024, 3, 15, 13, 45, 30)?,
    ));
    Packer::new(options).pack(root, output)?;
    Ok(fs::read(output)?)
}

#[test]
fn end_record_describes_central_directory() -> Result<(), Box<dyn Error>> {
    let tmp = tempfile::tempdir()?;
    let archive = pack_tree(&tmp.path().join("src"), &tmp.path().join("out.zip"))?;

    let end = end_record(&archive);
    assert_eq!(end.signature(), END_RECORD_SIGNATURE);
    // top.txt, a/, a/one.txt, a/b/, a/b/two.txt, a/b/zero.txt, empty/
    assert_eq!(end.total_entries(), 7);

    let records = central_directory(&archive);
    let central_size: usize = records.iter().map(|r| CENTRAL_HEADER_SIZE + r.name.len()).sum();
    assert_eq!(end.central_dir_size() as usize, central_size);
    assert_eq!(
        end.central_dir_offset() as usize + central_size + END_RECORD_SIZE,
        archive.len()
    );
    Ok(())
}

#[test]
fn central_records_point_at_local_headers() -> Result<(), Box<dyn Error>> {
    let tmp = tempfile::tempdir()?;
    let archive = pack_tree(&tmp.path().join("src"), &tmp.path().join("out.zip"))?;

    let mut expected_offset = 0;
    for record in central_directory(&archive) {
        let central = &record.header;
        assert_eq!(central.signature(), CENTRAL_HEADER_SIGNATURE);
        assert_eq!(central.local_header_offset(), expected_offset);

        let at = central.local_header_offset() as usize;
        let local: LocalFileHeader = bytemuck::pod_read_unaligned(&archive[at..at + LOCAL_HEADER_SIZE]);
        assert_eq!(local.signature(), LOCAL_HEADER_SIGNATURE);

        let name_at = at + LOCAL_HEADER_SIZE;
        assert_eq!(&archive[name_at..name_at + record.name.len()], record.name.as_bytes());

        // Local and central copies agree on everything they share
        let (l, c) = (local.common(), central.common());
        assert_eq!(l.crc32(), c.crc32());
        assert_eq!(l.uncompressed_size(), c.uncompressed_size());
        assert_eq!(l.compressed_size(), l.uncompressed_size());
        assert_eq!(l.last_modified(), c.last_modified());
        assert_eq!(l.name_len() as usize, record.name.len());

        let data_at = name_at + record.name.len();
        let size = c.uncompressed_size() as usize;
        assert_eq!(crc32fast::hash(&archive[data_at..data_at + size]), c.crc32());

        expected_offset = (data_at + size) as u32;
    }
    assert_eq!(expected_offset, end_record(&archive).central_dir_offset());
    Ok(())
}

#[test]
fn directory_and_file_attributes() -> Result<(), Box<dyn Error>> {
    let tmp = tempfile::tempdir()?;
    let archive = pack_tree(&tmp.path().join("src"), &tmp.path().join("out.zip"))?;

    for record in central_directory(&archive) {
        let header = &record.header;
        let attrs = ExternalAttributes::from_bits_retain(header.external_attrs());
        if record.name.ends_with('/') {
            assert_eq!(attrs, ExternalAttributes::DIRECTORY, "{}", record.name);
            assert_eq!(header.common().crc32(), 0);
            assert_eq!(header.common().uncompressed_size(), 0);
        } else {
            assert_eq!(attrs, ExternalAttributes::ARCHIVE, "{}", record.name);
        }
        assert_eq!(header.common().method(), zippack_core::METHOD_STORED);
        assert_eq!(header.common().version_needed(), zippack_core::VERSION_NEEDED);
        assert_eq!(header.version_made_by(), zippack_core::VERSION_MADE_BY);
        assert_eq!(header.common().flags(), GeneralPurposeFlags::empty().bits());
        assert_eq!(
            header.common().last_modified(),
            DosDateTime::new(2024, 3, 15, 13, 45, 30)?
        );
    }
    Ok(())
}

#[test]
fn empty_file_is_a_file() -> Result<(), Box<dyn Error>> {
    let tmp = tempfile::tempdir()?;
    let archive = pack_tree(&tmp.path().join("src"), &tmp.path().join("out.zip"))?;

    let records = central_directory(&archive);
    let zero = records.iter().find(|r| r.name == "a/b/zero.txt").unwrap();
    assert_eq!(zero.header.common().uncompressed_size(), 0);
    assert_eq!(zero.header.common().crc32(), 0);
    assert!(records.iter().any(|r| r.name == "empty/"));
    Ok(())
}
