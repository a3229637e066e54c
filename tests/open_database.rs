use assert_matches::assert_matches;
use sqlite_inspect::{Db, Error, OpenOptions, Pager};
use std::fs;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

const MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// A database image as a fresh sqlite3 would write it: one page per table
/// root plus page 0, utf-8, schema format 4.
fn sqlite_image(page_size: u16, pages: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; page_size as usize * pages as usize];
    bytes[..16].copy_from_slice(MAGIC);
    bytes[16..18].copy_from_slice(&page_size.to_be_bytes());
    bytes[18] = 1;
    bytes[19] = 1;
    bytes[21] = 64;
    bytes[22] = 32;
    bytes[23] = 32;
    bytes[24..28].copy_from_slice(&3u32.to_be_bytes());
    bytes[28..32].copy_from_slice(&pages.to_be_bytes());
    bytes[40..44].copy_from_slice(&1u32.to_be_bytes());
    bytes[44..48].copy_from_slice(&4u32.to_be_bytes());
    bytes[56..60].copy_from_slice(&1u32.to_be_bytes());
    bytes[92..96].copy_from_slice(&3u32.to_be_bytes());
    bytes[96..100].copy_from_slice(&3_045_001u32.to_be_bytes());
    // b-tree page header of the schema table, opaque to the decoder
    bytes[100] = 0x0d;
    bytes
}

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn it_opens_a_database_file() {
    let file = write_temp(&sqlite_image(4096, 2));
    let db = Db::open(file.path()).unwrap();
    let header = db.header();

    assert!(header.is_valid());
    assert!(header.has_legal_page_size());
    assert_eq!(header.page_size(), 4096);
    assert_eq!(header.page_size_in_use(), 4096);
    assert_eq!(header.database_size(), 2);
    assert!(header.in_header_size_is_valid());
    assert_eq!(header.schema_cookie(), 1);
    assert_eq!(header.sqlite_version_number(), 3_045_001);
}

#[test]
fn it_serves_pages_from_a_file() {
    let mut bytes = sqlite_image(512, 3);
    bytes[1024..].fill(0x5a);
    let file = write_temp(&bytes);

    let mut pager = Pager::open(file.path()).unwrap();
    assert_eq!(pager.page_size(), 512);
    assert_eq!(pager.page_count().unwrap(), 3);

    let page = pager.page(0).unwrap();
    assert_eq!(page.len(), 512);
    assert_eq!(&page[..16], MAGIC);

    let first = pager.page(2).unwrap();
    let second = pager.page(2).unwrap();
    assert_eq!(first, second);
    assert!(first.iter().all(|b| *b == 0x5a));
}

#[test]
fn it_keeps_cached_pages_after_the_file_changes() {
    let file = write_temp(&sqlite_image(512, 2));
    let mut pager = Pager::open(file.path()).unwrap();
    let before = pager.page(1).unwrap();

    let mut bytes = sqlite_image(512, 2);
    bytes[512..].fill(0xff);
    fs::write(file.path(), &bytes).unwrap();

    assert_eq!(pager.page(1).unwrap(), before);
}

#[test]
fn it_fails_on_a_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.db");

    assert_matches!(Db::open(&path), Err(Error::Io(_)));
    assert_matches!(Pager::open(&path), Err(Error::Io(_)));
}

#[test]
fn it_fails_on_files_too_short_for_a_page_size() {
    let file = write_temp(&MAGIC[..]);
    assert_matches!(Db::open(file.path()), Err(Error::CorruptHeader(_)));
}

#[test]
fn it_fails_on_a_truncated_first_page() {
    let bytes = sqlite_image(4096, 1);
    let file = write_temp(&bytes[..1000]);

    assert_matches!(
        Db::open(file.path()),
        Err(Error::CorruptFile {
            page: 0,
            expected: 4096,
            read: 1000
        })
    );
}

#[test]
fn it_opens_foreign_files_with_an_invalid_header() {
    let mut bytes = vec![0u8; 512];
    bytes[..16].copy_from_slice(b"not a database!\0");
    bytes[16..18].copy_from_slice(&512u16.to_be_bytes());
    let file = write_temp(&bytes);

    let db = Db::open(file.path()).unwrap();
    assert!(!db.header().is_valid());
    assert_eq!(db.header().page_size(), 512);
}

#[test]
fn it_opens_read_write_with_a_bounded_cache() {
    let file = write_temp(&sqlite_image(512, 4));
    let options = OpenOptions::new().writable(true).cache_capacity(1);

    let mut db = Db::open_with(file.path(), options).unwrap();
    assert!(db.header().is_valid());
    for num in 0..4 {
        assert_eq!(db.page(num).unwrap().len(), 512);
    }
}
