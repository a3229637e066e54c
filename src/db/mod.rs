pub mod file_header;
pub mod pager;

use super::Result;
use bytes::Bytes;
use file_header::FileHeader;
use log::warn;
use pager::{OpenOptions, PageNum, Pager};
use std::{
    fs::File,
    io::{Read, Seek},
    path::Path,
};

pub type DbFile = Db<File>;

impl Db<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, OpenOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self> {
        Pager::open_with(path, options).and_then(Self::from_pager)
    }
}

/// An opened database image: its pager and the header decoded from page 0.
#[derive(Debug)]
pub struct Db<R: Read + Seek> {
    pager: Pager<R>,
    header: FileHeader,
}

impl<R: Read + Seek> Db<R> {
    pub fn new(r: R) -> Result<Self> {
        Pager::new(r).and_then(Self::from_pager)
    }

    fn from_pager(mut pager: Pager<R>) -> Result<Self> {
        let page = pager.page(0)?;
        let header = FileHeader::decode(&page)?;

        if !header.is_valid() {
            let fields = header
                .violations()
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<String>>()
                .join(", ");
            warn!("database header failed validation: {fields}");
        }

        Ok(Self { pager, header })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn page(&mut self, num: PageNum) -> Result<Bytes> {
        self.pager.page(num)
    }

    pub fn page_count(&mut self) -> Result<u64> {
        self.pager.page_count()
    }
}

#[cfg(test)]
mod tests {
    use super::file_header::tests::valid_header_bytes;
    use super::*;
    use crate::Error;
    use assert_matches::assert_matches;
    use std::io::Cursor;

    fn image(page_size: u16, pages: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; page_size as usize * pages];
        bytes[..100].copy_from_slice(&valid_header_bytes(page_size));
        bytes
    }

    #[test]
    fn it_decodes_the_header_from_page_0() {
        let db = Db::new(Cursor::new(image(512, 2))).unwrap();
        assert!(db.header().is_valid());
        assert_eq!(db.header().page_size(), 512);
    }

    #[test]
    fn it_keeps_invalid_headers() {
        let mut bytes = image(512, 1);
        bytes[21] = 65;

        let db = Db::new(Cursor::new(bytes)).unwrap();
        assert!(!db.header().is_valid());
        assert_eq!(db.header().max_payload_fraction(), 65);
    }

    #[test]
    fn it_propagates_pager_errors() {
        let mut bytes = image(1024, 1);
        bytes.truncate(600);
        assert_matches!(
            Db::new(Cursor::new(bytes)),
            Err(Error::CorruptFile { page: 0, .. })
        );

        assert_matches!(
            Db::new(Cursor::new(vec![0u8; 10])),
            Err(Error::CorruptHeader(_))
        );
    }

    #[test]
    fn it_fails_when_page_is_smaller_than_header() {
        let mut bytes = image(512, 1);
        bytes[16..18].copy_from_slice(&64u16.to_be_bytes());
        assert_matches!(
            Db::new(Cursor::new(bytes)),
            Err(Error::TruncatedHeader { len: 64 })
        );
    }

    #[test]
    fn it_serves_further_pages() {
        let mut bytes = image(512, 3);
        bytes[1024..].fill(7);

        let mut db = Db::new(Cursor::new(bytes)).unwrap();
        assert_eq!(db.page_count().unwrap(), 3);
        assert!(db.page(2).unwrap().iter().all(|b| *b == 7));
    }
}
