use super::Result;
use crate::{utils, Error};
use bytes::Bytes;
use log::{debug, trace};
use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

pub type PageNum = u32;

const PAGE_SIZE_OFFSET: u64 = 16;

/// How a database file is opened and how many pages its pager may keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenOptions {
    writable: bool,
    cache_capacity: Option<usize>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the file read-write. Nothing writes through the pager yet.
    pub fn writable(self, writable: bool) -> Self {
        Self { writable, ..self }
    }

    /// Bound the page cache. Without a bound every page read stays cached
    /// for the life of the pager; a bound of 0 disables caching.
    pub fn cache_capacity(self, capacity: usize) -> Self {
        Self {
            cache_capacity: Some(capacity),
            ..self
        }
    }
}

#[derive(Debug, Default)]
struct PageCache {
    pages: HashMap<PageNum, Bytes>,
    // insertion order, only consulted when bounded
    order: VecDeque<PageNum>,
    capacity: Option<usize>,
}

impl PageCache {
    fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    fn get(&self, num: PageNum) -> Option<Bytes> {
        self.pages.get(&num).cloned()
    }

    fn insert(&mut self, num: PageNum, page: Bytes) {
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return;
            }
            while self.pages.len() >= capacity {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.pages.remove(&oldest);
                debug!("evicted page {oldest} from cache");
            }
        }

        if self.pages.insert(num, page).is_none() {
            self.order.push_back(num);
        }
    }

    fn len(&self) -> usize {
        self.pages.len()
    }
}

/// Serves fixed-size pages of a database image by page number.
/// Page 0 starts at offset 0 and holds the file header.
#[derive(Debug)]
pub struct Pager<R: Read + Seek> {
    reader: R,
    page_size: u16,
    cache: PageCache,
}

impl Pager<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, OpenOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(options.writable)
            .open(path)?;
        debug!(
            "opened {} ({})",
            path.display(),
            if options.writable { "read-write" } else { "read-only" }
        );
        Self::with_options(file, options)
    }
}

impl<R: Read + Seek> Pager<R> {
    pub fn new(reader: R) -> Result<Self> {
        Self::with_options(reader, OpenOptions::default())
    }

    /// Reads the page size from the header before anything else; fails with
    /// `CorruptHeader` when the two bytes at offset 16 are missing.
    pub fn with_options(mut reader: R, options: OpenOptions) -> Result<Self> {
        let mut buf = [0u8; 2];
        let read = utils::read_at(&mut reader, PAGE_SIZE_OFFSET, &mut buf)?;
        if read != buf.len() {
            return Err(corrupt_header!(
                "could not read page size: got {read} of {} bytes",
                buf.len()
            ));
        }

        let page_size = u16::from_be_bytes(buf);
        debug!("page size is {page_size}");

        Ok(Self {
            reader,
            page_size,
            cache: PageCache::new(options.cache_capacity),
        })
    }

    pub fn page_size(&self) -> u16 {
        self.page_size
    }

    /// Returns exactly `page_size` bytes for page `num`, reading the file only
    /// the first time a page is asked for.
    pub fn page(&mut self, num: PageNum) -> Result<Bytes> {
        let size = self.usable_page_size()?;

        if let Some(page) = self.cache.get(num) {
            trace!("page {num} served from cache");
            return Ok(page);
        }

        let offset = u64::from(num) * size as u64;
        let mut buf = vec![0u8; size];
        let read = utils::read_at(&mut self.reader, offset, &mut buf)?;
        if read != size {
            return Err(Error::CorruptFile {
                page: num,
                expected: size,
                read,
            });
        }
        debug!("read page {num} at offset {offset}");

        let page = Bytes::from(buf);
        self.cache.insert(num, page.clone());
        Ok(page)
    }

    /// Number of whole pages in the underlying file.
    pub fn page_count(&mut self) -> Result<u64> {
        let size = self.usable_page_size()?;
        let len = self.reader.seek(SeekFrom::End(0))?;
        Ok(len / size as u64)
    }

    pub fn cached_pages(&self) -> usize {
        self.cache.len()
    }

    fn usable_page_size(&self) -> Result<usize> {
        match self.page_size {
            0 => Err(Error::InvalidState("page size is not set")),
            n => Ok(n as usize),
        }
    }
}
