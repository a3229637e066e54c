use super::Result;
use crate::Error;
use bytes::Buf;
use std::fmt;
use std::ops::Range;

pub const FILE_HEADER_SIZE: usize = 100;
pub const MAGIC_STRING: &[u8; 16] = b"SQLite format 3\0";

const MIN_PAGE_SIZE: u16 = 512;
const MAX_PAGE_SIZE: u16 = 32768;

/// Every field of the 100-byte file header, in on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    MagicString,
    PageSize,
    WriteVersion,
    ReadVersion,
    ReservedSpaceSize,
    MaxPayloadFraction,
    MinPayloadFraction,
    LeafPayloadFraction,
    FileChangeCounter,
    DatabaseSize,
    FirstFreelistTrunkPage,
    TotalFreelistPages,
    SchemaCookie,
    SchemaFormat,
    DefaultPageCacheSize,
    LargestRootBtreePage,
    TextEncoding,
    UserVersion,
    IncrementalVacuumMode,
    ApplicationId,
    ReservedExpansion,
    VersionValidFor,
    SqliteVersionNumber,
}

impl HeaderField {
    pub const ALL: [HeaderField; 23] = [
        Self::MagicString,
        Self::PageSize,
        Self::WriteVersion,
        Self::ReadVersion,
        Self::ReservedSpaceSize,
        Self::MaxPayloadFraction,
        Self::MinPayloadFraction,
        Self::LeafPayloadFraction,
        Self::FileChangeCounter,
        Self::DatabaseSize,
        Self::FirstFreelistTrunkPage,
        Self::TotalFreelistPages,
        Self::SchemaCookie,
        Self::SchemaFormat,
        Self::DefaultPageCacheSize,
        Self::LargestRootBtreePage,
        Self::TextEncoding,
        Self::UserVersion,
        Self::IncrementalVacuumMode,
        Self::ApplicationId,
        Self::ReservedExpansion,
        Self::VersionValidFor,
        Self::SqliteVersionNumber,
    ];

    /// `(offset, width)` of the field, in bytes from the start of the file.
    /// Widths of 1, 2 and 4 are big-endian unsigned integers, anything else is raw bytes.
    pub const fn layout(self) -> (usize, usize) {
        match self {
            Self::MagicString => (0, 16),
            Self::PageSize => (16, 2),
            Self::WriteVersion => (18, 1),
            Self::ReadVersion => (19, 1),
            Self::ReservedSpaceSize => (20, 1),
            Self::MaxPayloadFraction => (21, 1),
            Self::MinPayloadFraction => (22, 1),
            Self::LeafPayloadFraction => (23, 1),
            Self::FileChangeCounter => (24, 4),
            Self::DatabaseSize => (28, 4),
            Self::FirstFreelistTrunkPage => (32, 4),
            Self::TotalFreelistPages => (36, 4),
            Self::SchemaCookie => (40, 4),
            Self::SchemaFormat => (44, 4),
            Self::DefaultPageCacheSize => (48, 4),
            Self::LargestRootBtreePage => (52, 4),
            Self::TextEncoding => (56, 4),
            Self::UserVersion => (60, 4),
            Self::IncrementalVacuumMode => (64, 4),
            Self::ApplicationId => (68, 4),
            Self::ReservedExpansion => (72, 20),
            Self::VersionValidFor => (92, 4),
            Self::SqliteVersionNumber => (96, 4),
        }
    }

    pub const fn offset(self) -> usize {
        self.layout().0
    }

    pub const fn width(self) -> usize {
        self.layout().1
    }

    pub fn range(self) -> Range<usize> {
        let (offset, width) = self.layout();
        offset..offset + width
    }

    fn bytes(self, buf: &[u8]) -> &[u8] {
        &buf[self.range()]
    }

    fn read_u8(self, buf: &[u8]) -> u8 {
        debug_assert_eq!(self.width(), 1);
        self.bytes(buf).get_u8()
    }

    fn read_u16(self, buf: &[u8]) -> u16 {
        debug_assert_eq!(self.width(), 2);
        self.bytes(buf).get_u16()
    }

    fn read_u32(self, buf: &[u8]) -> u32 {
        debug_assert_eq!(self.width(), 4);
        self.bytes(buf).get_u32()
    }

    fn read_array<const N: usize>(self, buf: &[u8]) -> [u8; N] {
        debug_assert_eq!(self.width(), N);
        let mut out = [0u8; N];
        self.bytes(buf).copy_to_slice(&mut out);
        out
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MagicString => "magic string",
            Self::PageSize => "page size",
            Self::WriteVersion => "file format write version",
            Self::ReadVersion => "file format read version",
            Self::ReservedSpaceSize => "reserved space size",
            Self::MaxPayloadFraction => "max embedded payload fraction",
            Self::MinPayloadFraction => "min embedded payload fraction",
            Self::LeafPayloadFraction => "leaf payload fraction",
            Self::FileChangeCounter => "file change counter",
            Self::DatabaseSize => "database size in pages",
            Self::FirstFreelistTrunkPage => "first freelist trunk page",
            Self::TotalFreelistPages => "total freelist pages",
            Self::SchemaCookie => "schema cookie",
            Self::SchemaFormat => "schema format number",
            Self::DefaultPageCacheSize => "default page cache size",
            Self::LargestRootBtreePage => "largest root b-tree page",
            Self::TextEncoding => "text encoding",
            Self::UserVersion => "user version",
            Self::IncrementalVacuumMode => "incremental vacuum mode",
            Self::ApplicationId => "application id",
            Self::ReservedExpansion => "reserved expansion",
            Self::VersionValidFor => "version-valid-for number",
            Self::SqliteVersionNumber => "sqlite version number",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16le,
    Utf16be,
}

impl TryFrom<u32> for TextEncoding {
    type Error = Error;

    fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Utf8),
            2 => Ok(Self::Utf16le),
            3 => Ok(Self::Utf16be),
            _ => Err(err!("Invalid text encoding: {value}")),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(f, "utf-8"),
            Self::Utf16le => write!(f, "utf-16le"),
            Self::Utf16be => write!(f, "utf-16be"),
        }
    }
}

/// The decoded database file header. Immutable once decoded; validity is
/// computed on demand from the decoded fields rather than stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    magic: [u8; 16],
    page_size: u16,
    write_version: u8,
    read_version: u8,
    reserved_space_size: u8,
    max_payload_fraction: u8,
    min_payload_fraction: u8,
    leaf_payload_fraction: u8,
    file_change_counter: u32,
    database_size: u32,
    first_freelist_trunk_page: u32,
    total_freelist_pages: u32,
    schema_cookie: u32,
    schema_format: u32,
    default_page_cache_size: u32,
    largest_root_btree_page: u32,
    text_encoding: u32,
    user_version: u32,
    incremental_vacuum_mode: u32,
    application_id: u32,
    reserved_expansion: [u8; 20],
    version_valid_for: u32,
    sqlite_version_number: u32,
}

macro_rules! getters {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&self) -> $ty {
                self.$name
            }
        )*
    };
}

impl FileHeader {
    /// Decodes the first 100 bytes of `buf`. Never fails on field contents,
    /// only on a buffer too short to hold a header.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < FILE_HEADER_SIZE {
            return Err(Error::TruncatedHeader { len: buf.len() });
        }

        use HeaderField as F;
        Ok(Self {
            magic: F::MagicString.read_array(buf),
            page_size: F::PageSize.read_u16(buf),
            write_version: F::WriteVersion.read_u8(buf),
            read_version: F::ReadVersion.read_u8(buf),
            reserved_space_size: F::ReservedSpaceSize.read_u8(buf),
            max_payload_fraction: F::MaxPayloadFraction.read_u8(buf),
            min_payload_fraction: F::MinPayloadFraction.read_u8(buf),
            leaf_payload_fraction: F::LeafPayloadFraction.read_u8(buf),
            file_change_counter: F::FileChangeCounter.read_u32(buf),
            database_size: F::DatabaseSize.read_u32(buf),
            first_freelist_trunk_page: F::FirstFreelistTrunkPage.read_u32(buf),
            total_freelist_pages: F::TotalFreelistPages.read_u32(buf),
            schema_cookie: F::SchemaCookie.read_u32(buf),
            schema_format: F::SchemaFormat.read_u32(buf),
            default_page_cache_size: F::DefaultPageCacheSize.read_u32(buf),
            largest_root_btree_page: F::LargestRootBtreePage.read_u32(buf),
            text_encoding: F::TextEncoding.read_u32(buf),
            user_version: F::UserVersion.read_u32(buf),
            incremental_vacuum_mode: F::IncrementalVacuumMode.read_u32(buf),
            application_id: F::ApplicationId.read_u32(buf),
            reserved_expansion: F::ReservedExpansion.read_array(buf),
            version_valid_for: F::VersionValidFor.read_u32(buf),
            sqlite_version_number: F::SqliteVersionNumber.read_u32(buf),
        })
    }

    getters! {
        page_size: u16,
        write_version: u8,
        read_version: u8,
        reserved_space_size: u8,
        max_payload_fraction: u8,
        min_payload_fraction: u8,
        leaf_payload_fraction: u8,
        file_change_counter: u32,
        database_size: u32,
        first_freelist_trunk_page: u32,
        total_freelist_pages: u32,
        schema_cookie: u32,
        schema_format: u32,
        default_page_cache_size: u32,
        largest_root_btree_page: u32,
        user_version: u32,
        incremental_vacuum_mode: u32,
        application_id: u32,
        version_valid_for: u32,
        sqlite_version_number: u32,
    }

    pub fn magic(&self) -> &[u8; 16] {
        &self.magic
    }

    pub fn reserved_expansion(&self) -> &[u8; 20] {
        &self.reserved_expansion
    }

    pub fn raw_text_encoding(&self) -> u32 {
        self.text_encoding
    }

    pub fn text_encoding(&self) -> Option<TextEncoding> {
        TextEncoding::try_from(self.text_encoding).ok()
    }

    /// Bytes per page available for content. Saturates at 0 when the
    /// reserved space exceeds the page size.
    pub fn page_size_in_use(&self) -> u16 {
        self.page_size.saturating_sub(u16::from(self.reserved_space_size))
    }

    /// Power of two in 512..=32768. The value 1 is taken literally, not as 65536.
    pub fn has_legal_page_size(&self) -> bool {
        (MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.page_size)
            && self.page_size.is_power_of_two()
    }

    /// The size at offset 28 is only trustworthy when it is non-zero and the
    /// change counter matches the version-valid-for number.
    pub fn in_header_size_is_valid(&self) -> bool {
        self.database_size != 0 && self.file_change_counter == self.version_valid_for
    }

    /// Fields whose decoded value breaks the format's rules, in on-disk order.
    pub fn violations(&self) -> Vec<HeaderField> {
        use HeaderField as F;

        // The trailing NUL of the magic string is not compared.
        let checks = [
            (F::MagicString, self.magic[..15] == MAGIC_STRING[..15]),
            (F::WriteVersion, matches!(self.write_version, 1 | 2)),
            (F::ReadVersion, matches!(self.read_version, 1 | 2)),
            (F::MaxPayloadFraction, self.max_payload_fraction == 64),
            (F::MinPayloadFraction, self.min_payload_fraction == 32),
            (F::LeafPayloadFraction, self.leaf_payload_fraction == 32),
            (F::SchemaFormat, (1..=4).contains(&self.schema_format)),
            (F::TextEncoding, (1..=3).contains(&self.text_encoding)),
            (
                F::ReservedExpansion,
                self.reserved_expansion.iter().all(|b| *b == 0),
            ),
        ];

        checks
            .into_iter()
            .filter_map(|(field, ok)| (!ok).then_some(field))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.violations().is_empty()
    }
}
