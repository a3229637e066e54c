use super::{db::Db, Error, Result};
use clap::Parser;
use std::io::{Read, Seek};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    pub db_path: PathBuf,
    pub command: Command,

    /// Log page reads and header diagnostics
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    DbInfo,
    Header,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            ".dbinfo" => Ok(Self::DbInfo),
            ".header" => Ok(Self::Header),
            _ => Err(err!("Missing or invalid command passed: {s}")),
        }
    }
}

impl Command {
    pub fn execute<R: Read + Seek>(self, db: &mut Db<R>) -> Result<Vec<String>> {
        match self {
            Self::DbInfo => dbinfo(db),
            Self::Header => Ok(header_lines(db)),
        }
    }
}

fn dbinfo<R: Read + Seek>(db: &mut Db<R>) -> Result<Vec<String>> {
    let page_count = db.page_count()?;
    let header = db.header();
    let encoding = header
        .text_encoding()
        .map(|e| e.to_string())
        .unwrap_or_else(|| format!("unknown ({})", header.raw_text_encoding()));

    let mut lines = vec![
        format!("database page size: {}", header.page_size()),
        format!("usable page size: {}", header.page_size_in_use()),
        format!("number of pages: {page_count}"),
        format!("text encoding: {encoding}"),
        format!("valid header: {}", header.is_valid()),
    ];
    lines.extend(
        header
            .violations()
            .into_iter()
            .map(|field| format!("invalid field: {field}")),
    );
    Ok(lines)
}

fn header_lines<R: Read + Seek>(db: &Db<R>) -> Vec<String> {
    let h = db.header();
    let magic = String::from_utf8_lossy(&h.magic()[..15]).into_owned();

    vec![
        format!("magic string: {magic:?}"),
        format!("page size: {}", h.page_size()),
        format!("file format write version: {}", h.write_version()),
        format!("file format read version: {}", h.read_version()),
        format!("reserved space size: {}", h.reserved_space_size()),
        format!("max embedded payload fraction: {}", h.max_payload_fraction()),
        format!("min embedded payload fraction: {}", h.min_payload_fraction()),
        format!("leaf payload fraction: {}", h.leaf_payload_fraction()),
        format!("file change counter: {}", h.file_change_counter()),
        format!("database size in pages: {}", h.database_size()),
        format!("first freelist trunk page: {}", h.first_freelist_trunk_page()),
        format!("total freelist pages: {}", h.total_freelist_pages()),
        format!("schema cookie: {}", h.schema_cookie()),
        format!("schema format number: {}", h.schema_format()),
        format!("default page cache size: {}", h.default_page_cache_size()),
        format!("largest root b-tree page: {}", h.largest_root_btree_page()),
        format!("text encoding: {}", h.raw_text_encoding()),
        format!("user version: {}", h.user_version()),
        format!("incremental vacuum mode: {}", h.incremental_vacuum_mode()),
        format!("application id: {}", h.application_id()),
        format!("version-valid-for number: {}", h.version_valid_for()),
        format!("sqlite version number: {}", h.sqlite_version_number()),
    ]
}
