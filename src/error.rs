use std::io;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("ERR - io: {0}")]
    Io(#[from] io::Error),

    #[error("ERR - corrupt header: {0}")]
    CorruptHeader(String),

    #[error("ERR - truncated header: got {len} bytes, need 100")]
    TruncatedHeader { len: usize },

    #[error("ERR - corrupt file: page {page} read {read} of {expected} bytes")]
    CorruptFile {
        page: u32,
        expected: usize,
        read: usize,
    },

    #[error("ERR - invalid state: {0}")]
    InvalidState(&'static str),

    #[error("ERR - other: {0}")]
    Other(#[from] anyhow::Error),
}
