#[macro_use]
mod macros;
mod cli;
pub mod db;
mod error;
mod utils;

pub type Result<T> = std::result::Result<T, Error>;
pub use cli::{Cli, Command};
pub use db::{
    file_header::{FileHeader, HeaderField, TextEncoding},
    pager::{OpenOptions, PageNum, Pager},
    Db, DbFile,
};
pub use error::Error;
