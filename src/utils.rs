use super::Result;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Reads into `buf` starting at `offset` until it is full or the reader hits EOF.
/// Returns the number of bytes actually read, so callers can detect short reads.
pub fn read_at<R: Read + Seek>(r: &mut R, offset: u64, buf: &mut [u8]) -> Result<usize> {
    r.seek(SeekFrom::Start(offset))?;

    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
