//! Buffered copy from a resource into a response

use std::io::{self, Read};

use crate::http::ResponseWriter;

/// Default copy buffer size
pub const DEFAULT_BUFFER_SIZE: usize = 4 * 1024;

/// Copy everything from `input` to `output` through `buffer`.
///
/// Bytes are passed through untouched. Returns the number of bytes copied;
/// an empty `buffer` copies nothing.
pub fn copy_stream<R, W>(input: &mut R, output: &mut W, buffer: &mut [u8]) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: ResponseWriter + ?Sized,
{
    let mut count: u64 = 0;
    loop {
        let n = match input.read(buffer) {
            Ok(0) => return Ok(count),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        output.write(&buffer[..n])?;
        count += n as u64;
    }
}
