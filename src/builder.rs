use std::cmp;
use std::io;

use crate::codec::NetstringCodec;
use crate::framed::NetstringConn;
use crate::framed_read::FrameReader;
use crate::framed_write::FrameWriter;
use crate::length::max_len_digits;
use crate::{Conn, DEFAULT_MAX_FRAME_SIZE};

/// Largest read buffer allocated regardless of the frame size limit.
const MAX_READ_BUFFER: usize = 64 * 1024;

/// Configures and constructs netstring readers, writers and connections.
///
/// The only knob is the maximum payload size. The maximum number of digits
/// in a length field is derived from it, so a peer can never make the reader
/// scan or allocate more than the limit allows.
///
/// ```
/// use netstring_io::Builder;
///
/// let mut builder = Builder::new();
/// builder.max_frame_size(99_999);
/// assert_eq!(builder.max_len_digits(), 5);
///
/// let reader = builder.new_read(&b"5:hello,"[..]);
/// assert_eq!(reader.max_frame_size(), 99_999);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Builder {
    max_frame_size: usize,
}

impl Builder {
    /// Creates a builder with the default frame size limit of 4096 bytes.
    pub fn new() -> Builder {
        Builder {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Sets the maximum payload size, in bytes, accepted by readers.
    ///
    /// Writers never enforce it; the limit is local to the receiving end.
    pub fn max_frame_size(&mut self, val: usize) -> &mut Builder {
        self.max_frame_size = val;
        self
    }

    /// Returns the configured maximum payload size.
    pub fn get_max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Returns the number of digits allowed in a length field.
    pub fn max_len_digits(&self) -> usize {
        max_len_digits(self.max_frame_size)
    }

    pub(crate) fn read_buffer_capacity(&self) -> usize {
        cmp::min(self.max_frame_size, MAX_READ_BUFFER)
    }

    /// Creates a `FrameReader` over `inner`.
    pub fn new_read<R: io::Read>(&self, inner: R) -> FrameReader<R> {
        FrameReader::with_builder(self, inner)
    }

    /// Creates a `FrameWriter` over `inner`.
    pub fn new_write<W: io::Write>(&self, inner: W) -> FrameWriter<W> {
        FrameWriter::with_builder(self, inner)
    }

    /// Wraps an established connection into a `NetstringConn`.
    pub fn new_conn<C: Conn>(&self, conn: C) -> NetstringConn<C> {
        NetstringConn::with_builder(self, conn)
    }

    /// Creates a buffer codec with the same limits.
    pub fn new_codec(&self) -> NetstringCodec {
        NetstringCodec::with_max_frame_size(self.max_frame_size)
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Builder;

    #[test]
    fn defaults() {
        let builder = Builder::new();
        assert_eq!(builder.get_max_frame_size(), 4096);
        assert_eq!(builder.max_len_digits(), 4);
    }

    #[test]
    fn digits_follow_frame_size() {
        let mut builder = Builder::new();
        builder.max_frame_size(99_999);
        assert_eq!(builder.max_len_digits(), 5);
        builder.max_frame_size(100_000);
        assert_eq!(builder.max_len_digits(), 6);
    }

    #[test]
    fn read_buffer_is_bounded() {
        let mut builder = Builder::new();
        assert_eq!(builder.read_buffer_capacity(), 4096);
        builder.max_frame_size(1 << 30);
        assert_eq!(builder.read_buffer_capacity(), 64 * 1024);
    }
}
