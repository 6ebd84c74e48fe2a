use std::fmt;
use std::io::{self, Write};

use bytes::BytesMut;

use crate::builder::Builder;
use crate::codec::{Encoder, NetstringCodec};
use crate::error::{Error, Result};

const INITIAL_CAPACITY: usize = 8 * 1024;

/// Writes netstring frames to a blocking byte stream.
///
/// Each frame is encoded into an internal buffer and handed to the stream in
/// a single `write` call. A short write is reported as
/// [`Error::BadWrite`] rather than retried, because resending part of a frame
/// would corrupt the framing seen by the peer.
pub struct FrameWriter<W> {
    inner: W,
    codec: NetstringCodec,
    buffer: BytesMut,
}

impl<W: Write> FrameWriter<W> {
    /// Creates a new `FrameWriter` with the default configuration.
    pub fn new(inner: W) -> FrameWriter<W> {
        Builder::new().new_write(inner)
    }

    pub(crate) fn with_builder(builder: &Builder, inner: W) -> FrameWriter<W> {
        FrameWriter {
            inner: inner,
            codec: builder.new_codec(),
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Encodes `data` as `<len>:<data>,` and writes it out.
    ///
    /// The write is checked against the full encoded length, digits and
    /// delimiters included.
    pub fn write_frame<T: AsRef<[u8]>>(&mut self, data: T) -> Result<()> {
        self.buffer.clear();
        self.codec.encode(data, &mut self.buffer)?;

        let expected = self.buffer.len();
        trace!("writing frame; encoded={}", expected);

        let written = loop {
            match self.inner.write(&self.buffer) {
                Ok(n) => break n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        };
        if written < expected {
            debug!("short frame write; written={} expected={}", written, expected);
            return Err(Error::BadWrite { written: written, expected: expected });
        }

        self.inner.flush()?;
        Ok(())
    }
}

impl<W> FrameWriter<W> {
    /// Returns a reference to the underlying I/O stream wrapped by
    /// `FrameWriter`.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns a mutable reference to the underlying I/O stream wrapped by
    /// `FrameWriter`.
    ///
    /// Note that care should be taken to not tamper with the underlying stream
    /// of data going out as it may corrupt the stream of frames otherwise
    /// being worked with.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consumes the `FrameWriter`, returning its underlying I/O stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: fmt::Debug> fmt::Debug for FrameWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FrameWriter")
         .field("inner", &self.inner)
         .field("buffer", &format_args!("{}/{}", self.buffer.len(), self.buffer.capacity()))
         .finish()
    }
}
