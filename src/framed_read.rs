use std::fmt;
use std::io::{self, Read};

use bytes::BytesMut;

use crate::buf_reader::BufReader;
use crate::builder::Builder;
use crate::error::{Error, Result};
use crate::length::{read_len, FRAME_DELIMITER};

/// Reads whole netstring frames from a blocking byte stream.
///
/// Every call to [`read_frame`] consumes exactly one frame. Malformed frames
/// are reported as errors and, where the damage is bounded, the stream is
/// resynchronized so the next call starts on a frame boundary:
///
/// * a frame larger than the configured maximum is skipped by discarding its
///   declared length plus the trailing `,`;
/// * a payload not followed by `,` discards everything currently buffered.
///
/// If the oversized-frame skip cannot complete, or an I/O error strikes after
/// part of a frame was consumed, the reader reports [`Error::Desync`] and
/// refuses to read any further frames. Errors before the first byte of a
/// frame, such as a read timeout, consume nothing and leave the reader usable.
///
/// [`read_frame`]: FrameReader::read_frame
pub struct FrameReader<R> {
    inner: BufReader<R>,
    max_frame_size: usize,
    max_len_digits: usize,
    poisoned: bool,
}

impl<R: Read> FrameReader<R> {
    /// Creates a new `FrameReader` with the default configuration.
    pub fn new(inner: R) -> FrameReader<R> {
        Builder::new().new_read(inner)
    }

    pub(crate) fn with_builder(builder: &Builder, inner: R) -> FrameReader<R> {
        FrameReader {
            inner: BufReader::with_capacity(builder.read_buffer_capacity(), inner),
            max_frame_size: builder.get_max_frame_size(),
            max_len_digits: builder.max_len_digits(),
            poisoned: false,
        }
    }

    /// Reads the next frame, blocking until all of it has arrived.
    ///
    /// The returned buffer holds the payload only; the trailing `,` is
    /// stripped.
    pub fn read_frame(&mut self) -> Result<BytesMut> {
        if self.poisoned {
            return Err(Error::desync("reader lost frame alignment earlier"));
        }

        let len = match read_len(&mut self.inner, self.max_len_digits) {
            Ok(len) => len,
            Err(Error::Desync { reason }) => return Err(self.poison(reason)),
            Err(e) => return Err(e),
        };

        // payload plus the trailing delimiter
        let want = match len.checked_add(1) {
            Some(want) if len <= self.max_frame_size => want,
            _ => return Err(self.skip_frame(len)),
        };

        let mut msg = BytesMut::with_capacity(want);
        msg.resize(want, 0);
        if let Err(e) = self.inner.read_exact(&mut msg) {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                return Err(e.into());
            }
            return Err(self.poison(format!("read failed inside frame body: {}", e)));
        }

        let delim = msg[len];
        if delim != FRAME_DELIMITER {
            let n = self.inner.discard_buffered();
            warn!("bad frame delimiter {:#04x}; discarded {} buffered bytes", delim, n);
            return Err(Error::BadDelimiter(delim));
        }

        msg.truncate(len);
        trace!("frame read; len={}", len);
        Ok(msg)
    }

    // Skips an oversized frame so the next read starts at the following
    // frame. Any shortfall poisons the reader.
    fn skip_frame(&mut self, len: usize) -> Error {
        debug!("frame too large; len={} max={}", len, self.max_frame_size);
        let want = match len.checked_add(1) {
            Some(want) => want,
            None => return self.poison(format!("cannot skip frame of length {}", len)),
        };
        match self.inner.discard(want) {
            Ok(n) if n == want => {
                warn!("skipped oversized frame of {} bytes", len);
                Error::FrameTooLarge { len: len, max: self.max_frame_size }
            }
            Ok(n) => {
                self.poison(format!("stream ended after discarding {} of {} bytes", n, want))
            }
            Err(e) => self.poison(format!("failed to discard oversized frame: {}", e)),
        }
    }

    fn poison(&mut self, reason: String) -> Error {
        error!("netstring framing lost: {}", reason);
        self.poisoned = true;
        Error::desync(reason)
    }
}

impl<R> FrameReader<R> {
    /// Returns `true` once the reader has reported [`Error::Desync`].
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Returns the largest payload this reader accepts.
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Returns the largest number of digits accepted in a length field.
    pub fn max_len_digits(&self) -> usize {
        self.max_len_digits
    }

    /// Returns the number of bytes read from the stream but not yet framed.
    pub fn buffered(&self) -> usize {
        self.inner.buffered()
    }

    /// Drops any bytes read from the stream but not yet framed.
    pub fn discard_buffered(&mut self) -> usize {
        self.inner.discard_buffered()
    }

    /// Returns a reference to the underlying I/O stream wrapped by
    /// `FrameReader`.
    ///
    /// Note that care should be taken to not tamper with the underlying stream
    /// of data coming in as it may corrupt the stream of frames otherwise
    /// being worked with.
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    /// Returns a mutable reference to the underlying I/O stream wrapped by
    /// `FrameReader`.
    ///
    /// Note that care should be taken to not tamper with the underlying stream
    /// of data coming in as it may corrupt the stream of frames otherwise
    /// being worked with.
    pub fn get_mut(&mut self) -> &mut R {
        self.inner.get_mut()
    }

    /// Consumes the `FrameReader`, returning its underlying I/O stream.
    ///
    /// Any buffered bytes not yet framed are lost.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: fmt::Debug> fmt::Debug for FrameReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FrameReader")
         .field("inner", &self.inner)
         .field("max_frame_size", &self.max_frame_size)
         .field("poisoned", &self.poisoned)
         .finish()
    }
}

