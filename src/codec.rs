//! Buffer-oriented encoding and decoding of netstring frames.
//!
//! The blocking [`FrameReader`] and [`FrameWriter`] cover the common case of
//! owning a byte stream. Callers that manage their own buffers can drive a
//! [`NetstringCodec`] through the [`Decoder`] and [`Encoder`] traits instead.
//!
//! [`FrameReader`]: crate::FrameReader
//! [`FrameWriter`]: crate::FrameWriter

use std::cmp;
use std::fmt::Write;
use std::io;

use bytes::{Buf, BytesMut};

use crate::error::Error;
use crate::length::{max_len_digits, LengthParser, FRAME_DELIMITER};
use crate::DEFAULT_MAX_FRAME_SIZE;

/// Pulls frames out of bytes the caller has already read.
///
/// A decoder may hold a partly parsed frame between calls, so the same
/// instance has to see every byte of the stream in order.
pub trait Decoder {
    /// Frame payload type.
    type Item;

    /// Error reported for malformed input.
    type Error: From<io::Error>;

    /// Takes the next whole frame off the front of `src`.
    ///
    /// Returns `Ok(None)` when `src` ends partway through a frame; the bytes
    /// seen so far are kept or consumed as the decoder sees fit, and the call
    /// should be repeated once more data has been appended.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error>;

    /// Like `decode`, but called once the stream has ended, so a partial
    /// frame left in `buf` is an error rather than a reason to wait.
    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error>;
}

/// Appends the wire form of a frame to a buffer.
pub trait Encoder<Item> {
    /// Error reported when `item` cannot be encoded.
    type Error: From<io::Error>;

    /// Writes `item` as one frame at the end of `dst`.
    fn encode(&mut self, item: Item, dst: &mut BytesMut) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Head,
    Body(usize),
    Skip(usize),
}

/// Netstring codec over `BytesMut` buffers.
///
/// Decoding applies the same limits as [`FrameReader`]: an oversized frame is
/// reported with [`Error::FrameTooLarge`] and its bytes are skipped as they
/// arrive, and a missing `,` discards everything currently buffered.
///
/// [`FrameReader`]: crate::FrameReader
#[derive(Debug, Clone)]
pub struct NetstringCodec {
    max_frame_size: usize,
    len: LengthParser,
    state: DecodeState,
}

impl NetstringCodec {
    /// Creates a codec accepting frames up to the default size of 4096 bytes.
    pub fn new() -> NetstringCodec {
        NetstringCodec::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Creates a codec accepting frames up to `max_frame_size` bytes.
    pub fn with_max_frame_size(max_frame_size: usize) -> NetstringCodec {
        NetstringCodec {
            max_frame_size: max_frame_size,
            len: LengthParser::new(max_len_digits(max_frame_size)),
            state: DecodeState::Head,
        }
    }

    /// Returns the maximum accepted payload size.
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn decode_head(&mut self, src: &mut BytesMut) -> Result<Option<usize>, Error> {
        let mut consumed = 0;
        let mut res = Ok(None);
        while consumed < src.len() {
            let b = src[consumed];
            consumed += 1;
            res = self.len.push(b);
            match res {
                Ok(None) => {}
                _ => break,
            }
        }
        src.advance(consumed);
        res
    }
}

impl Default for NetstringCodec {
    fn default() -> NetstringCodec {
        NetstringCodec::new()
    }
}

impl Decoder for NetstringCodec {
    type Item = BytesMut;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, Error> {
        loop {
            match self.state {
                DecodeState::Head => {
                    let len = match self.decode_head(src)? {
                        Some(len) => len,
                        None => return Ok(None),
                    };
                    if len > self.max_frame_size {
                        debug!("skipping oversized frame; len={} max={}", len, self.max_frame_size);
                        self.state = DecodeState::Skip(len.saturating_add(1));
                        return Err(Error::FrameTooLarge { len: len, max: self.max_frame_size });
                    }
                    self.state = DecodeState::Body(len);
                }
                DecodeState::Body(len) => {
                    if src.len() <= len {
                        src.reserve((len - src.len()).saturating_add(1));
                        return Ok(None);
                    }
                    self.state = DecodeState::Head;
                    let delim = src[len];
                    if delim != FRAME_DELIMITER {
                        warn!("bad frame delimiter; discarding {} buffered bytes", src.len());
                        src.clear();
                        return Err(Error::BadDelimiter(delim));
                    }
                    let frame = src.split_to(len);
                    src.advance(1);
                    trace!("frame decoded from buffer; len={}", len);
                    return Ok(Some(frame));
                }
                DecodeState::Skip(remaining) => {
                    let amt = cmp::min(remaining, src.len());
                    src.advance(amt);
                    if amt < remaining {
                        self.state = DecodeState::Skip(remaining - amt);
                        return Ok(None);
                    }
                    self.state = DecodeState::Head;
                }
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<BytesMut>, Error> {
        match self.decode(buf)? {
            Some(frame) => Ok(Some(frame)),
            None if buf.is_empty() && self.state == DecodeState::Head && self.len.is_empty() => {
                Ok(None)
            }
            None => {
                Err(io::Error::new(io::ErrorKind::UnexpectedEof,
                                   "stream ended inside a frame").into())
            }
        }
    }
}

impl<T: AsRef<[u8]>> Encoder<T> for NetstringCodec {
    type Error = Error;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Error> {
        let data = item.as_ref();
        dst.reserve(max_len_digits(data.len()) + data.len() + 2);
        write!(dst, "{}:", data.len())
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "failed to encode length"))?;
        dst.extend_from_slice(data);
        dst.extend_from_slice(&[FRAME_DELIMITER]);
        Ok(())
    }
}
