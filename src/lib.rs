//! Netstring framing for blocking byte streams.
//!
//! A netstring carries one message as `<len>:<payload>,` where `<len>` is the
//! payload length in ASCII decimal digits. The explicit length makes frames
//! binary safe: the payload may contain any byte, `:` and `,` included.
//!
//! This crate layers that framing over any reliable, ordered byte stream:
//!
//! * [`FrameReader`] and [`FrameWriter`] work over plain `io::Read` and
//!   `io::Write` values;
//! * [`NetstringConn`] wraps a [`Conn`] such as a `TcpStream` and can be
//!   shared between threads, handing out whole frames to concurrent readers
//!   and keeping concurrent writers from interleaving;
//! * [`NetstringCodec`] decodes from and encodes into caller-owned
//!   `BytesMut` buffers.
//!
//! Every reader enforces a maximum frame size (4096 bytes unless configured
//! through a [`Builder`]), which also bounds the number of digits it will
//! scan in a length field.
//!
//! ```no_run
//! use std::net::TcpStream;
//! use netstring_io::{FramedConn, NetstringConn};
//!
//! # fn main() -> netstring_io::Result<()> {
//! let conn = NetstringConn::new(TcpStream::connect("127.0.0.1:3000")?);
//! conn.write_frame(b"Hello, World.")?;
//! let reply = conn.read_frame()?;
//! println!("{:?}", reply);
//! conn.close()?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

#[macro_use]
extern crate log;

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

mod buf_reader;
mod builder;
pub mod codec;
mod error;
mod framed;
mod framed_read;
mod framed_write;
mod length;
mod split;

pub use self::buf_reader::BufReader;
pub use self::builder::Builder;
pub use self::codec::{Decoder, Encoder, NetstringCodec};
pub use self::error::{Error, Result};
pub use self::framed::{FramedConn, NetstringConn};
pub use self::framed_read::FrameReader;
pub use self::framed_write::FrameWriter;
pub use self::length::{max_len_digits, FRAME_DELIMITER, LEN_DELIMITER};
pub use self::split::{split, ReadHalf, WriteHalf};

/// Maximum payload size used when none is configured.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 4096;

/// An established byte-stream connection that can be read, written and
/// closed through a shared reference.
///
/// Reads block until data is available and return `Ok(0)` at end of stream.
/// Implementations must be safe to read from one thread while another
/// writes, as sockets are.
pub trait Conn: Send + Sync {
    /// Reads bytes into `buf`, returning how many were read.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes bytes from `buf`, returning how many were written.
    fn write(&self, buf: &[u8]) -> io::Result<usize>;

    /// Flushes any data buffered by the connection.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    /// Shuts the connection down in both directions.
    fn close(&self) -> io::Result<()>;
}

impl Conn for TcpStream {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(&mut &*self, buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        Write::write(&mut &*self, buf)
    }

    fn flush(&self) -> io::Result<()> {
        Write::flush(&mut &*self)
    }

    fn close(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

#[cfg(unix)]
impl Conn for std::os::unix::net::UnixStream {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(&mut &*self, buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        Write::write(&mut &*self, buf)
    }

    fn flush(&self) -> io::Result<()> {
        Write::flush(&mut &*self)
    }

    fn close(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}
