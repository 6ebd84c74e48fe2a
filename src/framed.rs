use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use bytes::BytesMut;

use crate::builder::Builder;
use crate::error::{Error, Result};
use crate::framed_read::FrameReader;
use crate::framed_write::FrameWriter;
use crate::split::{self, ReadHalf, WriteHalf};
use crate::Conn;

/// A connection that exchanges whole frames instead of raw bytes.
pub trait FramedConn {
    /// The underlying byte-stream connection.
    type Conn;

    /// Reads the next frame from the connection.
    fn read_frame(&self) -> Result<BytesMut>;

    /// Writes one frame to the connection.
    fn write_frame(&self, frame: &[u8]) -> Result<()>;

    /// Closes the connection, dropping any buffered bytes.
    fn close(&self) -> Result<()>;

    /// Returns the underlying connection, for transport-level controls such
    /// as read and write timeouts.
    fn conn(&self) -> &Self::Conn;
}

/// Netstring framing over a shared byte-stream connection.
///
/// `NetstringConn` can be shared between threads. Reads are serialized so
/// each caller receives one whole frame, in wire order; writes are serialized
/// so encoded frames never interleave on the transport. A read and a write
/// may proceed at the same time.
///
/// Once [`read_frame`] returns an error for which [`Error::is_fatal`] holds,
/// every later read fails the same way and the connection should be closed.
///
/// [`read_frame`]: FramedConn::read_frame
pub struct NetstringConn<C> {
    conn: Arc<C>,
    reader: Mutex<FrameReader<ReadHalf<C>>>,
    writer: Mutex<FrameWriter<WriteHalf<C>>>,
    max_frame_size: usize,
    closed: AtomicBool,
}

impl<C: Conn> NetstringConn<C> {
    /// Wraps `conn` with the default maximum frame size of 4096 bytes.
    pub fn new(conn: C) -> NetstringConn<C> {
        Builder::new().new_conn(conn)
    }

    /// Wraps `conn`, accepting frames of up to `max_frame_size` bytes.
    pub fn with_max_frame_size(conn: C, max_frame_size: usize) -> NetstringConn<C> {
        Builder::new().max_frame_size(max_frame_size).new_conn(conn)
    }

    pub(crate) fn with_builder(builder: &Builder, conn: C) -> NetstringConn<C> {
        let conn = Arc::new(conn);
        let (rd, wr) = split::split(conn.clone());
        NetstringConn {
            conn: conn,
            reader: Mutex::new(builder.new_read(rd)),
            writer: Mutex::new(builder.new_write(wr)),
            max_frame_size: builder.get_max_frame_size(),
            closed: AtomicBool::new(false),
        }
    }

    fn lock_reader(&self) -> Result<MutexGuard<FrameReader<ReadHalf<C>>>> {
        self.reader.lock().map_err(|_| Error::desync("frame reader panicked mid-frame"))
    }

    fn lock_writer(&self) -> Result<MutexGuard<FrameWriter<WriteHalf<C>>>> {
        self.writer.lock().map_err(|_| Error::desync("frame writer panicked mid-frame"))
    }
}

impl<C> NetstringConn<C> {
    /// Returns the largest payload accepted from the peer.
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Returns `true` once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl<C: Conn> FramedConn for NetstringConn<C> {
    type Conn = C;

    fn read_frame(&self) -> Result<BytesMut> {
        let mut reader = self.lock_reader()?;
        if self.is_closed() {
            return Err(Error::Closed);
        }
        reader.read_frame()
    }

    fn write_frame(&self, frame: &[u8]) -> Result<()> {
        let mut writer = self.lock_writer()?;
        if self.is_closed() {
            return Err(Error::Closed);
        }
        writer.write_frame(frame)
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);

        // A reader blocked mid-frame holds the lock; shutting the transport
        // down below wakes it, and the closed flag stops any later read.
        let dropped = match self.reader.try_lock() {
            Ok(mut reader) => reader.discard_buffered(),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().discard_buffered(),
            Err(TryLockError::WouldBlock) => 0,
        };
        debug!("closing netstring connection; dropped {} buffered bytes", dropped);

        self.conn.close()?;
        Ok(())
    }

    fn conn(&self) -> &C {
        &self.conn
    }
}

impl<C: fmt::Debug> fmt::Debug for NetstringConn<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NetstringConn")
         .field("conn", &self.conn)
         .field("closed", &self.closed.load(Ordering::SeqCst))
         .finish()
    }
}
