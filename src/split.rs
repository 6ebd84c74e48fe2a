use std::fmt;
use std::io;
use std::sync::Arc;

use crate::Conn;

/// The readable half of a shared connection.
///
/// Implements `io::Read` by forwarding to [`Conn::read`].
pub struct ReadHalf<C> {
    handle: Arc<C>,
}

/// The writable half of a shared connection.
///
/// Implements `io::Write` by forwarding to [`Conn::write`].
pub struct WriteHalf<C> {
    handle: Arc<C>,
}

/// Splits a shared connection into halves that can be driven from different
/// threads.
pub fn split<C: Conn>(conn: Arc<C>) -> (ReadHalf<C>, WriteHalf<C>) {
    (ReadHalf { handle: conn.clone() }, WriteHalf { handle: conn })
}

impl<C> ReadHalf<C> {
    /// Returns the shared connection.
    pub fn get_ref(&self) -> &C {
        &self.handle
    }
}

impl<C> WriteHalf<C> {
    /// Returns the shared connection.
    pub fn get_ref(&self) -> &C {
        &self.handle
    }
}

impl<C: Conn> io::Read for ReadHalf<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.handle.read(buf)
    }
}

impl<C: Conn> io::Write for WriteHalf<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.handle.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.handle.flush()
    }
}

impl<C: fmt::Debug> fmt::Debug for ReadHalf<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ReadHalf").field(&self.handle).finish()
    }
}

impl<C: fmt::Debug> fmt::Debug for WriteHalf<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("WriteHalf").field(&self.handle).finish()
    }
}
