use std::{cmp, fmt};
use std::io::{self, BufRead, Read};

/// Smallest buffer a `BufReader` will allocate.
const MIN_CAPACITY: usize = 16;

/// The `BufReader` struct adds buffering to any reader, along with the byte
/// level operations the frame reader needs: reading one byte at a time and
/// discarding a known number of bytes to resynchronize a stream.
pub struct BufReader<R> {
    inner: R,
    buf: Box<[u8]>,
    pos: usize,
    cap: usize,
}

impl<R: io::Read> BufReader<R> {
    /// Creates a new `BufReader` with the specified buffer capacity.
    ///
    /// Capacities below 16 bytes are rounded up.
    pub fn with_capacity(cap: usize, inner: R) -> BufReader<R> {
        BufReader {
            inner: inner,
            buf: vec![0; cmp::max(cap, MIN_CAPACITY)].into_boxed_slice(),
            pos: 0,
            cap: 0,
        }
    }

    /// Reads a single byte, blocking until one is available.
    ///
    /// Returns `Ok(None)` once the underlying reader reports end of stream.
    /// Interrupted reads are retried.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.fill_buf() {
                Ok(rem) if rem.is_empty() => return Ok(None),
                Ok(rem) => {
                    let b = rem[0];
                    self.consume(1);
                    return Ok(Some(b));
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Skips the next `n` bytes, reading from the underlying reader as
    /// needed.
    ///
    /// Returns the number of bytes actually discarded, which is less than `n`
    /// only if the stream ended first.
    pub fn discard(&mut self, n: usize) -> io::Result<usize> {
        let mut discarded = 0;
        while discarded < n {
            let amt = match self.fill_buf() {
                Ok(rem) if rem.is_empty() => break,
                Ok(rem) => cmp::min(rem.len(), n - discarded),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            self.consume(amt);
            discarded += amt;
        }
        Ok(discarded)
    }
}

impl<R> BufReader<R> {
    /// Returns the number of bytes sitting in the internal buffer.
    pub fn buffered(&self) -> usize {
        self.cap - self.pos
    }

    /// Drops every buffered byte without touching the underlying reader and
    /// returns how many were dropped.
    pub fn discard_buffered(&mut self) -> usize {
        let n = self.buffered();
        self.pos = 0;
        self.cap = 0;
        n
    }

    /// Returns the size of the internal buffer.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Gets a reference to the underlying reader.
    ///
    /// It is inadvisable to directly read from the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Gets a mutable reference to the underlying reader.
    ///
    /// It is inadvisable to directly read from the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Unwraps this `BufReader`, returning the underlying reader.
    ///
    /// Note that any leftover data in the internal buffer is lost.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: io::Read> io::Read for BufReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // If we don't have any buffered data and we're doing a massive read
        // (larger than our internal buffer), bypass our internal buffer
        // entirely.
        if self.pos == self.cap && buf.len() >= self.buf.len() {
            return self.inner.read(buf);
        }
        let nread = {
            let mut rem = self.fill_buf()?;
            rem.read(buf)?
        };
        self.consume(nread);
        Ok(nread)
    }
}

impl<R: io::Read> io::BufRead for BufReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        // If we've reached the end of our internal buffer then we need to fetch
        // some more data from the underlying reader.
        // Branch using `>=` instead of the more correct `==`
        // to tell the compiler that the pos..cap slice is always valid.
        if self.pos >= self.cap {
            debug_assert!(self.pos == self.cap);
            self.cap = self.inner.read(&mut self.buf)?;
            self.pos = 0;
        }
        Ok(&self.buf[self.pos..self.cap])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = cmp::min(self.pos + amt, self.cap);
    }
}

impl<R: fmt::Debug> fmt::Debug for BufReader<R> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("BufReader")
            .field("reader", &self.inner)
            .field("buffer", &format_args!("{}/{}", self.cap - self.pos, self.buf.len()))
            .finish()
    }
}
