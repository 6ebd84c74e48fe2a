extern crate netstring_io;

use netstring_io::BufReader;

use std::collections::VecDeque;
use std::io::{self, BufRead, Read};

/// A dummy reader intended at testing short-reads propagation.
pub struct ShortReader {
    lengths: Vec<usize>,
}

impl Read for ShortReader {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        if self.lengths.is_empty() {
            Ok(0)
        } else {
            Ok(self.lengths.remove(0))
        }
    }
}

/// Hands out one queued result per `read` call.
struct Mock {
    calls: VecDeque<io::Result<Vec<u8>>>,
}

impl Read for Mock {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        match self.calls.pop_front() {
            Some(Ok(data)) => {
                assert!(dst.len() >= data.len());
                dst[..data.len()].copy_from_slice(&data[..]);
                Ok(data.len())
            }
            Some(Err(e)) => Err(e),
            None => Ok(0),
        }
    }
}

#[test]
fn buffered_reader() {
    let inner: &[u8] = &[5, 6, 7, 0, 1, 2, 3, 4];
    let mut reader = BufReader::with_capacity(16, inner);

    let mut buf = [0, 0, 0];
    let nread = reader.read(&mut buf);
    assert_eq!(nread.unwrap(), 3);
    let b: &[_] = &[5, 6, 7];
    assert_eq!(buf, b);
    assert_eq!(reader.buffered(), 5);

    let mut buf = [0, 0];
    let nread = reader.read(&mut buf);
    assert_eq!(nread.unwrap(), 2);
    let b: &[_] = &[0, 1];
    assert_eq!(buf, b);

    let mut buf = [0];
    let nread = reader.read(&mut buf);
    assert_eq!(nread.unwrap(), 1);
    let b: &[_] = &[2];
    assert_eq!(buf, b);

    let mut buf = [0, 0, 0];
    let nread = reader.read(&mut buf);
    assert_eq!(nread.unwrap(), 2);
    let b: &[_] = &[3, 4, 0];
    assert_eq!(buf, b);

    assert_eq!(reader.read(&mut buf).unwrap(), 0);
}

#[test]
fn capacity_has_a_floor() {
    let inner: &[u8] = &[];
    assert_eq!(BufReader::with_capacity(2, inner).capacity(), 16);
    assert_eq!(BufReader::with_capacity(4096, inner).capacity(), 4096);
}

#[test]
fn read_byte_until_eof() {
    let inner: &[u8] = b"ab";
    let mut reader = BufReader::with_capacity(16, inner);
    assert_eq!(reader.read_byte().unwrap(), Some(b'a'));
    assert_eq!(reader.read_byte().unwrap(), Some(b'b'));
    assert_eq!(reader.read_byte().unwrap(), None);
}

#[test]
fn read_byte_retries_interrupted() {
    let mut calls = VecDeque::new();
    calls.push_back(Err(io::Error::new(io::ErrorKind::Interrupted, "")));
    calls.push_back(Ok(b"x".to_vec()));
    let mut reader = BufReader::with_capacity(16, Mock { calls: calls });
    assert_eq!(reader.read_byte().unwrap(), Some(b'x'));
}

#[test]
fn read_byte_propagates_errors() {
    let mut calls = VecDeque::new();
    calls.push_back(Err(io::Error::new(io::ErrorKind::ConnectionReset, "")));
    let mut reader = BufReader::with_capacity(16, Mock { calls: calls });
    assert_eq!(reader.read_byte().unwrap_err().kind(), io::ErrorKind::ConnectionReset);
}

#[test]
fn discard_across_refills() {
    let inner: Vec<u8> = (0u8..40).collect();
    let mut reader = BufReader::with_capacity(16, &inner[..]);
    assert_eq!(reader.discard(20).unwrap(), 20);
    assert_eq!(reader.read_byte().unwrap(), Some(20));
}

#[test]
fn discard_stops_at_eof() {
    let inner: &[u8] = b"12345";
    let mut reader = BufReader::with_capacity(16, inner);
    assert_eq!(reader.discard(10).unwrap(), 5);
    assert_eq!(reader.read_byte().unwrap(), None);
}

#[test]
fn discard_propagates_errors() {
    let mut calls = VecDeque::new();
    calls.push_back(Ok(b"abc".to_vec()));
    calls.push_back(Err(io::Error::new(io::ErrorKind::BrokenPipe, "")));
    let mut reader = BufReader::with_capacity(16, Mock { calls: calls });
    assert_eq!(reader.discard(10).unwrap_err().kind(), io::ErrorKind::BrokenPipe);
}

#[test]
fn discard_buffered_leaves_stream_alone() {
    let mut calls = VecDeque::new();
    calls.push_back(Ok(b"abcdef".to_vec()));
    calls.push_back(Ok(b"ghi".to_vec()));
    let mut reader = BufReader::with_capacity(16, Mock { calls: calls });
    assert_eq!(reader.read_byte().unwrap(), Some(b'a'));
    assert_eq!(reader.buffered(), 5);
    assert_eq!(reader.discard_buffered(), 5);
    assert_eq!(reader.buffered(), 0);
    assert_eq!(reader.read_byte().unwrap(), Some(b'g'));
}

#[test]
fn read_line() {
    let in_buf: &[u8] = b"a\nb\nc";
    let mut reader = BufReader::with_capacity(2, in_buf);
    let mut s = String::new();
    reader.read_line(&mut s).unwrap();
    assert_eq!(s, "a\n");
    s.truncate(0);
    reader.read_line(&mut s).unwrap();
    assert_eq!(s, "b\n");
    s.truncate(0);
    reader.read_line(&mut s).unwrap();
    assert_eq!(s, "c");
    s.truncate(0);
    reader.read_line(&mut s).unwrap();
    assert_eq!(s, "");
}

#[test]
fn short_reads() {
    let inner = ShortReader{lengths: vec![0, 1, 2, 0, 1, 0]};
    let mut reader = BufReader::with_capacity(16, inner);
    let mut buf = [0, 0];
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
    assert_eq!(reader.read(&mut buf).unwrap(), 1);
    assert_eq!(reader.read(&mut buf).unwrap(), 2);
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
    assert_eq!(reader.read(&mut buf).unwrap(), 1);
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
}
