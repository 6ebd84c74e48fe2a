//! Parsing of the decimal length field that opens every frame.

use std::io;

use crate::buf_reader::BufReader;
use crate::error::{Error, Result};

/// Separates the length field from the payload.
pub const LEN_DELIMITER: u8 = b':';

/// Terminates every payload.
pub const FRAME_DELIMITER: u8 = b',';

/// Returns the number of decimal digits needed to write `max_frame_size`.
///
/// This bounds how many digits the length field of an acceptable frame can
/// hold.
///
/// ```
/// assert_eq!(netstring_io::max_len_digits(4096), 4);
/// assert_eq!(netstring_io::max_len_digits(99999), 5);
/// ```
pub fn max_len_digits(max_frame_size: usize) -> usize {
    let mut n = max_frame_size;
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// Incremental length-field parser, fed one byte at a time.
#[derive(Debug, Clone)]
pub(crate) struct LengthParser {
    max_digits: usize,
    digits: usize,
    value: Option<usize>,
}

impl LengthParser {
    pub fn new(max_digits: usize) -> LengthParser {
        LengthParser {
            max_digits: max_digits,
            digits: 0,
            value: Some(0),
        }
    }

    /// Returns `true` if no byte has been fed since the last reset.
    pub fn is_empty(&self) -> bool {
        self.digits == 0
    }

    /// Feeds one byte. Returns the parsed length once `:` is seen, after
    /// which the parser is ready for the next field.
    pub fn push(&mut self, b: u8) -> Result<Option<usize>> {
        match b {
            b'0'..=b'9' => {
                if self.digits == self.max_digits {
                    self.reset();
                    return Err(Error::LengthTooLong { max_digits: self.max_digits });
                }
                self.digits += 1;
                let digit = (b - b'0') as usize;
                self.value = self.value
                    .and_then(|v| v.checked_mul(10))
                    .and_then(|v| v.checked_add(digit));
                Ok(None)
            }
            LEN_DELIMITER => {
                let res = if self.digits == 0 {
                    Err(Error::EmptyLength)
                } else {
                    self.value.ok_or(Error::LengthOverflow)
                };
                self.reset();
                res.map(Some)
            }
            _ => {
                self.reset();
                Err(Error::UnexpectedChar(b))
            }
        }
    }

    pub fn reset(&mut self) {
        self.digits = 0;
        self.value = Some(0);
    }
}

/// Scans `br` byte by byte until a complete length field has been read.
///
/// Blocks until the field is complete or the stream fails. End of stream
/// before the first byte yields `Error::Closed`; end of stream inside the
/// field is an `UnexpectedEof` I/O error. Any other I/O error inside the
/// field loses the digits read so far and yields `Error::Desync`.
pub(crate) fn read_len<R: io::Read>(br: &mut BufReader<R>, max_digits: usize) -> Result<usize> {
    let mut parser = LengthParser::new(max_digits);
    let mut seen = false;
    loop {
        let b = match br.read_byte() {
            Ok(Some(b)) => b,
            Ok(None) if !seen => return Err(Error::Closed),
            Ok(None) => {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof,
                                          "stream ended inside length field").into())
            }
            Err(e) if !seen => return Err(e.into()),
            Err(e) => {
                return Err(Error::desync(format!("read failed inside length field: {}", e)))
            }
        };
        seen = true;
        if let Some(len) = parser.push(b)? {
            trace!("length field parsed; len={}", len);
            return Ok(len);
        }
    }
}
