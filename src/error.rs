//! Error types for netstring framing.

use std::io;

use thiserror::Error;

/// Errors produced while reading or writing netstring frames.
///
/// Most variants describe a single bad frame; the connection may keep being
/// used after them. [`Error::Desync`] is different: it means the frame
/// boundary is lost and the connection has to be torn down. Check for it with
/// [`Error::is_fatal`].
#[derive(Debug, Error)]
pub enum Error {
    /// A byte other than an ASCII digit or `:` appeared in the length field.
    ///
    /// A length field with too many digits is reported as
    /// [`Error::LengthTooLong`] instead. Use [`Error::is_unexpected_char`] to
    /// catch both.
    ///
    /// The stream position is undefined afterwards; the caller should close
    /// the connection.
    #[error("netstring: unexpected character {0:#04x} in length field")]
    UnexpectedChar(u8),

    /// The length field ran past the configured digit count without a `:`.
    #[error("netstring: unexpected character, length field longer than {max_digits} digits")]
    LengthTooLong {
        /// Maximum number of digits accepted.
        max_digits: usize,
    },

    /// The length field held no digits before `:`.
    #[error("netstring: empty length field")]
    EmptyLength,

    /// The length field does not fit in a `usize`.
    #[error("netstring: length field overflows")]
    LengthOverflow,

    /// The declared payload length exceeds the configured maximum.
    #[error("netstring: frame too large ({len} > {max})")]
    FrameTooLarge {
        /// Declared payload length.
        len: usize,
        /// Configured maximum frame size.
        max: usize,
    },

    /// The payload was not followed by `,`.
    #[error("netstring: bad frame delimiter {0:#04x}")]
    BadDelimiter(u8),

    /// The transport accepted fewer bytes than the encoded frame holds.
    #[error("netstring: bad frame write ({written} of {expected} bytes)")]
    BadWrite {
        /// Bytes the transport reported as written.
        written: usize,
        /// Length of the encoded frame.
        expected: usize,
    },

    /// The stream ended cleanly on a frame boundary.
    #[error("netstring: connection closed")]
    Closed,

    /// I/O error from the underlying transport.
    #[error("netstring: I/O error: {0}")]
    Io(#[from] io::Error),

    /// Resynchronization failed and frame boundaries can no longer be
    /// trusted. The connection must be closed.
    #[error("netstring: framing lost, connection unusable: {reason}")]
    Desync {
        /// What went wrong while resynchronizing.
        reason: String,
    },
}

impl Error {
    /// Returns `true` if the connection can no longer be used for framing.
    pub fn is_fatal(&self) -> bool {
        match *self {
            Error::Desync { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` for a malformed or over-long length field.
    pub fn is_unexpected_char(&self) -> bool {
        match *self {
            Error::UnexpectedChar(_) | Error::LengthTooLong { .. } => true,
            _ => false,
        }
    }

    pub(crate) fn desync<S: Into<String>>(reason: S) -> Error {
        Error::Desync { reason: reason.into() }
    }
}

/// Result type alias using the netstring [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;
    use std::io;

    #[test]
    fn only_desync_is_fatal() {
        assert!(Error::desync("discard failed").is_fatal());
        assert!(!Error::BadDelimiter(b'x').is_fatal());
        assert!(!Error::FrameTooLarge { len: 10, max: 5 }.is_fatal());
        assert!(!Error::Io(io::Error::new(io::ErrorKind::Other, "")).is_fatal());
    }

    #[test]
    fn over_long_length_is_unexpected_char() {
        assert!(Error::LengthTooLong { max_digits: 4 }.is_unexpected_char());
        assert!(Error::UnexpectedChar(b'a').is_unexpected_char());
        assert!(!Error::EmptyLength.is_unexpected_char());
    }
}
