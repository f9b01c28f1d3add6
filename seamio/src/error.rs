//! Stream-level errors.
//!
//! One generic enum wraps the backing resource's own error type; everything
//! else in the taxonomy is a rule of the stream layer itself (closed streams,
//! mode checks, seek emulation giving up, mandatory flushes falling short).

use core::fmt;

use crate::mode::{Intent, ModeError};

/// Unified error type for stream operations.
#[derive(Debug)]
#[non_exhaustive]
pub enum StreamError<E> {
    /// Operation on a stream that has been closed.
    Closed,
    /// Operation not permitted by the stream's access mode, or not
    /// implemented by the backing resource.
    ModeViolation(Intent),
    /// Seek on a streaming-mode stream, or on a resource whose seek support
    /// could not be emulated.
    NotSeekable,
    /// Malformed access-mode descriptor, or a mode the backing resource
    /// cannot honor.
    InvalidMode(ModeError),
    /// Seek target before the start of the resource.
    InvalidSeek,
    /// A mandatory flush could not hand every buffered byte to the backing
    /// resource.
    FlushIncomplete {
        /// Number of bytes still unwritten after the flush attempt.
        unwritten: usize,
    },
    /// Error from the backing resource.
    Io(E),
}

impl<E> From<ModeError> for StreamError<E> {
    fn from(err: ModeError) -> Self {
        Self::InvalidMode(err)
    }
}

impl<E: fmt::Display> fmt::Display for StreamError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "stream has been closed"),
            Self::ModeViolation(intent) => write!(f, "stream not open for {}", intent),
            Self::NotSeekable => write!(f, "stream does not support seeking"),
            Self::InvalidMode(e) => write!(f, "invalid access mode: {}", e),
            Self::InvalidSeek => write!(f, "seek to a position before the start of the stream"),
            Self::FlushIncomplete { unwritten } => {
                write!(f, "could not flush write buffer ({} bytes unwritten)", unwritten)
            }
            Self::Io(e) => write!(f, "resource error: {}", e),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for StreamError<E> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::InvalidMode(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: fmt::Debug + fmt::Display> embedded_io::Error for StreamError<E> {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Self::Closed => embedded_io::ErrorKind::NotConnected,
            Self::ModeViolation(_) => embedded_io::ErrorKind::PermissionDenied,
            Self::NotSeekable => embedded_io::ErrorKind::Unsupported,
            Self::InvalidMode(_) | Self::InvalidSeek => embedded_io::ErrorKind::InvalidInput,
            Self::FlushIncomplete { .. } => embedded_io::ErrorKind::WriteZero,
            Self::Io(_) => embedded_io::ErrorKind::Other,
        }
    }
}
