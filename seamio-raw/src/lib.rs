//! Primitive backing-resource traits for seamio.
//!
//! This crate defines the minimal contract a backing resource (file handle,
//! socket, in-memory buffer, composite of other streams, ...) implements so
//! that `seamio` can synthesize the full buffered, seekable stream interface
//! on top of it. A resource implements as much of [`RawStream`] as it can and
//! reports what it implements through [`RawStream::capabilities`]; everything
//! it leaves out defaults to [`RawError::Unsupported`], which the higher
//! layer either rejects up front or works around (seek emulation).
//!
//! The contract is deliberately loose: reads are *bounded but approximate*
//! (a resource may return more or fewer bytes than hinted), writes are
//! *best-effort* (unconsumed bytes are handed back), and seeks may be
//! *imprecise* (a resource may land short of the target and return the bytes
//! in between). `seamio`'s buffering reconciles all of that.
//!
//! Resources depend only on this crate, mirroring the usual split between an
//! interface crate and the machinery consuming it.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

use bitflags::bitflags;

bitflags! {
    /// Runtime tag describing which primitive operations a resource (or a
    /// stream built on one) actually supports.
    ///
    /// Used to validate an access mode against a resource at construction
    /// time, and by callers that need to check an arbitrary stream-like
    /// value before depending on it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        /// The resource can produce bytes ([`RawStream::read_raw`]).
        const READ = 1 << 0;
        /// The resource can accept bytes ([`RawStream::write_raw`]).
        const WRITE = 1 << 1;
        /// The resource can reposition and report its cursor
        /// ([`RawStream::seek_raw`] / [`RawStream::tell_raw`]).
        const SEEK = 1 << 2;
    }
}

/// Seek origin for [`RawStream::seek_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SeekFrom {
    /// Offset from the start of the resource.
    Start(u64),
    /// Offset relative to the current position.
    Current(i64),
    /// Offset from the end of the resource.
    End(i64),
}

/// Failure of a primitive operation.
///
/// `Unsupported` is a signal, not a terminal error: the consuming layer
/// catches it and either emulates the operation (seek) or reports the
/// resource as incapable (read/write/tell). `Io` carries the resource's own
/// error and always propagates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawError<E> {
    /// The resource does not implement this operation (or this particular
    /// seek origin).
    Unsupported,
    /// The resource failed while performing the operation.
    Io(E),
}

impl<E> From<E> for RawError<E> {
    fn from(err: E) -> Self {
        RawError::Io(err)
    }
}

impl<E: fmt::Display> fmt::Display for RawError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => write!(f, "operation not supported by resource"),
            Self::Io(e) => write!(f, "resource error: {}", e),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for RawError<E> {}

/// The primitive interface a backing resource implements.
///
/// Every method except [`capabilities`](Self::capabilities) has a default
/// implementation returning [`RawError::Unsupported`]; a resource overrides
/// the operations it can perform and declares them in its capability tag.
/// The consuming layer never calls an operation the resource did not declare,
/// except `seek_raw`, where `Unsupported` triggers emulation.
///
/// # Examples
///
/// A read-only resource serving from a slice:
///
/// ```
/// use seamio_raw::{Capabilities, RawError, RawStream};
///
/// struct Fixed<'a> {
///     data: &'a [u8],
///     pos: usize,
/// }
///
/// impl RawStream for Fixed<'_> {
///     type Error = core::convert::Infallible;
///
///     fn capabilities(&self) -> Capabilities {
///         Capabilities::READ
///     }
///
///     fn read_raw(&mut self, size_hint: usize) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
///         if self.pos == self.data.len() {
///             return Ok(None); // exhausted, and will stay exhausted
///         }
///         let want = if size_hint == 0 { self.data.len() } else { size_hint };
///         let end = (self.pos + want).min(self.data.len());
///         let chunk = self.data[self.pos..end].to_vec();
///         self.pos = end;
///         Ok(Some(chunk))
///     }
/// }
/// ```
pub trait RawStream {
    /// Error type produced by the resource itself.
    type Error;

    /// Which primitive operations this resource implements.
    fn capabilities(&self) -> Capabilities;

    /// Read approximately `size_hint` bytes.
    ///
    /// `size_hint` of 0 means "no preference" - the resource may return
    /// everything it has left. The resource may return more or fewer bytes
    /// than hinted, including an empty chunk when no data is available right
    /// now. Only `Ok(None)` means the resource is exhausted, and once
    /// returned, every subsequent call must keep returning `Ok(None)`.
    fn read_raw(&mut self, size_hint: usize) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
        let _ = size_hint;
        Err(RawError::Unsupported)
    }

    /// Write as much of `buf` as possible, returning the unwritten remainder
    /// (`None` when everything was consumed).
    ///
    /// When `flushing` is true the caller is emptying its write buffer and
    /// expects full consumption; a non-empty remainder under that flag is
    /// treated as a fatal flush failure by the caller.
    fn write_raw(
        &mut self,
        buf: &[u8],
        flushing: bool,
    ) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
        let _ = (buf, flushing);
        Err(RawError::Unsupported)
    }

    /// Reposition the resource's cursor, approximately.
    ///
    /// A resource that cannot land exactly on the target must stop at a
    /// convenient *earlier* position and return the bytes between where it
    /// landed and the target; the caller accounts for them. Returning
    /// `Err(RawError::Unsupported)` for a particular origin asks the caller
    /// to emulate the seek. At minimum, `SeekFrom::Start(0)` should be
    /// honored by any resource declaring [`Capabilities::SEEK`].
    fn seek_raw(&mut self, pos: SeekFrom) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
        let _ = pos;
        Err(RawError::Unsupported)
    }

    /// Report the actual position of the resource's own cursor.
    ///
    /// Due to buffering in the layer above, this generally differs from the
    /// position the end caller observes.
    fn tell_raw(&mut self) -> Result<u64, RawError<Self::Error>> {
        Err(RawError::Unsupported)
    }

    /// Total size of the resource in bytes, if cheaply knowable.
    fn size_raw(&mut self) -> Result<Option<u64>, RawError<Self::Error>> {
        Ok(None)
    }

    /// Flush state held by the resource itself.
    ///
    /// Composite resources propagate this to their constituents; simple
    /// resources rarely need it.
    fn flush_raw(&mut self) -> Result<(), RawError<Self::Error>> {
        Ok(())
    }

    /// Release state held by the resource itself.
    ///
    /// Called exactly once by the owning stream when it closes.
    fn close_raw(&mut self) -> Result<(), RawError<Self::Error>> {
        Ok(())
    }
}
