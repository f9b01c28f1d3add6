//! The full stream contract.
//!
//! [`Stream`] is the rich interface synthesized by
//! [`BufStream`](crate::BufStream) and consumed by
//! [`Join`](crate::Join) for its sub-streams. Anything implementing it can
//! be composed, concatenated, and handed to code that only needs "a stream".

use alloc::vec::Vec;

use seamio_raw::{Capabilities, SeekFrom};

/// A buffered, byte-oriented stream.
///
/// Not every implementor permits every operation; the permitted subset is
/// reported by [`capabilities`](Stream::capabilities) and checked with
/// [`satisfies`]. Forbidden or unsupported operations fail with the
/// implementor's error type rather than panicking.
pub trait Stream {
    /// Error type for all stream operations.
    type Error;

    /// Read at most `max` bytes, or the remainder of the stream when `max`
    /// is `None`.
    ///
    /// Returns an empty vector once the stream is exhausted; repeated reads
    /// at the end keep returning empty without error.
    fn read(&mut self, max: Option<usize>) -> Result<Vec<u8>, Self::Error>;

    /// Read one line (up to and including the `\n` terminator), or at most
    /// `max` bytes.
    ///
    /// The final line of a stream without a trailing terminator is returned
    /// as-is; an empty result means the stream is exhausted.
    fn read_line(&mut self, max: Option<usize>) -> Result<Vec<u8>, Self::Error>;

    /// Write the given bytes.
    ///
    /// Bytes not yet accepted by the backing resource are buffered; only
    /// [`flush`](Stream::flush) insists on full delivery.
    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Move the stream cursor.
    fn seek(&mut self, pos: SeekFrom) -> Result<(), Self::Error>;

    /// The position the caller observes, adjusted for all internal
    /// buffering.
    fn tell(&mut self) -> Result<u64, Self::Error>;

    /// Total size in bytes, if cheaply knowable.
    fn size(&mut self) -> Result<Option<u64>, Self::Error> {
        Ok(None)
    }

    /// Deliver every buffered byte to the backing resource.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Flush and release the stream. Idempotent.
    fn close(&mut self) -> Result<(), Self::Error>;

    /// The operations this stream supports.
    fn capabilities(&self) -> Capabilities;

    /// Lazy iterator over the remaining lines of the stream.
    ///
    /// The sequence is forward-only and fused: it ends permanently when a
    /// read returns empty (or fails), and can only be restarted by seeking
    /// the stream back and calling `lines` again.
    fn lines(&mut self) -> Lines<'_, Self>
    where
        Self: Sized,
    {
        Lines {
            stream: self,
            done: false,
        }
    }

    /// Collect every remaining line of the stream.
    fn read_lines(&mut self) -> Result<Vec<Vec<u8>>, Self::Error>
    where
        Self: Sized,
    {
        self.lines().collect()
    }

    /// Write a sequence of lines.
    ///
    /// No terminators are inserted; callers supply their own, as with
    /// [`write`](Stream::write).
    fn write_lines<'a, I>(&mut self, lines: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = &'a [u8]>,
        Self: Sized,
    {
        for line in lines {
            self.write(line)?;
        }
        Ok(())
    }
}

/// Whether a stream supports every capability in `required`.
///
/// Callers handed an arbitrary stream-like value use this to validate it
/// before depending on, say, writability:
///
/// ```
/// use seamio::{satisfies, Capabilities, Stream};
///
/// fn copy_lines(src: &mut impl Stream<Error = impl core::fmt::Debug>) {
///     assert!(satisfies(src, Capabilities::READ | Capabilities::SEEK));
///     // ...
/// }
/// ```
pub fn satisfies<S: Stream + ?Sized>(stream: &S, required: Capabilities) -> bool {
    stream.capabilities().contains(required)
}

/// Iterator over the lines of a stream, created by [`Stream::lines`].
pub struct Lines<'a, S> {
    stream: &'a mut S,
    done: bool,
}

impl<S: Stream> Iterator for Lines<'_, S> {
    type Item = Result<Vec<u8>, S::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.stream.read_line(None) {
            Ok(line) if line.is_empty() => {
                self.done = true;
                None
            }
            Ok(line) => Some(Ok(line)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
