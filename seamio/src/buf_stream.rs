//! Buffered stream adapter over a primitive backing resource.
//!
//! [`BufStream`] turns any [`RawStream`] implementation - however partial its
//! seek support, however approximate its reads and writes - into a stream
//! honoring the full [`Stream`] contract. It keeps three buffers to bridge
//! the difference between what the resource did and what the caller asked
//! for:
//!
//! - *read-ahead*: bytes the resource returned beyond what the caller has
//!   consumed;
//! - *write-behind*: bytes the caller handed over that the resource has not
//!   yet accepted;
//! - a *skip* buffer (materialized bytes, or a bare count) for the distance
//!   between the resource's actual cursor and the position the caller
//!   believes it is at after an imprecise or emulated seek.
//!
//! The position the caller observes is always
//! `actual - read_ahead + write_behind + skip`, and every operation starts
//! by reconciling whichever buffers stand in its way.

use alloc::vec::Vec;

use seamio_raw::{Capabilities, RawError, RawStream, SeekFrom};

use crate::error::StreamError;
use crate::mode::{AccessMode, Intent};
use crate::stream::{Lines, Stream};

/// Default chunk size for line scanning and skip materialization.
///
/// Larger values help when lines are long; configure per stream with
/// [`BufStream::with_chunk_size`].
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// A buffered, seekable, bidirectional stream over a [`RawStream`].
///
/// The access mode gates every public operation; the backing resource is
/// only required to implement what the mode promises, which is checked once
/// at construction. Reading and writing may be freely mixed on a read-write
/// stream - switching direction implicitly reseeks the resource to the
/// caller's apparent position so the opposing buffer is flushed or
/// discarded first.
///
/// Dropping the stream closes it (flushing buffered writes best-effort); use
/// [`close`](BufStream::close) directly when the flush outcome matters.
///
/// # Examples
///
/// ```
/// use seamio::{AccessMode, BufStream, IoStream};
/// use embedded_io_adapters::std::FromStd;
/// use std::io::Cursor;
///
/// let backing = IoStream::new(FromStd::new(Cursor::new(b"one\ntwo\n".to_vec())));
/// let mut stream = BufStream::new(backing, AccessMode::read_only()).unwrap();
/// assert_eq!(stream.read_line(None).unwrap(), b"one\n");
/// ```
pub struct BufStream<R: RawStream> {
    raw: R,
    mode: AccessMode,
    chunk_size: usize,
    closed: bool,
    /// Bytes fetched from the resource but not yet delivered. `Some(empty)`
    /// marks "reading" state even with nothing buffered.
    read_ahead: Option<Vec<u8>>,
    /// Bytes accepted from the caller but not yet taken by the resource.
    /// `Some(empty)` marks "writing" state.
    write_behind: Option<Vec<u8>>,
    /// Content between the resource's actual cursor and the apparent
    /// position, produced by an imprecise seek.
    skip_gap: Option<Vec<u8>>,
    /// Forward distance from the resource's cursor that has not been
    /// materialized at all (the resource was rewound to the start instead).
    skip_offset: u64,
}

impl<R: RawStream> core::fmt::Debug for BufStream<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BufStream")
            .field("mode", &self.mode)
            .field("chunk_size", &self.chunk_size)
            .field("closed", &self.closed)
            .field("read_ahead", &self.read_ahead)
            .field("write_behind", &self.write_behind)
            .field("skip_gap", &self.skip_gap)
            .field("skip_offset", &self.skip_offset)
            .finish_non_exhaustive()
    }
}

impl<R: RawStream> BufStream<R> {
    /// Wrap `raw` with the given access mode and the default chunk size.
    ///
    /// # Errors
    ///
    /// `InvalidMode` when the mode is internally inconsistent (read-write
    /// without seek) or requires capabilities the resource does not declare.
    pub fn new(raw: R, mode: AccessMode) -> Result<Self, StreamError<R::Error>> {
        Self::with_chunk_size(raw, mode, DEFAULT_CHUNK_SIZE)
    }

    /// Wrap `raw` with an explicit chunk size for line scanning.
    ///
    /// A `chunk_size` of zero is treated as one.
    pub fn with_chunk_size(
        raw: R,
        mode: AccessMode,
        chunk_size: usize,
    ) -> Result<Self, StreamError<R::Error>> {
        mode.validate()?;
        let missing = mode.required_capabilities() - raw.capabilities();
        if !missing.is_empty() {
            return Err(StreamError::InvalidMode(crate::mode::ModeError::Incompatible {
                missing,
            }));
        }
        Ok(Self {
            raw,
            mode,
            chunk_size: chunk_size.max(1),
            closed: false,
            read_ahead: None,
            write_behind: None,
            skip_gap: None,
            skip_offset: 0,
        })
    }

    /// The stream's access mode.
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Whether [`close`](BufStream::close) has completed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Read at most `max` bytes (`None` reads the remainder).
    ///
    /// Short only at the end of the resource. Surplus bytes the resource
    /// returned beyond `max` stay buffered for the next read.
    pub fn read(&mut self, max: Option<usize>) -> Result<Vec<u8>, StreamError<R::Error>> {
        self.ensure_open()?;
        self.guard(Intent::Read)?;
        if self.write_behind.is_some() {
            // switching from writing: put the resource where the caller
            // thinks it is
            self.seek(SeekFrom::Current(0))?;
        }
        self.materialize_skip()?;
        match max {
            Some(n) => self.read_bounded(n),
            None => self.read_to_end(),
        }
    }

    /// Read one line, up to and including the `\n` terminator, or at most
    /// `max` bytes.
    ///
    /// Bytes past the terminator that arrived in the same chunk are pushed
    /// back for the next read. An empty result means end of resource.
    pub fn read_line(&mut self, max: Option<usize>) -> Result<Vec<u8>, StreamError<R::Error>> {
        let mut line: Vec<u8> = Vec::new();
        loop {
            let chunk = self.read(Some(self.chunk_size))?;
            if chunk.is_empty() {
                return Ok(line);
            }
            if let Some(idx) = chunk.iter().position(|&b| b == b'\n') {
                let keep = idx + 1;
                if max.is_none_or(|m| line.len() + keep <= m) {
                    line.extend_from_slice(&chunk[..keep]);
                    self.unread(&chunk[keep..]);
                    return Ok(line);
                }
            }
            line.extend_from_slice(&chunk);
            if let Some(m) = max {
                if line.len() >= m {
                    let extra = line.split_off(m);
                    self.unread(&extra);
                    return Ok(line);
                }
            }
        }
    }

    /// Write the given bytes.
    ///
    /// Whatever the resource does not accept immediately is buffered and
    /// retried on the next write or flush. Writing through a pending seek
    /// gap first writes the gap's own content back, so the skipped region
    /// is not corrupted.
    pub fn write(&mut self, buf: &[u8]) -> Result<(), StreamError<R::Error>> {
        self.ensure_open()?;
        self.guard(Intent::Write)?;
        if self.read_ahead.is_some() {
            // switching from reading
            self.seek(SeekFrom::Current(0))?;
        }
        let mut out: Vec<u8>;
        if let Some(gap) = self.skip_gap.take() {
            out = gap;
            out.extend_from_slice(buf);
        } else if self.skip_offset > 0 {
            // the skipped region was never materialized; read it back and
            // rewind, then write through it. Requires read permission - a
            // write-only stream cannot recover the gap content.
            let span = self.skip_offset;
            self.skip_offset = 0;
            debug!("materializing {} skipped bytes before write", span);
            out = self.read(Some(span as usize))?;
            self.seek(SeekFrom::Start(0))?;
            out.extend_from_slice(buf);
        } else {
            out = buf.to_vec();
        }
        if let Some(pending) = self.write_behind.take() {
            if !pending.is_empty() {
                let mut joined = pending;
                joined.extend_from_slice(&out);
                out = joined;
            }
        }
        self.write_behind = Some(self.raw_write(&out, false)?.unwrap_or_default());
        Ok(())
    }

    /// Hand every buffered byte to the backing resource.
    ///
    /// # Errors
    ///
    /// `FlushIncomplete` when the resource still refuses part of the buffer
    /// under the mandatory-consumption flag; `Closed` after
    /// [`close`](BufStream::close).
    pub fn flush(&mut self) -> Result<(), StreamError<R::Error>> {
        self.ensure_open()?;
        if self.mode.permits(Intent::Write) && self.write_behind.is_some() {
            let mut buffered = self.skip_gap.take().unwrap_or_default();
            if let Some(pending) = self.write_behind.take() {
                buffered.extend_from_slice(&pending);
            }
            if !buffered.is_empty() {
                if let Some(leftover) = self.raw_write(&buffered, true)? {
                    if !leftover.is_empty() {
                        warn!("flush left {} bytes unwritten", leftover.len());
                        return Err(StreamError::FlushIncomplete {
                            unwritten: leftover.len(),
                        });
                    }
                }
            }
        }
        match self.raw.flush_raw() {
            Ok(()) | Err(RawError::Unsupported) => Ok(()),
            Err(RawError::Io(e)) => Err(StreamError::Io(e)),
        }
    }

    /// Flush buffered writes and close the stream.
    ///
    /// Further reads and writes fail with `Closed`; calling `close` again is
    /// a no-op.
    pub fn close(&mut self) -> Result<(), StreamError<R::Error>> {
        if self.closed {
            return Ok(());
        }
        self.flush()?;
        self.closed = true;
        match self.raw.close_raw() {
            Ok(()) | Err(RawError::Unsupported) => Ok(()),
            Err(RawError::Io(e)) => Err(StreamError::Io(e)),
        }
    }

    /// Move the cursor to `pos`.
    ///
    /// Buffered writes are flushed first; all buffers are then reconciled so
    /// the offset is interpreted against the caller's apparent position.
    /// When the resource rejects the seek, it is emulated: relative and
    /// end-relative seeks are re-expressed as absolute ones, and if even
    /// absolute seeks are unsupported the resource is rewound to the start
    /// with the remaining distance skipped lazily on the next read or write.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<(), StreamError<R::Error>> {
        self.ensure_open()?;
        if !self.mode.permits(Intent::Seek) {
            return Err(StreamError::NotSeekable);
        }
        if self.write_behind.as_ref().is_some_and(|b| !b.is_empty()) {
            self.flush()?;
        }
        let pos = self.normalize(pos);
        if let SeekFrom::Current(0) = pos {
            // already there; nothing to ask of the resource
            return Ok(());
        }
        match self.raw.seek_raw(pos) {
            Ok(gap) => {
                self.skip_gap = gap.filter(|g| !g.is_empty());
                Ok(())
            }
            Err(RawError::Unsupported) => self.emulate_seek(pos),
            Err(RawError::Io(e)) => Err(StreamError::Io(e)),
        }
    }

    /// The position the caller observes.
    ///
    /// Derived from the resource's actual cursor and the buffer state; no
    /// further resource access beyond its position query.
    pub fn tell(&mut self) -> Result<u64, StreamError<R::Error>> {
        self.ensure_open()?;
        let mut pos = self.tell_actual()?;
        if let Some(ahead) = &self.read_ahead {
            pos = pos.saturating_sub(ahead.len() as u64);
        }
        if let Some(behind) = &self.write_behind {
            pos += behind.len() as u64;
        }
        if let Some(gap) = &self.skip_gap {
            pos += gap.len() as u64;
        }
        pos += self.skip_offset;
        Ok(pos)
    }

    /// Total size of the backing resource, if it reports one.
    pub fn size(&mut self) -> Result<Option<u64>, StreamError<R::Error>> {
        match self.raw.size_raw() {
            Ok(size) => Ok(size),
            Err(RawError::Unsupported) => Ok(None),
            Err(RawError::Io(e)) => Err(StreamError::Io(e)),
        }
    }

    /// The operations permitted on this stream.
    pub fn capabilities(&self) -> Capabilities {
        self.mode.required_capabilities()
    }

    // ---- internals ----

    fn ensure_open(&self) -> Result<(), StreamError<R::Error>> {
        if self.closed {
            Err(StreamError::Closed)
        } else {
            Ok(())
        }
    }

    fn guard(&self, intent: Intent) -> Result<(), StreamError<R::Error>> {
        if self.mode.permits(intent) {
            Ok(())
        } else {
            Err(StreamError::ModeViolation(intent))
        }
    }

    fn raw_read(&mut self, hint: usize) -> Result<Option<Vec<u8>>, StreamError<R::Error>> {
        match self.raw.read_raw(hint) {
            Ok(chunk) => Ok(chunk),
            Err(RawError::Unsupported) => Err(StreamError::ModeViolation(Intent::Read)),
            Err(RawError::Io(e)) => Err(StreamError::Io(e)),
        }
    }

    fn raw_write(
        &mut self,
        buf: &[u8],
        flushing: bool,
    ) -> Result<Option<Vec<u8>>, StreamError<R::Error>> {
        match self.raw.write_raw(buf, flushing) {
            Ok(leftover) => Ok(leftover),
            Err(RawError::Unsupported) => Err(StreamError::ModeViolation(Intent::Write)),
            Err(RawError::Io(e)) => Err(StreamError::Io(e)),
        }
    }

    fn tell_actual(&mut self) -> Result<u64, StreamError<R::Error>> {
        match self.raw.tell_raw() {
            Ok(pos) => Ok(pos),
            Err(RawError::Unsupported) => Err(StreamError::NotSeekable),
            Err(RawError::Io(e)) => Err(StreamError::Io(e)),
        }
    }

    /// Push bytes back onto the front of the read-ahead buffer.
    fn unread(&mut self, bytes: &[u8]) {
        let ahead = self.read_ahead.take().unwrap_or_default();
        let mut restored = Vec::with_capacity(bytes.len() + ahead.len());
        restored.extend_from_slice(bytes);
        restored.extend_from_slice(&ahead);
        self.read_ahead = Some(restored);
    }

    /// Advance the resource's cursor over any pending skip region by reading
    /// and discarding it, so reads resume at the apparent position.
    fn materialize_skip(&mut self) -> Result<(), StreamError<R::Error>> {
        if let Some(gap) = self.skip_gap.take() {
            let mut remaining = gap.len();
            while remaining > 0 {
                let step = remaining.min(self.chunk_size);
                let discarded = self.read_bounded(step)?;
                if discarded.is_empty() {
                    break;
                }
                remaining -= discarded.len();
            }
        } else if self.skip_offset > 0 {
            let mut remaining = self.skip_offset;
            self.skip_offset = 0;
            trace!("discarding {} bytes to reach seek target", remaining);
            while remaining > 0 {
                let step = remaining.min(self.chunk_size as u64) as usize;
                let discarded = self.read_bounded(step)?;
                if discarded.is_empty() {
                    break;
                }
                remaining -= discarded.len() as u64;
            }
        }
        Ok(())
    }

    /// Accumulate exactly `n` bytes unless the resource ends first; surplus
    /// goes back into the read-ahead buffer.
    fn read_bounded(&mut self, n: usize) -> Result<Vec<u8>, StreamError<R::Error>> {
        let mut data = self.read_ahead.take().unwrap_or_default();
        while data.len() < n {
            match self.raw_read(n - data.len())? {
                Some(chunk) => data.extend_from_slice(&chunk),
                None => break,
            }
        }
        if data.len() > n {
            let surplus = data.split_off(n);
            self.read_ahead = Some(surplus);
        } else {
            self.read_ahead = Some(Vec::new());
        }
        Ok(data)
    }

    /// Drain the resource completely.
    fn read_to_end(&mut self) -> Result<Vec<u8>, StreamError<R::Error>> {
        let mut data = self.read_ahead.take().unwrap_or_default();
        self.read_ahead = Some(Vec::new());
        while let Some(chunk) = self.raw_read(0)? {
            data.extend_from_slice(&chunk);
        }
        Ok(data)
    }

    /// Re-express a relative offset against the resource's actual cursor and
    /// drop every read-side buffer, so the offset can be handed straight to
    /// the resource.
    fn normalize(&mut self, pos: SeekFrom) -> SeekFrom {
        let pos = match pos {
            SeekFrom::Current(mut offset) => {
                if let Some(ahead) = &self.read_ahead {
                    offset -= ahead.len() as i64;
                }
                if let Some(gap) = &self.skip_gap {
                    offset += gap.len() as i64;
                }
                offset += self.skip_offset as i64;
                SeekFrom::Current(offset)
            }
            other => other,
        };
        self.read_ahead = None;
        self.skip_gap = None;
        self.skip_offset = 0;
        pos
    }

    /// The resource rejected the seek outright; re-express it as an absolute
    /// position and retry, falling back to rewind-plus-lazy-skip.
    fn emulate_seek(&mut self, pos: SeekFrom) -> Result<(), StreamError<R::Error>> {
        let target = match pos {
            // an absolute seek already failed; don't ask again
            SeekFrom::Start(offset) => return self.rewind_with_skip(offset),
            SeekFrom::Current(offset) => {
                let actual = self.tell_actual()?;
                add_offset(actual, offset)?
            }
            SeekFrom::End(offset) => {
                let size = match self.size()? {
                    Some(size) => size,
                    None => {
                        // no cheap size: exhaust the stream to find the end
                        debug!("emulating end-relative seek by exhausting the stream");
                        while !self.read_line(None)?.is_empty() {}
                        self.tell()?
                    }
                };
                add_offset(size, offset)?
            }
        };
        match self.raw.seek_raw(SeekFrom::Start(target)) {
            Ok(gap) => {
                self.skip_gap = gap.filter(|g| !g.is_empty());
                Ok(())
            }
            Err(RawError::Unsupported) => self.rewind_with_skip(target),
            Err(RawError::Io(e)) => Err(StreamError::Io(e)),
        }
    }

    /// Last-resort seek: rewind to the start and remember how far ahead the
    /// caller wanted to be. The distance is made real on the next read
    /// (discard) or write (read back and overwrite).
    fn rewind_with_skip(&mut self, target: u64) -> Result<(), StreamError<R::Error>> {
        match self.raw.seek_raw(SeekFrom::Start(0)) {
            Ok(_) => {
                debug!("rewound resource, deferring skip of {} bytes", target);
                self.skip_offset = target;
                Ok(())
            }
            Err(RawError::Unsupported) => Err(StreamError::NotSeekable),
            Err(RawError::Io(e)) => Err(StreamError::Io(e)),
        }
    }
}

/// Apply a signed offset to an unsigned base position.
fn add_offset<E>(base: u64, offset: i64) -> Result<u64, StreamError<E>> {
    let target = base as i64 + offset;
    if target < 0 {
        return Err(StreamError::InvalidSeek);
    }
    Ok(target as u64)
}

impl<R: RawStream> Stream for BufStream<R> {
    type Error = StreamError<R::Error>;

    fn read(&mut self, max: Option<usize>) -> Result<Vec<u8>, Self::Error> {
        BufStream::read(self, max)
    }

    fn read_line(&mut self, max: Option<usize>) -> Result<Vec<u8>, Self::Error> {
        BufStream::read_line(self, max)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        BufStream::write(self, buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<(), Self::Error> {
        BufStream::seek(self, pos)
    }

    fn tell(&mut self) -> Result<u64, Self::Error> {
        BufStream::tell(self)
    }

    fn size(&mut self) -> Result<Option<u64>, Self::Error> {
        BufStream::size(self)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        BufStream::flush(self)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        BufStream::close(self)
    }

    fn capabilities(&self) -> Capabilities {
        BufStream::capabilities(self)
    }
}

impl<R: RawStream> BufStream<R> {
    /// Lazy iterator over the remaining lines; see [`Stream::lines`].
    pub fn lines(&mut self) -> Lines<'_, Self> {
        Stream::lines(self)
    }
}

impl<R: RawStream> Drop for BufStream<R> {
    fn drop(&mut self) {
        if !self.closed && self.close().is_err() {
            warn!("stream dropped with data that could not be flushed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    /// Fully capable in-memory resource.
    struct MemResource {
        data: Vec<u8>,
        pos: usize,
    }

    impl MemResource {
        fn new(content: &[u8]) -> Self {
            Self {
                data: content.to_vec(),
                pos: 0,
            }
        }
    }

    impl RawStream for MemResource {
        type Error = Infallible;

        fn capabilities(&self) -> Capabilities {
            Capabilities::all()
        }

        fn read_raw(&mut self, hint: usize) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
            if self.pos >= self.data.len() {
                return Ok(None);
            }
            let want = if hint == 0 { self.data.len() } else { hint };
            let end = (self.pos + want).min(self.data.len());
            let chunk = self.data[self.pos..end].to_vec();
            self.pos = end;
            Ok(Some(chunk))
        }

        fn write_raw(
            &mut self,
            buf: &[u8],
            _flushing: bool,
        ) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
            let end = self.pos + buf.len();
            if end > self.data.len() {
                self.data.resize(end, 0);
            }
            self.data[self.pos..end].copy_from_slice(buf);
            self.pos = end;
            Ok(None)
        }

        fn seek_raw(&mut self, pos: SeekFrom) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
            let target = match pos {
                SeekFrom::Start(n) => n as i64,
                SeekFrom::Current(n) => self.pos as i64 + n,
                SeekFrom::End(n) => self.data.len() as i64 + n,
            };
            self.pos = target.max(0) as usize;
            Ok(None)
        }

        fn tell_raw(&mut self) -> Result<u64, RawError<Self::Error>> {
            Ok(self.pos as u64)
        }
    }

    const CONTENT: &[u8] = b"Once upon a time, in a galaxy far away,\nGuido van Rossum was a space alien.";

    fn reader(content: &[u8]) -> BufStream<MemResource> {
        BufStream::new(MemResource::new(content), AccessMode::read_only()).unwrap()
    }

    fn writer(content: &[u8]) -> BufStream<MemResource> {
        BufStream::new(MemResource::new(content), AccessMode::read_write()).unwrap()
    }

    #[test]
    fn read_all() {
        let mut f = reader(CONTENT);
        assert_eq!(f.read(None).unwrap(), CONTENT);
    }

    #[test]
    fn read_sized() {
        let mut f = reader(CONTENT);
        assert_eq!(f.read(Some(5)).unwrap(), &CONTENT[..5]);
        assert_eq!(f.read(Some(7)).unwrap(), &CONTENT[5..12]);
        assert_eq!(f.tell().unwrap(), 12);
    }

    #[test]
    fn eof_is_idempotent() {
        let mut f = reader(CONTENT);
        f.read(None).unwrap();
        assert!(f.read(None).unwrap().is_empty());
        assert!(f.read(Some(10)).unwrap().is_empty());
    }

    #[test]
    fn read_line_keeps_terminator() {
        let mut f = reader(CONTENT);
        let first = f.read_line(None).unwrap();
        assert_eq!(first, b"Once upon a time, in a galaxy far away,\n");
        let second = f.read_line(None).unwrap();
        assert_eq!(second, b"Guido van Rossum was a space alien.");
        assert!(f.read_line(None).unwrap().is_empty());
    }

    #[test]
    fn read_line_honors_max() {
        let mut f = reader(b"abcdef\nrest");
        assert_eq!(f.read_line(Some(4)).unwrap(), b"abcd");
        assert_eq!(f.read_line(None).unwrap(), b"ef\n");
        assert_eq!(f.read_line(None).unwrap(), b"rest");
    }

    #[test]
    fn lines_reconstruct_content() {
        let mut f = reader(CONTENT);
        let lines: Vec<Vec<u8>> = f.lines().map(|l| l.unwrap()).collect();
        let total: Vec<u8> = lines.concat();
        assert_eq!(total, CONTENT);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn small_chunk_size_reads_the_same_bytes() {
        let mut f =
            BufStream::with_chunk_size(MemResource::new(CONTENT), AccessMode::read_only(), 3)
                .unwrap();
        let mut total = Vec::new();
        loop {
            let piece = f.read(Some(2)).unwrap();
            if piece.is_empty() {
                break;
            }
            total.extend_from_slice(&piece);
        }
        assert_eq!(total, CONTENT);
    }

    #[test]
    fn write_then_read_continues_past_it() {
        let mut f = writer(CONTENT);
        f.write(b"hello").unwrap();
        assert_eq!(f.read(None).unwrap(), &CONTENT[5..]);
    }

    #[test]
    fn read_write_read_interleave() {
        let mut f = writer(CONTENT);
        assert_eq!(f.read(Some(5)).unwrap(), &CONTENT[..5]);
        f.write(b"hello").unwrap();
        assert_eq!(f.read(Some(5)).unwrap(), &CONTENT[10..15]);
    }

    #[test]
    fn seek_and_tell_agree() {
        let mut f = writer(CONTENT);
        assert_eq!(f.tell().unwrap(), 0);
        f.seek(SeekFrom::Start(7)).unwrap();
        assert_eq!(f.tell().unwrap(), 7);
        assert_eq!(f.read(None).unwrap(), &CONTENT[7..]);
        f.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(f.tell().unwrap(), 0);
    }

    #[test]
    fn relative_and_end_seeks() {
        let mut f = writer(CONTENT);
        f.seek(SeekFrom::Current(7)).unwrap();
        assert_eq!(f.tell().unwrap(), 7);
        f.seek(SeekFrom::Current(7)).unwrap();
        assert_eq!(f.tell().unwrap(), 14);
        f.seek(SeekFrom::Current(-5)).unwrap();
        assert_eq!(f.tell().unwrap(), 9);
        f.seek(SeekFrom::End(-7)).unwrap();
        assert_eq!(f.tell().unwrap(), CONTENT.len() as u64 - 7);
    }

    #[test]
    fn write_seek_read_round_trip() {
        let mut f = writer(b"");
        f.write(b"first ").unwrap();
        f.write(b"second").unwrap();
        f.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(f.read(None).unwrap(), b"first second");
    }

    #[test]
    fn overwrite_after_partial_read() {
        let mut f = writer(CONTENT);
        assert_eq!(f.read(Some(5)).unwrap(), &CONTENT[..5]);
        f.write(b"hello").unwrap();
        f.seek(SeekFrom::Start(0)).unwrap();
        let mut expected = CONTENT[..5].to_vec();
        expected.extend_from_slice(b"hello");
        assert_eq!(f.read(Some(10)).unwrap(), expected);
    }

    #[test]
    fn streaming_mode_rejects_seek() {
        let mut f =
            BufStream::new(MemResource::new(CONTENT), AccessMode::streaming_read()).unwrap();
        assert!(matches!(
            f.seek(SeekFrom::Start(0)),
            Err(StreamError::NotSeekable)
        ));
        // reading still works
        assert_eq!(f.read(Some(4)).unwrap(), &CONTENT[..4]);
    }

    #[test]
    fn mode_violations() {
        let mut f = reader(CONTENT);
        assert!(matches!(
            f.write(b"nope"),
            Err(StreamError::ModeViolation(Intent::Write))
        ));
        let mut f = BufStream::new(MemResource::new(b""), AccessMode::write_only()).unwrap();
        assert!(matches!(
            f.read(None),
            Err(StreamError::ModeViolation(Intent::Read))
        ));
    }

    #[test]
    fn closed_stream_rejects_everything() {
        let mut f = writer(CONTENT);
        f.close().unwrap();
        f.close().unwrap(); // idempotent
        assert!(matches!(f.read(None), Err(StreamError::Closed)));
        assert!(matches!(f.write(b"x"), Err(StreamError::Closed)));
        assert!(matches!(f.flush(), Err(StreamError::Closed)));
        assert!(matches!(f.seek(SeekFrom::Start(0)), Err(StreamError::Closed)));
    }

    #[test]
    fn negative_target_is_invalid() {
        // resource without native Current support forces emulation, where
        // the absolute target is computed and range-checked
        struct StartOnly(MemResource);
        impl RawStream for StartOnly {
            type Error = Infallible;
            fn capabilities(&self) -> Capabilities {
                Capabilities::all()
            }
            fn read_raw(&mut self, h: usize) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
                self.0.read_raw(h)
            }
            fn seek_raw(&mut self, pos: SeekFrom) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
                match pos {
                    SeekFrom::Start(_) => self.0.seek_raw(pos),
                    _ => Err(RawError::Unsupported),
                }
            }
            fn tell_raw(&mut self) -> Result<u64, RawError<Self::Error>> {
                self.0.tell_raw()
            }
        }
        let mut f =
            BufStream::new(StartOnly(MemResource::new(CONTENT)), AccessMode::read_only()).unwrap();
        assert!(matches!(
            f.seek(SeekFrom::Current(-1)),
            Err(StreamError::InvalidSeek)
        ));
    }

    #[test]
    fn incompatible_mode_is_rejected_up_front() {
        struct ReadOnlyRes(MemResource);
        impl RawStream for ReadOnlyRes {
            type Error = Infallible;
            fn capabilities(&self) -> Capabilities {
                Capabilities::READ
            }
            fn read_raw(&mut self, h: usize) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
                self.0.read_raw(h)
            }
        }
        let err = BufStream::new(ReadOnlyRes(MemResource::new(b"x")), AccessMode::read_only())
            .unwrap_err();
        assert!(matches!(err, StreamError::InvalidMode(_)));
        // the streaming mode drops the seek requirement
        assert!(
            BufStream::new(ReadOnlyRes(MemResource::new(b"x")), AccessMode::streaming_read())
                .is_ok()
        );
    }
}
