//! Concatenation of several streams into one.
//!
//! [`Join`] implements the primitive [`RawStream`] interface over an ordered
//! sequence of sub-streams, so a list of streams can back a
//! [`BufStream`](crate::BufStream) - or anything else consuming the
//! primitive interface - as if it were one contiguous resource.
//!
//! Reading walks the sequence front to back. Writing spreads data across the
//! sub-streams by their current sizes: every sub-stream except the last
//! keeps its size, and only the last one grows as data is appended past the
//! joint capacity. Seeks and tells are computed from the individual cursor
//! positions.

use alloc::vec::Vec;

use seamio_raw::{Capabilities, RawError, RawStream, SeekFrom};

use crate::buf_stream::BufStream;
use crate::error::StreamError;
use crate::mode::AccessMode;
use crate::stream::Stream;

/// An ordered sequence of sub-streams acting as one backing resource.
///
/// The sub-streams are owned for the lifetime of the join; its
/// [`flush_raw`](RawStream::flush_raw) and [`close_raw`](RawStream::close_raw)
/// hooks propagate to every one of them, so closing the wrapping stream
/// closes the whole ensemble.
///
/// Use [`join`] to get a ready-made full stream instead of wiring the
/// wrapper yourself.
pub struct Join<S> {
    subs: Vec<S>,
    current: usize,
}

impl<S: Stream> Join<S> {
    /// Join the given streams in order.
    ///
    /// An empty sequence behaves as an empty, unwritable resource.
    pub fn new(subs: Vec<S>) -> Self {
        Self { subs, current: 0 }
    }

    /// Release the sub-streams.
    pub fn into_inner(self) -> Vec<S> {
        self.subs
    }

    /// Sum of the sub-stream positions up to and including the current one.
    fn position(&mut self) -> Result<u64, S::Error> {
        let mut total = 0;
        for sub in self.subs.iter_mut().take(self.current + 1) {
            total += sub.tell()?;
        }
        Ok(total)
    }

    /// Rewind across sub-stream boundaries until `offset` (non-positive)
    /// lands inside one, clamping at the start of the first.
    fn walk_back(&mut self, mut offset: i64) -> Result<(), S::Error> {
        let mut pos = self.subs[self.current].tell()?;
        while (pos as i64) < -offset {
            offset += pos as i64;
            self.subs[self.current].seek(SeekFrom::Start(0))?;
            if self.current == 0 {
                return Ok(());
            }
            self.current -= 1;
            pos = self.subs[self.current].tell()?;
        }
        if offset != 0 {
            self.subs[self.current].seek(SeekFrom::Current(offset))?;
        }
        Ok(())
    }

    /// Wind forward across sub-stream boundaries; any distance past the end
    /// of the final sub-stream is applied to it directly, since it is the
    /// one allowed to grow.
    fn wind_forward(&mut self, mut offset: i64) -> Result<(), S::Error> {
        offset += self.subs[self.current].tell()? as i64;
        self.subs[self.current].seek(SeekFrom::End(0))?;
        offset -= self.subs[self.current].tell()? as i64;
        while offset > 0 {
            if self.current + 1 >= self.subs.len() {
                self.subs[self.current].seek(SeekFrom::Current(offset))?;
                return Ok(());
            }
            self.current += 1;
            self.subs[self.current].seek(SeekFrom::End(0))?;
            offset -= self.subs[self.current].tell()? as i64;
        }
        if offset < 0 {
            self.walk_back(offset)?;
        }
        Ok(())
    }
}

impl<S: Stream> RawStream for Join<S> {
    type Error = S::Error;

    /// The intersection of the sub-streams' capabilities.
    fn capabilities(&self) -> Capabilities {
        self.subs
            .iter()
            .fold(Capabilities::all(), |caps, sub| caps & sub.capabilities())
    }

    fn read_raw(&mut self, size_hint: usize) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
        loop {
            let Some(sub) = self.subs.get_mut(self.current) else {
                return Ok(None);
            };
            let data = if size_hint == 0 {
                sub.read(None)?
            } else {
                sub.read(Some(size_hint))?
            };
            if !data.is_empty() {
                return Ok(Some(data));
            }
            if self.current + 1 >= self.subs.len() {
                return Ok(None);
            }
            trace!("sub-stream {} exhausted, advancing", self.current);
            self.current += 1;
        }
    }

    fn write_raw(
        &mut self,
        buf: &[u8],
        _flushing: bool,
    ) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
        if self.subs.is_empty() {
            return Ok(if buf.is_empty() {
                None
            } else {
                Some(buf.to_vec())
            });
        }
        let mut data = buf;
        loop {
            if self.current + 1 >= self.subs.len() {
                // the final sub-stream absorbs everything and may grow
                self.subs[self.current].write(data)?;
                return Ok(None);
            }
            let sub = &mut self.subs[self.current];
            let pos = sub.tell()?;
            let size = match sub.size()? {
                Some(size) => size,
                None => {
                    // probe by seeking to the end and back
                    sub.seek(SeekFrom::End(0))?;
                    let size = sub.tell()?;
                    sub.seek(SeekFrom::Start(pos))?;
                    size
                }
            };
            let room = size.saturating_sub(pos) as usize;
            if room >= data.len() {
                sub.write(data)?;
                return Ok(None);
            }
            if room > 0 {
                sub.write(&data[..room])?;
            }
            data = &data[room..];
            self.current += 1;
        }
    }

    fn seek_raw(&mut self, pos: SeekFrom) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
        if self.subs.is_empty() {
            return Ok(None);
        }
        let offset = match pos {
            SeekFrom::End(offset) => {
                for sub in self.subs[self.current..].iter_mut() {
                    sub.seek(SeekFrom::End(0))?;
                }
                self.current = self.subs.len() - 1;
                offset
            }
            SeekFrom::Start(offset) => {
                let here = self.position()? as i64;
                offset as i64 - here
            }
            SeekFrom::Current(offset) => offset,
        };
        if offset < 0 {
            self.walk_back(offset)?;
        } else if offset > 0 {
            self.wind_forward(offset)?;
        }
        Ok(None)
    }

    fn tell_raw(&mut self) -> Result<u64, RawError<Self::Error>> {
        Ok(self.position()?)
    }

    fn flush_raw(&mut self) -> Result<(), RawError<Self::Error>> {
        for sub in &mut self.subs {
            sub.flush()?;
        }
        Ok(())
    }

    fn close_raw(&mut self) -> Result<(), RawError<Self::Error>> {
        for sub in &mut self.subs {
            sub.close()?;
        }
        Ok(())
    }
}

/// Concatenate streams into one full stream.
///
/// Equivalent to wrapping [`Join::new`] in a [`BufStream`]; with an
/// appending mode the cursor starts at the overall end.
///
/// # Examples
///
/// ```
/// use seamio::{join, AccessMode, BufStream, IoStream, Stream};
/// use embedded_io_adapters::std::FromStd;
/// use std::io::Cursor;
///
/// let part = |bytes: &[u8]| {
///     BufStream::new(
///         IoStream::new(FromStd::new(Cursor::new(bytes.to_vec()))),
///         AccessMode::read_only(),
///     )
///     .unwrap()
/// };
/// let mut all = join(vec![part(b"ab"), part(b"cd")], AccessMode::read_only()).unwrap();
/// assert_eq!(all.read(None).unwrap(), b"abcd");
/// ```
pub fn join<S: Stream>(
    subs: Vec<S>,
    mode: AccessMode,
) -> Result<BufStream<Join<S>>, StreamError<S::Error>> {
    let mut stream = BufStream::new(Join::new(subs), mode)?;
    if mode.contains(AccessMode::APPEND) {
        stream.seek(SeekFrom::End(0))?;
    }
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreamError;
    use core::convert::Infallible;

    /// Minimal in-memory full stream for joining.
    struct MemStream {
        data: Vec<u8>,
        pos: usize,
    }

    impl MemStream {
        fn new(content: &[u8]) -> Self {
            Self {
                data: content.to_vec(),
                pos: 0,
            }
        }
    }

    impl Stream for MemStream {
        type Error = StreamError<Infallible>;

        fn read(&mut self, max: Option<usize>) -> Result<Vec<u8>, Self::Error> {
            let end = match max {
                Some(n) => (self.pos + n).min(self.data.len()),
                None => self.data.len(),
            };
            let out = self.data[self.pos..end].to_vec();
            self.pos = end;
            Ok(out)
        }

        fn read_line(&mut self, _max: Option<usize>) -> Result<Vec<u8>, Self::Error> {
            match self.data[self.pos..].iter().position(|&b| b == b'\n') {
                Some(idx) => self.read(Some(idx + 1)),
                None => self.read(None),
            }
        }

        fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
            let end = self.pos + buf.len();
            if end > self.data.len() {
                self.data.resize(end, 0);
            }
            self.data[self.pos..end].copy_from_slice(buf);
            self.pos = end;
            Ok(())
        }

        fn seek(&mut self, pos: SeekFrom) -> Result<(), Self::Error> {
            let target = match pos {
                SeekFrom::Start(n) => n as i64,
                SeekFrom::Current(n) => self.pos as i64 + n,
                SeekFrom::End(n) => self.data.len() as i64 + n,
            };
            if target < 0 {
                return Err(StreamError::InvalidSeek);
            }
            self.pos = target as usize;
            Ok(())
        }

        fn tell(&mut self) -> Result<u64, Self::Error> {
            Ok(self.pos as u64)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn close(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::all()
        }
    }

    const CONTENT: &[u8] = b"Once upon a time, in a galaxy far away,\nGuido van Rossum was a space alien.";

    fn three_way(content: &[u8]) -> BufStream<Join<MemStream>> {
        let subs = vec![
            MemStream::new(&content[..5]),
            MemStream::new(&content[5..8]),
            MemStream::new(&content[8..]),
        ];
        join(subs, AccessMode::read_write()).unwrap()
    }

    #[test]
    fn reads_across_boundaries() {
        let mut f = three_way(CONTENT);
        assert_eq!(f.read(None).unwrap(), CONTENT);
    }

    #[test]
    fn sized_reads_across_boundaries() {
        let mut f = three_way(CONTENT);
        assert_eq!(f.read(Some(5)).unwrap(), &CONTENT[..5]);
        assert_eq!(f.read(Some(7)).unwrap(), &CONTENT[5..12]);
        assert_eq!(f.tell().unwrap(), 12);
    }

    #[test]
    fn seek_and_tell_span_the_sequence() {
        let mut f = three_way(CONTENT);
        f.seek(SeekFrom::Start(7)).unwrap();
        assert_eq!(f.tell().unwrap(), 7);
        assert_eq!(f.read(None).unwrap(), &CONTENT[7..]);
        f.seek(SeekFrom::Start(2)).unwrap();
        assert_eq!(f.tell().unwrap(), 2);
        f.seek(SeekFrom::Current(4)).unwrap();
        assert_eq!(f.tell().unwrap(), 6);
        f.seek(SeekFrom::Current(-5)).unwrap();
        assert_eq!(f.tell().unwrap(), 1);
    }

    #[test]
    fn end_relative_seek_lands_in_the_middle() {
        let content = b"thirteen byte";
        let subs = vec![
            MemStream::new(&content[..5]),
            MemStream::new(&content[5..8]),
            MemStream::new(&content[8..]),
        ];
        let mut f = join(subs, AccessMode::read_only()).unwrap();
        f.seek(SeekFrom::End(-7)).unwrap();
        assert_eq!(f.tell().unwrap(), 6);
        assert_eq!(f.read(None).unwrap(), &content[6..]);
    }

    #[test]
    fn backward_seek_clamps_at_the_start() {
        let mut f = three_way(CONTENT);
        f.seek(SeekFrom::Start(10)).unwrap();
        f.seek(SeekFrom::Current(-100)).unwrap();
        assert_eq!(f.tell().unwrap(), 0);
        assert_eq!(f.read(Some(4)).unwrap(), &CONTENT[..4]);
    }

    #[test]
    fn write_preserves_segment_sizes() {
        let subs = vec![
            MemStream::new(b"aaaaa"),
            MemStream::new(b"bbb"),
            MemStream::new(b"ccccc"),
        ];
        let mut raw = Join::new(subs);
        let payload = vec![b'x'; 15]; // two past the joint capacity of 13
        assert_eq!(raw.write_raw(&payload, false).unwrap(), None);
        let subs = raw.into_inner();
        assert_eq!(subs[0].data.len(), 5);
        assert_eq!(subs[1].data.len(), 3);
        assert_eq!(subs[2].data.len(), 7); // only the tail grew
        let total: Vec<u8> = subs.iter().flat_map(|s| s.data.clone()).collect();
        assert_eq!(total, payload);
    }

    #[test]
    fn append_mode_starts_at_the_end() {
        let subs = vec![MemStream::new(b"ab"), MemStream::new(b"cd")];
        let mut f = join(subs, AccessMode::parse("a+").unwrap()).unwrap();
        assert_eq!(f.tell().unwrap(), 4);
        f.write(b"!").unwrap();
        f.seek(SeekFrom::Start(0)).unwrap();
        assert_eq!(f.read(None).unwrap(), b"abcd!");
    }

    #[test]
    fn empty_join_is_an_empty_resource() {
        let mut f = join(Vec::<MemStream>::new(), AccessMode::read_only()).unwrap();
        assert!(f.read(None).unwrap().is_empty());
        assert_eq!(f.tell().unwrap(), 0);
    }

    #[test]
    fn line_reads_cross_boundaries() {
        let mut f = three_way(CONTENT);
        let first = f.read_line(None).unwrap();
        assert_eq!(first, b"Once upon a time, in a galaxy far away,\n");
    }
}
