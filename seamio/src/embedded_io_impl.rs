//! Bridges to the `embedded_io` ecosystem.
//!
//! Two directions: [`BufStream`] implements the `embedded_io` traits so it
//! can be handed to code written against them, and [`IoStream`] lifts any
//! `embedded_io::{Read, Write, Seek}` value into a [`RawStream`] backing
//! resource. With the `embedded-io-adapters` crate this covers `std::io`
//! types as well (files, cursors, sockets).

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use seamio_raw::{Capabilities, RawError, RawStream, SeekFrom};

use crate::buf_stream::BufStream;
use crate::error::StreamError;

fn seek_from_io(pos: embedded_io::SeekFrom) -> SeekFrom {
    match pos {
        embedded_io::SeekFrom::Start(n) => SeekFrom::Start(n),
        embedded_io::SeekFrom::Current(n) => SeekFrom::Current(n),
        embedded_io::SeekFrom::End(n) => SeekFrom::End(n),
    }
}

fn seek_to_io(pos: SeekFrom) -> embedded_io::SeekFrom {
    match pos {
        SeekFrom::Start(n) => embedded_io::SeekFrom::Start(n),
        SeekFrom::Current(n) => embedded_io::SeekFrom::Current(n),
        SeekFrom::End(n) => embedded_io::SeekFrom::End(n),
    }
}

impl<R: RawStream> embedded_io::ErrorType for BufStream<R>
where
    R::Error: fmt::Debug + fmt::Display,
{
    type Error = StreamError<R::Error>;
}

impl<R: RawStream> embedded_io::Read for BufStream<R>
where
    R::Error: fmt::Debug + fmt::Display,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let data = BufStream::read(self, Some(buf.len()))?;
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }
}

impl<R: RawStream> embedded_io::Write for BufStream<R>
where
    R::Error: fmt::Debug + fmt::Display,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        BufStream::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        BufStream::flush(self)
    }
}

impl<R: RawStream> embedded_io::Seek for BufStream<R>
where
    R::Error: fmt::Debug + fmt::Display,
{
    fn seek(&mut self, pos: embedded_io::SeekFrom) -> Result<u64, Self::Error> {
        BufStream::seek(self, seek_from_io(pos))?;
        BufStream::tell(self)
    }
}

/// Read size used when the caller expresses no preference.
const IO_CHUNK: usize = 4096;

/// Backing resource over any `embedded_io` stream.
///
/// The wrapped stream must implement all three of `Read`, `Write` and
/// `Seek`; restrict what callers may do with it through the
/// [`AccessMode`](crate::AccessMode) of the wrapping
/// [`BufStream`](crate::BufStream) instead. Partially capable resources are
/// better served by implementing [`RawStream`] directly.
///
/// # Examples
///
/// ```
/// use seamio::{AccessMode, BufStream, IoStream};
/// use embedded_io_adapters::std::FromStd;
/// use std::io::Cursor;
///
/// let raw = IoStream::new(FromStd::new(Cursor::new(Vec::new())));
/// let mut out = BufStream::new(raw, AccessMode::write_only()).unwrap();
/// out.write(b"payload").unwrap();
/// out.close().unwrap();
/// ```
pub struct IoStream<T> {
    inner: T,
}

impl<T> IoStream<T> {
    /// Wrap the given stream.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Get a reference to the inner stream.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consume the wrapper and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> RawStream for IoStream<T>
where
    T: embedded_io::Read + embedded_io::Write + embedded_io::Seek,
{
    type Error = T::Error;

    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    fn read_raw(&mut self, size_hint: usize) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
        let want = if size_hint == 0 { IO_CHUNK } else { size_hint };
        let mut buf = vec![0u8; want];
        let n = self.inner.read(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf))
    }

    fn write_raw(
        &mut self,
        buf: &[u8],
        flushing: bool,
    ) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
        if flushing {
            let mut rest = buf;
            while !rest.is_empty() {
                match self.inner.write(rest)? {
                    0 => break,
                    n => rest = &rest[n..],
                }
            }
            self.inner.flush()?;
            return Ok(if rest.is_empty() {
                None
            } else {
                Some(rest.to_vec())
            });
        }
        let n = self.inner.write(buf)?;
        Ok(if n == buf.len() {
            None
        } else {
            Some(buf[n..].to_vec())
        })
    }

    fn seek_raw(&mut self, pos: SeekFrom) -> Result<Option<Vec<u8>>, RawError<Self::Error>> {
        self.inner.seek(seek_to_io(pos))?;
        Ok(None)
    }

    fn tell_raw(&mut self) -> Result<u64, RawError<Self::Error>> {
        Ok(self.inner.seek(embedded_io::SeekFrom::Current(0))?)
    }

    fn size_raw(&mut self) -> Result<Option<u64>, RawError<Self::Error>> {
        let saved = self.inner.seek(embedded_io::SeekFrom::Current(0))?;
        let end = self.inner.seek(embedded_io::SeekFrom::End(0))?;
        self.inner.seek(embedded_io::SeekFrom::Start(saved))?;
        Ok(Some(end))
    }

    fn flush_raw(&mut self) -> Result<(), RawError<Self::Error>> {
        Ok(self.inner.flush()?)
    }

    fn close_raw(&mut self) -> Result<(), RawError<Self::Error>> {
        Ok(self.inner.flush()?)
    }
}
