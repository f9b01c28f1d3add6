//! Buffered, seekable, bidirectional streams over partially-capable backing
//! resources.
//!
//! A backing resource only needs to implement up to four primitive
//! operations - bounded read, best-effort write, best-effort seek and
//! position query (the [`RawStream`] trait from `seamio-raw`) - and
//! [`BufStream`] synthesizes the rest of the stream contract on top:
//! exact-size reads, line-oriented reads with a lazy [`lines`](Stream::lines)
//! iterator, write buffering with mandatory flush, and seek/tell that stay
//! correct even when the resource cannot seek precisely, or at all.
//!
//! # Architecture
//!
//! - [`AccessMode`] - which operations a stream permits, parsed from the
//!   usual `r`/`w`/`a`/`+`/`-` descriptor grammar. Streaming modes (`r-`,
//!   `w-`) forbid seeking where emulating it would be prohibitively
//!   expensive.
//! - [`BufStream`] - the adapter. Keeps read-ahead, write-behind and skip
//!   buffers, reconciles them on direction switches, and emulates rejected
//!   seeks in up to three tiers (native, absolute retry, rewind with lazy
//!   skip).
//! - [`Join`] - an ordered sequence of sub-streams acting as a single
//!   backing resource: fixed-size segments with a growable tail. Wrap it
//!   with [`join`] to use it as one full stream.
//! - [`IoStream`] - lifts any `embedded_io::{Read, Write, Seek}` value into
//!   a backing resource; [`BufStream`] implements the `embedded_io` traits
//!   in turn.
//!
//! # Quick start
//!
//! ```
//! use seamio::{AccessMode, BufStream, IoStream, SeekFrom};
//! use embedded_io_adapters::std::FromStd;
//! use std::io::Cursor;
//!
//! let raw = IoStream::new(FromStd::new(Cursor::new(b"alpha\nbeta\n".to_vec())));
//! let mut stream = BufStream::new(raw, AccessMode::read_write()).unwrap();
//!
//! assert_eq!(stream.read_line(None).unwrap(), b"alpha\n");
//! stream.seek(SeekFrom::Start(0)).unwrap();
//! stream.write(b"delta").unwrap();
//! stream.seek(SeekFrom::Start(0)).unwrap();
//! assert_eq!(stream.read(None).unwrap(), b"delta\nbeta\n");
//! stream.close().unwrap();
//! ```
//!
//! # Features
//!
//! - `std`: std interop for the re-exported `embedded_io`
//! - `log`: route internal diagnostics through the `log` crate
//! - `defmt`: route internal diagnostics through `defmt`

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

extern crate alloc;

#[macro_use]
mod log;

mod buf_stream;
mod embedded_io_impl;
mod error;
mod join;
mod mode;
mod stream;

pub use buf_stream::{BufStream, DEFAULT_CHUNK_SIZE};
pub use embedded_io_impl::IoStream;
pub use error::StreamError;
pub use join::{Join, join};
pub use mode::{AccessMode, Intent, ModeError};
pub use stream::{Lines, Stream, satisfies};

// Re-export the primitive interface so backing resources and their
// consumers can depend on this crate alone.
pub use seamio_raw::{Capabilities, RawError, RawStream, SeekFrom};

// Re-export embedded_io for convenience
pub use embedded_io;
