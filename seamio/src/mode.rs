//! Access modes - which operations a stream permits.
//!
//! A mode is parsed from the usual short descriptor grammar: a base intent
//! (`r`, `w`, `a`), optionally widened to both directions with `+`, and
//! optionally stripped of seek support with `-`. The `-` qualifier exists for
//! resources where seeking would have to be emulated at prohibitive cost
//! (e.g. a decompression pipeline): a streaming-mode stream rejects `seek`
//! outright instead of silently re-reading from the start.

use core::fmt;
use core::str::FromStr;

use bitflags::bitflags;

use seamio_raw::Capabilities;

bitflags! {
    /// Permitted operations for a stream.
    ///
    /// Reading and writing on the same stream requires seek support: the
    /// internal read-ahead and write-behind buffers can only be reconciled
    /// by repositioning the backing resource when the caller switches
    /// direction. [`AccessMode::validate`] rejects the combination without
    /// [`AccessMode::SEEK`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessMode: u8 {
        /// Reading is permitted.
        const READ = 1 << 0;
        /// Writing is permitted.
        const WRITE = 1 << 1;
        /// Writing is permitted, at the end of the resource.
        const APPEND = 1 << 2;
        /// Seeking is permitted.
        const SEEK = 1 << 3;
    }
}

/// Operation category checked against an [`AccessMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Intent {
    /// Consuming bytes from the stream.
    Read,
    /// Producing bytes into the stream.
    Write,
    /// Repositioning the stream cursor.
    Seek,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("reading"),
            Self::Write => f.write_str("writing"),
            Self::Seek => f.write_str("seeking"),
        }
    }
}

/// Rejected access-mode descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeError {
    /// A character outside the `r`/`w`/`a`/`+`/`-` vocabulary.
    UnknownToken(char),
    /// The descriptor names no base intent at all.
    MissingIntent,
    /// Read and write were both requested without seek support; the stream
    /// cannot reconcile its buffers on direction switches without it.
    UnseekableReadWrite,
    /// The mode requires capabilities the backing resource does not provide.
    Incompatible {
        /// Capabilities the mode needs but the resource lacks.
        missing: Capabilities,
    },
}

impl fmt::Display for ModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownToken(c) => write!(f, "unexpected mode character: '{}'", c),
            Self::MissingIntent => write!(f, "mode names no intent (expected 'r', 'w' or 'a')"),
            Self::UnseekableReadWrite => {
                write!(f, "read-write mode requires seek support")
            }
            Self::Incompatible { missing } => {
                write!(f, "resource lacks required capabilities: {:?}", missing)
            }
        }
    }
}

impl core::error::Error for ModeError {}

impl AccessMode {
    /// Read-only, seekable (`"r"`).
    pub const fn read_only() -> Self {
        Self::READ.union(Self::SEEK)
    }

    /// Read-write, seekable (`"r+"`).
    pub const fn read_write() -> Self {
        Self::READ.union(Self::WRITE).union(Self::SEEK)
    }

    /// Write-only, seekable (`"w"`).
    pub const fn write_only() -> Self {
        Self::WRITE.union(Self::SEEK)
    }

    /// Append-only, seekable (`"a"`).
    pub const fn append() -> Self {
        Self::APPEND.union(Self::SEEK)
    }

    /// Read-only with seeking forbidden (`"r-"`).
    pub const fn streaming_read() -> Self {
        Self::READ
    }

    /// Write-only with seeking forbidden (`"w-"`).
    pub const fn streaming_write() -> Self {
        Self::WRITE
    }

    /// Parse a mode descriptor.
    ///
    /// Tokens may repeat and appear in any order; the result is validated
    /// with [`AccessMode::validate`]. Truncation-on-open semantics of `w`
    /// belong to whatever opens the backing resource, not to the stream
    /// layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use seamio::AccessMode;
    ///
    /// let mode = AccessMode::parse("a+").unwrap();
    /// assert!(mode.contains(AccessMode::APPEND | AccessMode::READ));
    /// assert!(AccessMode::parse("r+-").is_err());
    /// assert!(AccessMode::parse("x").is_err());
    /// ```
    pub fn parse(descriptor: &str) -> Result<Self, ModeError> {
        let mut mode = Self::SEEK;
        for c in descriptor.chars() {
            match c {
                'r' => mode |= Self::READ,
                'w' => mode |= Self::WRITE,
                'a' => mode |= Self::APPEND,
                '+' => mode |= Self::READ | Self::WRITE,
                '-' => mode &= !Self::SEEK,
                other => return Err(ModeError::UnknownToken(other)),
            }
        }
        mode.validate()?;
        Ok(mode)
    }

    /// Check the internal consistency of a mode (useful for modes assembled
    /// from raw bits rather than parsed).
    pub fn validate(self) -> Result<(), ModeError> {
        if !self.intersects(Self::READ | Self::WRITE | Self::APPEND) {
            return Err(ModeError::MissingIntent);
        }
        let writes = self.intersects(Self::WRITE | Self::APPEND);
        if self.contains(Self::READ) && writes && !self.contains(Self::SEEK) {
            return Err(ModeError::UnseekableReadWrite);
        }
        Ok(())
    }

    /// Whether an operation with the given intent is permitted.
    ///
    /// Write intent is satisfied by either plain or append writing.
    pub fn permits(self, intent: Intent) -> bool {
        match intent {
            Intent::Read => self.contains(Self::READ),
            Intent::Write => self.intersects(Self::WRITE | Self::APPEND),
            Intent::Seek => self.contains(Self::SEEK),
        }
    }

    /// The capabilities a backing resource must provide to honor this mode.
    pub fn required_capabilities(self) -> Capabilities {
        let mut caps = Capabilities::empty();
        if self.permits(Intent::Read) {
            caps |= Capabilities::READ;
        }
        if self.permits(Intent::Write) {
            caps |= Capabilities::WRITE;
        }
        if self.permits(Intent::Seek) {
            caps |= Capabilities::SEEK;
        }
        caps
    }
}

impl FromStr for AccessMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contains(Self::APPEND) {
            f.write_str("a")?;
            if self.contains(Self::READ) {
                f.write_str("+")?;
            }
        } else if self.contains(Self::READ) && self.intersects(Self::WRITE) {
            f.write_str("r+")?;
        } else if self.contains(Self::READ) {
            f.write_str("r")?;
        } else if self.contains(Self::WRITE) {
            f.write_str("w")?;
        }
        if !self.contains(Self::SEEK) {
            f.write_str("-")?;
        }
        Ok(())
    }
}
