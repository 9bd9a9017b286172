//! Source-agnostic byte streams for image codecs.
//!
//! Codecs are written once against the [`Io`] trait; the caller chooses the
//! backing:
//! - [`FileIo`] wraps an OS file with explicit open modes
//! - [`MemReadIo`] is an immutable view over an in-memory buffer
//! - [`MemWriteIo`] writes into a fixed-capacity buffer
//!
//! # Whole-object transfer
//!
//! `read` and `write` transfer whole objects only (an object is
//! `object_size` bytes) and stop early at end of stream. [`pictor_common::Error::Eof`]
//! is returned only when zero objects transfer *and* the position is already
//! at or past the accessible length; a short-but-nonzero transfer is a
//! success.
//!
//! # Accessible length
//!
//! Write-capable memory streams distinguish a fixed *capacity* from an
//! *accessible length*: the watermark of the highest byte ever written or
//! seeked to. Seeking forward within capacity extends the accessible length
//! (so a codec can pre-allocate forward offsets); seeking past capacity
//! clamps to it. File streams simply grow.
//!
//! # Example
//!
//! ```
//! use pictor_io::{Io, MemReadIo};
//!
//! let mut io = MemReadIo::new(vec![1, 2, 3, 4]);
//! let mut buf = [0u8; 2];
//! assert_eq!(io.read(&mut buf, 2, 1).unwrap(), 1);
//! assert_eq!(buf, [1, 2]);
//! assert_eq!(io.tell().unwrap(), 2);
//! ```

pub mod file;
pub mod mem;
pub mod read_buffer;

pub use file::FileIo;
pub use mem::{MemReadIo, MemWriteIo};
pub use read_buffer::ReadBuffer;

use pictor_common::{Error, Result};

pub use std::io::SeekFrom;

/// Identifies the backing of a stream. Diagnostics and codec hints only;
/// no behavior may depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoKind {
    File,
    Memory,
}

impl std::fmt::Display for IoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// A seekable byte stream a codec can decode from or encode to.
///
/// # Contract
///
/// - `read`/`write` transfer whole objects only; see the module docs for
///   the exact EOF rule.
/// - `seek` with [`SeekFrom::End`] is relative to the accessible length,
///   not the capacity.
/// - `close` is idempotent and must be safe to call after a partial
///   failure; every other operation fails on a closed stream.
pub trait Io {
    /// The backing of this stream.
    fn kind(&self) -> IoKind;

    /// Reads up to `object_count` objects of `object_size` bytes into
    /// `buf`, returning how many whole objects were read.
    fn read(&mut self, buf: &mut [u8], object_size: usize, object_count: usize) -> Result<usize>;

    /// Writes up to `object_count` objects of `object_size` bytes from
    /// `buf`, returning how many whole objects were written.
    fn write(&mut self, buf: &[u8], object_size: usize, object_count: usize) -> Result<usize>;

    /// Repositions the stream, returning the new absolute position.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    /// The current absolute position.
    fn tell(&mut self) -> Result<u64>;

    /// Whether the position is at or past the accessible length.
    fn eof(&mut self) -> Result<bool>;

    /// Flushes buffered writes to the backing.
    fn flush(&mut self) -> Result<()>;

    /// Releases the backing. Idempotent.
    fn close(&mut self) -> Result<()>;

    /// Reads exactly `buf.len()` bytes or fails.
    ///
    /// Convenience over `read` with `object_size = 1`; a short read maps
    /// to `Eof`.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let len = buf.len();
        let mut filled = 0;

        while filled < len {
            match self.read(&mut buf[filled..], 1, len - filled) {
                Ok(0) | Err(Error::Eof) => return Err(Error::Eof),
                Ok(n) => filled += n,
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

// Sessions borrow or own their stream; both spellings satisfy the trait.

impl<I: Io + ?Sized> Io for &mut I {
    fn kind(&self) -> IoKind {
        (**self).kind()
    }

    fn read(&mut self, buf: &mut [u8], object_size: usize, object_count: usize) -> Result<usize> {
        (**self).read(buf, object_size, object_count)
    }

    fn write(&mut self, buf: &[u8], object_size: usize, object_count: usize) -> Result<usize> {
        (**self).write(buf, object_size, object_count)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        (**self).seek(pos)
    }

    fn tell(&mut self) -> Result<u64> {
        (**self).tell()
    }

    fn eof(&mut self) -> Result<bool> {
        (**self).eof()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<I: Io + ?Sized> Io for Box<I> {
    fn kind(&self) -> IoKind {
        (**self).kind()
    }

    fn read(&mut self, buf: &mut [u8], object_size: usize, object_count: usize) -> Result<usize> {
        (**self).read(buf, object_size, object_count)
    }

    fn write(&mut self, buf: &[u8], object_size: usize, object_count: usize) -> Result<usize> {
        (**self).write(buf, object_size, object_count)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        (**self).seek(pos)
    }

    fn tell(&mut self) -> Result<u64> {
        (**self).tell()
    }

    fn eof(&mut self) -> Result<bool> {
        (**self).eof()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
