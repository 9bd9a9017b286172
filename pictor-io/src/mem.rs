//! Memory-backed streams.
//!
//! [`MemReadIo`] is an immutable view: its accessible length equals its
//! capacity and never moves. [`MemWriteIo`] carries a fixed capacity and an
//! accessible-length watermark that grows as bytes are written or seeked
//! over; writing past capacity fails with `Eof` (unlike files, memory does
//! not grow).

use crate::{Io, IoKind, SeekFrom};
use bytes::Bytes;
use pictor_common::{Error, Result};

/// Position bookkeeping shared by both memory backings.
#[derive(Debug, Clone, Copy)]
struct BufferInfo {
    capacity: u64,
    accessible_length: u64,
    pos: u64,
}

impl BufferInfo {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(offset) => i128::from(self.pos) + i128::from(offset),
            SeekFrom::End(offset) => i128::from(self.accessible_length) + i128::from(offset),
        };

        if target < 0 {
            return Err(Error::IoSeek(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "seek before start of stream",
            )));
        }

        let mut new_pos = target as u64;

        // Clamp to capacity; a forward seek within capacity extends the
        // accessible length up to the new position.
        if new_pos > self.capacity {
            new_pos = self.capacity;
            self.accessible_length = self.capacity;
        } else if new_pos > self.accessible_length {
            self.accessible_length = new_pos;
        }

        self.pos = new_pos;
        Ok(new_pos)
    }
}

/// A read-only stream over an in-memory buffer.
///
/// # Example
///
/// ```
/// use pictor_io::{Io, MemReadIo, SeekFrom};
///
/// let mut io = MemReadIo::new(vec![10, 20, 30]);
/// io.seek(SeekFrom::End(-1)).unwrap();
/// let mut last = [0u8; 1];
/// io.read(&mut last, 1, 1).unwrap();
/// assert_eq!(last[0], 30);
/// assert!(io.eof().unwrap());
/// ```
#[derive(Debug)]
pub struct MemReadIo {
    info: BufferInfo,
    buffer: Bytes,
    closed: bool,
}

impl MemReadIo {
    /// Wraps a buffer for reading; the whole buffer is accessible.
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        let buffer = buffer.into();
        let len = buffer.len() as u64;

        tracing::debug!("opening memory buffer of {len} bytes for reading");

        Self {
            info: BufferInfo {
                capacity: len,
                accessible_length: len,
                pos: 0,
            },
            buffer,
            closed: false,
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::InvalidArgument("stream is closed".into()));
        }
        Ok(())
    }
}

impl Io for MemReadIo {
    fn kind(&self) -> IoKind {
        IoKind::Memory
    }

    fn read(&mut self, buf: &mut [u8], object_size: usize, object_count: usize) -> Result<usize> {
        self.check_open()?;

        if object_size == 0 || object_count == 0 {
            return Ok(0);
        }

        let info = &mut self.info;
        if info.pos >= info.accessible_length {
            return Err(Error::Eof);
        }

        let mut read = 0;
        while read < object_count
            && info.pos + object_size as u64 <= info.accessible_length
            && (read + 1) * object_size <= buf.len()
        {
            let start = info.pos as usize;
            buf[read * object_size..(read + 1) * object_size]
                .copy_from_slice(&self.buffer[start..start + object_size]);
            info.pos += object_size as u64;
            read += 1;
        }

        Ok(read)
    }

    fn write(&mut self, _buf: &[u8], _object_size: usize, _object_count: usize) -> Result<usize> {
        Err(Error::IoWrite(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "memory stream opened for reading",
        )))
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.check_open()?;
        self.info.seek(pos)
    }

    fn tell(&mut self) -> Result<u64> {
        self.check_open()?;
        Ok(self.info.pos)
    }

    fn eof(&mut self) -> Result<bool> {
        self.check_open()?;
        Ok(self.info.pos >= self.info.accessible_length)
    }

    fn flush(&mut self) -> Result<()> {
        self.check_open()
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// A write stream over a fixed-capacity in-memory buffer.
///
/// The capacity never grows. The accessible length starts at zero and
/// rises to the highest byte written or seeked over; [`MemWriteIo::into_inner`]
/// returns exactly that prefix.
#[derive(Debug)]
pub struct MemWriteIo {
    info: BufferInfo,
    buffer: Vec<u8>,
    closed: bool,
}

impl MemWriteIo {
    /// An empty buffer of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        tracing::debug!("opening memory buffer of {capacity} bytes for writing");

        Self {
            info: BufferInfo {
                capacity: capacity as u64,
                accessible_length: 0,
                pos: 0,
            },
            buffer: vec![0u8; capacity],
            closed: false,
        }
    }

    /// The accessible length: the number of meaningful bytes in the buffer.
    #[must_use]
    pub fn accessible_length(&self) -> u64 {
        self.info.accessible_length
    }

    /// Consumes the stream, returning the written prefix of the buffer.
    #[must_use]
    pub fn into_inner(mut self) -> Vec<u8> {
        self.buffer.truncate(self.info.accessible_length as usize);
        self.buffer
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::InvalidArgument("stream is closed".into()));
        }
        Ok(())
    }
}

impl Io for MemWriteIo {
    fn kind(&self) -> IoKind {
        IoKind::Memory
    }

    fn read(&mut self, buf: &mut [u8], object_size: usize, object_count: usize) -> Result<usize> {
        self.check_open()?;

        if object_size == 0 || object_count == 0 {
            return Ok(0);
        }

        let info = &mut self.info;
        if info.pos >= info.accessible_length {
            return Err(Error::Eof);
        }

        let mut read = 0;
        while read < object_count
            && info.pos + object_size as u64 <= info.accessible_length
            && (read + 1) * object_size <= buf.len()
        {
            let start = info.pos as usize;
            buf[read * object_size..(read + 1) * object_size]
                .copy_from_slice(&self.buffer[start..start + object_size]);
            info.pos += object_size as u64;
            read += 1;
        }

        Ok(read)
    }

    fn write(&mut self, buf: &[u8], object_size: usize, object_count: usize) -> Result<usize> {
        self.check_open()?;

        if object_size == 0 || object_count == 0 {
            return Ok(0);
        }

        let info = &mut self.info;
        if info.pos >= info.capacity {
            return Err(Error::Eof);
        }

        let mut written = 0;
        while written < object_count
            && info.pos + object_size as u64 <= info.capacity
            && (written + 1) * object_size <= buf.len()
        {
            let start = info.pos as usize;
            self.buffer[start..start + object_size]
                .copy_from_slice(&buf[written * object_size..(written + 1) * object_size]);
            info.pos += object_size as u64;

            if info.pos > info.accessible_length {
                info.accessible_length = info.pos;
            }

            written += 1;
        }

        Ok(written)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.check_open()?;
        self.info.seek(pos)
    }

    fn tell(&mut self) -> Result<u64> {
        self.check_open()?;
        Ok(self.info.pos)
    }

    fn eof(&mut self) -> Result<bool> {
        self.check_open()?;
        Ok(self.info.pos >= self.info.accessible_length)
    }

    fn flush(&mut self) -> Result<()> {
        self.check_open()
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
