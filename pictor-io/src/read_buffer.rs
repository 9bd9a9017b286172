//! Buffered sequential reading over an [`Io`] stream.
//!
//! File formats are parsed with many tiny reads (single bytes, 16-bit
//! fields, short blocks). [`ReadBuffer`] batches them: it pulls chunks from
//! the underlying stream into a [`BytesMut`] and serves typed reads from
//! there. Multi-byte integers are little-endian, which is what the image
//! container formats served by this framework use.
//!
//! The buffer owns bytes it has pulled ahead of the caller; seeking the
//! underlying stream while a `ReadBuffer` holds data desynchronizes the
//! two. Codecs read strictly forward after init, so in practice the buffer
//! lives for the whole decode.
//!
//! # Example
//!
//! ```
//! use pictor_io::{MemReadIo, ReadBuffer};
//!
//! let mut io = MemReadIo::new(vec![0x47, 0x34, 0x12]);
//! let mut buf = ReadBuffer::new();
//! assert_eq!(buf.read_u8(&mut io).unwrap(), 0x47);
//! assert_eq!(buf.read_u16_le(&mut io).unwrap(), 0x1234);
//! ```

use crate::Io;
use bytes::{Buf, BytesMut};
use pictor_common::{Error, Result};

const CHUNK: usize = 8192;

/// A little-endian buffered reader; see the module docs.
#[derive(Debug, Default)]
pub struct ReadBuffer {
    buffer: BytesMut,
}

impl ReadBuffer {
    /// An empty buffer; the first read pulls a chunk from the stream.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(CHUNK),
        }
    }

    /// Bytes currently buffered and not yet consumed.
    #[must_use]
    pub fn available(&self) -> usize {
        self.buffer.len()
    }

    /// Pulls from `io` until at least `n` bytes are buffered.
    fn ensure_bytes(&mut self, io: &mut dyn Io, n: usize) -> Result<()> {
        let mut chunk = [0u8; CHUNK];

        while self.buffer.len() < n {
            let got = match io.read(&mut chunk, 1, CHUNK) {
                Ok(0) | Err(Error::Eof) => return Err(Error::Eof),
                Ok(got) => got,
                Err(e) => return Err(e),
            };
            self.buffer.extend_from_slice(&chunk[..got]);
        }

        Ok(())
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self, io: &mut dyn Io) -> Result<u8> {
        self.ensure_bytes(io, 1)?;
        Ok(self.buffer.get_u8())
    }

    /// Reads a 16-bit little-endian integer.
    pub fn read_u16_le(&mut self, io: &mut dyn Io) -> Result<u16> {
        self.ensure_bytes(io, 2)?;
        Ok(self.buffer.get_u16_le())
    }

    /// Reads exactly `buf.len()` bytes.
    pub fn read_bytes(&mut self, io: &mut dyn Io, buf: &mut [u8]) -> Result<()> {
        self.ensure_bytes(io, buf.len())?;
        self.buffer.copy_to_slice(buf);
        Ok(())
    }

    /// Discards exactly `n` bytes.
    pub fn skip(&mut self, io: &mut dyn Io, n: usize) -> Result<()> {
        self.ensure_bytes(io, n)?;
        self.buffer.advance(n);
        Ok(())
    }
}
