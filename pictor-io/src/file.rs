//! File-backed streams.

use crate::{Io, IoKind, SeekFrom};
use pictor_common::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, Write};
use std::path::Path;

/// A stream over an OS file.
///
/// Opened in one of three explicit modes: read, write-truncate, or
/// read-write. Unlike memory streams, a file grows on writes past its end.
///
/// # Example
///
/// ```no_run
/// use pictor_io::{FileIo, Io};
///
/// let mut io = FileIo::open("photo.gif")?;
/// let mut magic = [0u8; 6];
/// io.read_exact(&mut magic)?;
/// # Ok::<(), pictor_common::Error>(())
/// ```
#[derive(Debug)]
pub struct FileIo {
    // None once closed; close() is idempotent.
    file: Option<File>,
}

impl FileIo {
    /// Opens an existing file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("opening {} for reading", path.display());

        let file = File::open(path).map_err(Error::IoOpen)?;
        Ok(Self { file: Some(file) })
    }

    /// Creates (or truncates) a file for writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("opening {} for writing", path.display());

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(Error::IoOpen)?;
        Ok(Self { file: Some(file) })
    }

    /// Opens an existing file for reading and writing.
    pub fn open_rw(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("opening {} for updating", path.display());

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(Error::IoOpen)?;
        Ok(Self { file: Some(file) })
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| Error::InvalidArgument("stream is closed".into()))
    }
}

impl Io for FileIo {
    fn kind(&self) -> IoKind {
        IoKind::File
    }

    fn read(&mut self, buf: &mut [u8], object_size: usize, object_count: usize) -> Result<usize> {
        if object_size == 0 || object_count == 0 {
            return Ok(0);
        }

        let want = object_size
            .checked_mul(object_count)
            .filter(|&w| w <= buf.len())
            .ok_or_else(|| Error::InvalidArgument("buffer shorter than requested objects".into()))?;

        let file = self.file_mut()?;

        let mut filled = 0;
        while filled < want {
            match file.read(&mut buf[filled..want]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::IoRead(e)),
            }
        }

        if filled == 0 {
            return Err(Error::Eof);
        }

        // Whole objects only: return a trailing partial object to the
        // stream so the next read starts on an object boundary.
        let remainder = filled % object_size;
        if remainder != 0 {
            file.seek(SeekFrom::Current(-(remainder as i64)))
                .map_err(Error::IoSeek)?;
        }

        Ok(filled / object_size)
    }

    fn write(&mut self, buf: &[u8], object_size: usize, object_count: usize) -> Result<usize> {
        if object_size == 0 || object_count == 0 {
            return Ok(0);
        }

        let want = object_size
            .checked_mul(object_count)
            .filter(|&w| w <= buf.len())
            .ok_or_else(|| Error::InvalidArgument("buffer shorter than supplied objects".into()))?;

        self.file_mut()?
            .write_all(&buf[..want])
            .map_err(Error::IoWrite)?;

        Ok(object_count)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.file_mut()?.seek(pos).map_err(Error::IoSeek)
    }

    fn tell(&mut self) -> Result<u64> {
        self.file_mut()?.stream_position().map_err(Error::IoSeek)
    }

    fn eof(&mut self) -> Result<bool> {
        let file = self.file_mut()?;
        let pos = file.stream_position().map_err(Error::IoSeek)?;
        let len = file.metadata().map_err(Error::IoRead)?.len();
        Ok(pos >= len)
    }

    fn flush(&mut self) -> Result<()> {
        self.file_mut()?.flush().map_err(Error::IoWrite)
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            // Best effort: the handle is dropped either way.
            if let Err(e) = file.flush() {
                tracing::warn!("flush on close failed: {e}");
            }
        }
        Ok(())
    }
}

impl Drop for FileIo {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_read_whole_objects_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&[1, 2, 3, 4, 5]).unwrap();

        let mut io = FileIo::open(tmp.path()).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(io.read(&mut buf, 2, 3).unwrap(), 2);
        assert_eq!(buf, [1, 2, 3, 4]);

        // The dangling fifth byte is not half an object; position stays on
        // the object boundary.
        assert_eq!(io.tell().unwrap(), 4);
        assert_eq!(io.read(&mut buf, 2, 1).unwrap(), 0);
        assert_eq!(io.tell().unwrap(), 4);
    }

    #[test]
    fn test_eof_after_consuming_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&[9]).unwrap();

        let mut io = FileIo::open(tmp.path()).unwrap();
        let mut buf = [0u8; 1];
        assert!(!io.eof().unwrap());
        io.read(&mut buf, 1, 1).unwrap();
        assert!(io.eof().unwrap());
        assert!(matches!(io.read(&mut buf, 1, 1), Err(Error::Eof)));
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");

        let mut io = FileIo::create(&path).unwrap();
        assert_eq!(io.write(b"pictor", 1, 6).unwrap(), 6);
        io.seek(SeekFrom::Start(0)).unwrap();

        let mut buf = [0u8; 6];
        io.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"pictor");

        io.close().unwrap();
        io.close().unwrap();
        assert!(io.tell().is_err());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let err = FileIo::open("/definitely/not/here.gif").unwrap_err();
        assert_eq!(err.code(), pictor_common::ErrorCode::IoOpen);
    }
}
