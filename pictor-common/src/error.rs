//! Error types for the pictor framework.
//!
//! Every fallible operation in the framework returns [`Error`]. Each variant
//! maps to a stable integer [`ErrorCode`] so callers that need a wire- or
//! FFI-stable identity can rely on the code rather than the variant shape.
//!
//! [`Error::NoMoreFrames`] is a sentinel, not a failure: it terminates a
//! normal read loop when the stream has no further frames.

use crate::pixel_format::PixelFormat;
use std::io;
use thiserror::Error;

/// Convenience alias used across all pictor crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while probing, decoding, or encoding images.
#[derive(Debug, Error)]
pub enum Error {
    /// A required allocation failed.
    #[error("memory allocation failed")]
    MemoryAllocation,

    /// An argument was null, empty, or inconsistent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Opening the underlying stream failed.
    #[error("failed to open stream: {0}")]
    IoOpen(#[source] io::Error),

    /// Reading from the underlying stream failed.
    #[error("failed to read from stream: {0}")]
    IoRead(#[source] io::Error),

    /// Writing to the underlying stream failed.
    #[error("failed to write to stream: {0}")]
    IoWrite(#[source] io::Error),

    /// Seeking the underlying stream failed.
    #[error("failed to seek stream: {0}")]
    IoSeek(#[source] io::Error),

    /// The stream position is at or past the accessible length.
    #[error("end of stream")]
    Eof,

    /// The seek origin is not supported by this stream.
    #[error("unsupported seek whence")]
    UnsupportedSeekWhence,

    /// No codec claims the given extension, MIME type, or magic bytes.
    #[error("no suitable codec found")]
    NoSuitableCodec,

    /// The codec declares an entry-point layout this framework cannot bind.
    #[error("unsupported codec layout version {0}")]
    UnsupportedCodecLayout(u32),

    /// The requested pixel format is not supported by the codec.
    #[error("unsupported pixel format {0}")]
    UnsupportedPixelFormat(PixelFormat),

    /// The image requires a palette and none is present.
    #[error("missing palette")]
    MissingPalette,

    /// Frame dimensions are inconsistent with the image they belong to.
    #[error("incorrect image dimensions")]
    IncorrectImageDimensions,

    /// Sentinel: the stream has no further frames.
    #[error("no more frames")]
    NoMoreFrames,

    /// The format-specific decoder or encoder reported an error.
    #[error("underlying codec error: {0}")]
    UnderlyingCodec(String),

    /// An operation was called out of the init/seek/read/finish order.
    #[error("state error: {0}")]
    StateError(String),

    /// The codec does not implement this operation.
    #[error("not implemented")]
    NotImplemented,
}

/// Stable integer codes, one per [`Error`] variant plus `Ok`.
///
/// The numeric values are part of the public contract and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    Ok = 0,
    MemoryAllocation = 1,
    InvalidArgument = 2,
    IoOpen = 3,
    IoRead = 4,
    IoWrite = 5,
    IoSeek = 6,
    Eof = 7,
    UnsupportedSeekWhence = 8,
    NoSuitableCodec = 9,
    UnsupportedCodecLayout = 10,
    UnsupportedPixelFormat = 11,
    MissingPalette = 12,
    IncorrectImageDimensions = 13,
    NoMoreFrames = 14,
    UnderlyingCodec = 15,
    StateError = 16,
    NotImplemented = 17,
}

impl Error {
    /// Returns the stable code for this error.
    ///
    /// # Example
    ///
    /// ```
    /// use pictor_common::{Error, ErrorCode};
    ///
    /// assert_eq!(Error::NoMoreFrames.code(), ErrorCode::NoMoreFrames);
    /// assert_eq!(ErrorCode::NoMoreFrames as u32, 14);
    /// ```
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MemoryAllocation => ErrorCode::MemoryAllocation,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::IoOpen(_) => ErrorCode::IoOpen,
            Self::IoRead(_) => ErrorCode::IoRead,
            Self::IoWrite(_) => ErrorCode::IoWrite,
            Self::IoSeek(_) => ErrorCode::IoSeek,
            Self::Eof => ErrorCode::Eof,
            Self::UnsupportedSeekWhence => ErrorCode::UnsupportedSeekWhence,
            Self::NoSuitableCodec => ErrorCode::NoSuitableCodec,
            Self::UnsupportedCodecLayout(_) => ErrorCode::UnsupportedCodecLayout,
            Self::UnsupportedPixelFormat(_) => ErrorCode::UnsupportedPixelFormat,
            Self::MissingPalette => ErrorCode::MissingPalette,
            Self::IncorrectImageDimensions => ErrorCode::IncorrectImageDimensions,
            Self::NoMoreFrames => ErrorCode::NoMoreFrames,
            Self::UnderlyingCodec(_) => ErrorCode::UnderlyingCodec,
            Self::StateError(_) => ErrorCode::StateError,
            Self::NotImplemented => ErrorCode::NotImplemented,
        }
    }

    /// Returns true for the end-of-frames sentinel.
    ///
    /// A read loop treats this as normal termination rather than a failure.
    #[must_use]
    pub fn is_no_more_frames(&self) -> bool {
        matches!(self, Self::NoMoreFrames)
    }
}
