//! Canonical pixel formats and derived layout math.
//!
//! Every decoded frame carries a [`PixelFormat`] describing how its pixel
//! buffer is laid out. Codecs declare which formats they can produce and
//! accept; the framework never converts between formats beyond what a codec
//! offers natively.
//!
//! Two sentinels exist alongside the concrete formats:
//!
//! - [`PixelFormat::Source`] - "do not convert; yield raw codec pixels". The
//!   caller handles the returned pixel data (and palette, if any) manually.
//! - [`PixelFormat::Unsupported`] - an input the framework cannot represent.
//!
//! # Bytes per line
//!
//! Row stride is derived, never stored independently of the format:
//! `bytes_per_line = ceil(width * bits_per_pixel / 8)`. Only [`PixelFormat::Mono`]
//! actually needs the rounding; all other formats are whole-byte sized.
//!
//! # Example
//!
//! ```
//! use pictor_common::pixel_format::{bytes_per_line, PixelFormat};
//!
//! assert_eq!(PixelFormat::Rgba8888.bits_per_pixel(), Some(32));
//! assert_eq!(bytes_per_line(100, PixelFormat::Rgba8888).unwrap(), 400);
//!
//! // MONO rounds up to whole bytes: 10 pixels -> 2 bytes.
//! assert_eq!(bytes_per_line(10, PixelFormat::Mono).unwrap(), 2);
//!
//! // Round-trip through the manifest spelling.
//! let parsed: PixelFormat = "RGBA8888".parse().unwrap();
//! assert_eq!(parsed, PixelFormat::Rgba8888);
//! ```

use crate::error::{Error, Result};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A canonical pixel format.
///
/// The `Display`/`FromStr` spellings are the ones used in codec manifests;
/// parsing is case-insensitive and an unknown spelling yields
/// [`PixelFormat::Unsupported`], so `parse(to_string(f)) == f` holds for
/// every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// Unrepresentable input; cannot be read or written.
    #[default]
    Unsupported,

    /// Yield raw codec pixels without conversion.
    Source,

    /// 1 bit per pixel, most significant bit first.
    Mono,

    /// 8-bit grayscale.
    Grayscale8,

    /// 16-bit grayscale.
    Grayscale16,

    /// 8-bit indices into a palette.
    Indexed8,

    /// 16 bpp, 5 bits per channel.
    Rgb555,

    /// 16 bpp, 5-6-5 bits.
    Rgb565,

    /// 24 bpp, 8 bits per channel.
    Rgb888,

    /// 32 bpp, R-G-B-A byte order.
    Rgba8888,

    /// 32 bpp, A-R-G-B byte order.
    Argb8888,

    /// 32 bpp, B-G-R-A byte order.
    Bgra8888,

    /// 32 bpp, R-G-B plus a padding byte.
    Rgbx8888,
}

impl PixelFormat {
    /// Storage bits per pixel, or `None` for the two sentinels.
    #[must_use]
    pub fn bits_per_pixel(&self) -> Option<u32> {
        match self {
            Self::Unsupported | Self::Source => None,
            Self::Mono => Some(1),
            Self::Grayscale8 | Self::Indexed8 => Some(8),
            Self::Grayscale16 | Self::Rgb555 | Self::Rgb565 => Some(16),
            Self::Rgb888 => Some(24),
            Self::Rgba8888 | Self::Argb8888 | Self::Bgra8888 | Self::Rgbx8888 => Some(32),
        }
    }

    /// Whether pixel values of this format index into a palette.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed8)
    }

    /// Parses the manifest spelling, case-insensitively.
    ///
    /// Unknown spellings map to [`PixelFormat::Unsupported`] rather than
    /// failing, so manifests naming formats from a newer framework revision
    /// degrade gracefully.
    #[must_use]
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "SOURCE" => Self::Source,
            "MONO" => Self::Mono,
            "GRAYSCALE8" => Self::Grayscale8,
            "GRAYSCALE16" => Self::Grayscale16,
            "INDEXED8" => Self::Indexed8,
            "RGB555" => Self::Rgb555,
            "RGB565" => Self::Rgb565,
            "RGB888" => Self::Rgb888,
            "RGBA8888" => Self::Rgba8888,
            "ARGB8888" => Self::Argb8888,
            "BGRA8888" => Self::Bgra8888,
            "RGBX8888" => Self::Rgbx8888,
            _ => Self::Unsupported,
        }
    }

    /// The manifest spelling of this format.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsupported => "UNSUPPORTED",
            Self::Source => "SOURCE",
            Self::Mono => "MONO",
            Self::Grayscale8 => "GRAYSCALE8",
            Self::Grayscale16 => "GRAYSCALE16",
            Self::Indexed8 => "INDEXED8",
            Self::Rgb555 => "RGB555",
            Self::Rgb565 => "RGB565",
            Self::Rgb888 => "RGB888",
            Self::Rgba8888 => "RGBA8888",
            Self::Argb8888 => "ARGB8888",
            Self::Bgra8888 => "BGRA8888",
            Self::Rgbx8888 => "RGBX8888",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelFormat {
    type Err = Infallible;

    /// See [`PixelFormat::from_name`].
    fn from_str(s: &str) -> std::result::Result<Self, Infallible> {
        Ok(Self::from_name(s))
    }
}

/// Derives the row stride in bytes for `width` pixels of `format`.
///
/// The result is `ceil(width * bits_per_pixel / 8)`. Fails with
/// `InvalidArgument` for the sentinels, which have no storage width.
///
/// # Example
///
/// ```
/// use pictor_common::pixel_format::{bytes_per_line, PixelFormat};
///
/// assert_eq!(bytes_per_line(100, PixelFormat::Rgb888).unwrap(), 300);
/// assert_eq!(bytes_per_line(9, PixelFormat::Mono).unwrap(), 2);
/// assert!(bytes_per_line(1, PixelFormat::Source).is_err());
/// ```
pub fn bytes_per_line(width: u32, format: PixelFormat) -> Result<u32> {
    let bpp = format
        .bits_per_pixel()
        .ok_or_else(|| Error::InvalidArgument(format!("{format} has no storage width")))?;

    let bits = u64::from(width) * u64::from(bpp);
    let bytes = (bits + 7) / 8;

    u32::try_from(bytes).map_err(|_| Error::IncorrectImageDimensions)
}

/// Compression schemes a codec may read or write.
///
/// Used in source-image descriptors and in codec manifests
/// (`compressions=...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    None,
    Lzw,
    Deflate,
    Jpeg,
    Rle,
}

impl Compression {
    /// The manifest spelling of this compression.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Lzw => "LZW",
            Self::Deflate => "DEFLATE",
            Self::Jpeg => "JPEG",
            Self::Rle => "RLE",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "LZW" => Ok(Self::Lzw),
            "DEFLATE" => Ok(Self::Deflate),
            "JPEG" => Ok(Self::Jpeg),
            "RLE" => Ok(Self::Rle),
            other => Err(Error::InvalidArgument(format!(
                "unknown compression {other:?}"
            ))),
        }
    }
}
