//! The decoded-frame data model: [`Image`], [`Palette`], [`SourceImage`].
//!
//! An [`Image`] is one frame as produced by a read session or supplied to a
//! write session. Sessions fill the descriptive fields from
//! `seek_next_frame` and the pixel buffer from the pass loop; callers own
//! the result.

use crate::error::{Error, Result};
use crate::meta_data::MetaData;
use crate::pixel_format::{bytes_per_line, Compression, PixelFormat};
use bitflags::bitflags;

bitflags! {
    /// Properties of an image or of its on-disk source.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ImageProperties: u32 {
        /// Rows are stored bottom-up.
        const FLIPPED_VERTICALLY = 1 << 0;
        /// The source is stored in interlaced (multi-pass) order.
        const INTERLACED = 1 << 1;
    }
}

/// A color lookup table.
///
/// `data` holds `entries` consecutive colors in `pixel_format` layout, so
/// `entries * bytes_per_entry == data.len()` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pixel_format: PixelFormat,
    data: Vec<u8>,
}

impl Palette {
    /// Wraps raw palette bytes, validating the length against the format.
    ///
    /// # Example
    ///
    /// ```
    /// use pictor_common::{Palette, PixelFormat};
    ///
    /// let palette = Palette::new(PixelFormat::Rgb888, vec![0; 256 * 3]).unwrap();
    /// assert_eq!(palette.entries(), 256);
    /// ```
    pub fn new(pixel_format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let bpp = pixel_format
            .bits_per_pixel()
            .ok_or_else(|| Error::InvalidArgument(format!("{pixel_format} palette")))?;

        let bytes_per_entry = (bpp as usize).div_ceil(8);
        if bytes_per_entry == 0 || data.len() % bytes_per_entry != 0 {
            return Err(Error::InvalidArgument(format!(
                "palette length {} is not a multiple of {bytes_per_entry}",
                data.len()
            )));
        }

        Ok(Self { pixel_format, data })
    }

    #[must_use]
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Number of colors in the table.
    #[must_use]
    pub fn entries(&self) -> usize {
        let bytes_per_entry = (self.pixel_format.bits_per_pixel().unwrap_or(8) as usize).div_ceil(8);
        self.data.len() / bytes_per_entry
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Descriptor of the image as stored in the file, before codec output
/// selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceImage {
    /// Compression scheme of the stored pixel data.
    pub compression: Option<Compression>,
    /// Pixel format of the stored pixel data.
    pub pixel_format: Option<PixelFormat>,
    /// Properties of the stored pixel data.
    pub properties: ImageProperties,
}

/// One decoded frame.
///
/// `seek_next_frame` populates everything except `pixels`; the pass loop
/// fills `pixels`. Invariant once decoded:
/// `pixels.len() == bytes_per_line * height`.
///
/// For animations, `delay_ms` is the time this frame stays on screen. A raw
/// source delay of zero means "as fast as possible"; decoders MAY remap it
/// to a small minimum (the GIF driver uses 100 ms).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Image {
    /// Frame width in pixels.
    pub width: u32,

    /// Frame height in pixels.
    pub height: u32,

    /// Row stride in bytes; derived from `width` and `pixel_format`.
    pub bytes_per_line: u32,

    /// Pixel format of `pixels`.
    pub pixel_format: PixelFormat,

    /// Number of passes the codec delivers this frame in; 1 unless the
    /// source is interlaced.
    pub passes: u32,

    /// Whether this frame belongs to an animation.
    pub animated: bool,

    /// Frame delay in milliseconds; meaningful only if `animated`.
    pub delay_ms: u32,

    /// Palette; present iff `pixel_format` is indexed, or SOURCE output
    /// comes with a codec-provided palette.
    pub palette: Option<Palette>,

    /// Ordered metadata entries.
    pub meta_data: Vec<MetaData>,

    /// Properties of this frame.
    pub properties: ImageProperties,

    /// How the frame is stored in the file.
    pub source_image: Option<SourceImage>,

    /// The pixel buffer, `bytes_per_line * height` bytes once decoded.
    pub pixels: Vec<u8>,
}

impl Image {
    /// An empty image header; fields are filled in by codecs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            passes: 1,
            ..Self::default()
        }
    }

    /// A header with dimensions and format, with `bytes_per_line` derived.
    ///
    /// # Example
    ///
    /// ```
    /// use pictor_common::{Image, PixelFormat};
    ///
    /// let image = Image::with_dimensions(100, 50, PixelFormat::Rgba8888).unwrap();
    /// assert_eq!(image.bytes_per_line, 400);
    /// assert_eq!(image.passes, 1);
    /// ```
    pub fn with_dimensions(width: u32, height: u32, pixel_format: PixelFormat) -> Result<Self> {
        Ok(Self {
            width,
            height,
            bytes_per_line: bytes_per_line(width, pixel_format)?,
            pixel_format,
            passes: 1,
            ..Self::default()
        })
    }

    /// Size in bytes of a fully decoded pixel buffer for this header.
    #[must_use]
    pub fn pixels_size(&self) -> usize {
        self.bytes_per_line as usize * self.height as usize
    }

    /// Allocates (or reallocates) the pixel buffer to `pixels_size`, zeroed.
    pub fn allocate_pixels(&mut self) {
        self.pixels = vec![0u8; self.pixels_size()];
    }
}
