//! GIF codec driver.
//!
//! Decodes static and animated GIF files (87a and 89a), including local and
//! global palettes, transparency, frame disposal, interlacing, and comment /
//! application extension metadata. Writing is not implemented.
//!
//! # Canvas model
//!
//! A GIF is a *canvas* of logical width x height holding the composite of
//! successive sub-frames. Each sub-frame covers a rectangle of the canvas
//! and is drawn after applying the previous frame's disposal method. Every
//! frame this driver returns is the full composed canvas, so callers never
//! deal with sub-frame geometry.
//!
//! # Output formats
//!
//! `RGBA8888` and `BGRA8888`. The source is always 8-bit indexed LZW data;
//! interlaced sources are reported with `passes = 4` and decoded
//! progressively.
//!
//! # Example
//!
//! ```no_run
//! use pictor_codec::{Codec, ReadState as _};
//! use pictor_common::ReadOptions;
//! use pictor_gif::GifCodec;
//! use pictor_io::FileIo;
//!
//! let codec = GifCodec::new();
//! let mut io = FileIo::open("animation.gif")?;
//! let mut state = codec.read_init(&mut io, &ReadOptions::default())?;
//!
//! let mut image = state.seek_next_frame(&mut io)?;
//! image.allocate_pixels();
//! for _ in 0..image.passes {
//!     state.seek_next_pass(&mut io, &image)?;
//!     let mut pixels = std::mem::take(&mut image.pixels);
//!     state.read_frame(&mut io, &image, &mut pixels)?;
//!     image.pixels = pixels;
//! }
//! state.finish(&mut io)?;
//! # Ok::<(), pictor_common::Error>(())
//! ```

mod decoder;
mod read_state;

use pictor_codec::{Codec, CodecFeatures, ReadFeatures, ReadState, WriteFeatures, WriteState};
use pictor_common::{Error, PixelFormat, ReadOptions, Result, WriteOptions};
use pictor_io::Io;
use read_state::GifReadState;

/// The on-disk manifest for this codec, also embedded for registries built
/// without a codecs directory.
pub const MANIFEST: &str = include_str!("gif.codec");

/// The GIF codec. Stateless; per-session state lives in the object returned
/// by [`Codec::read_init`].
#[derive(Debug, Default)]
pub struct GifCodec;

impl GifCodec {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Codec for GifCodec {
    fn read_features(&self) -> ReadFeatures {
        ReadFeatures {
            default_output_pixel_format: PixelFormat::Rgba8888,
            output_pixel_formats: vec![PixelFormat::Rgba8888, PixelFormat::Bgra8888],
            features: CodecFeatures::STATIC
                | CodecFeatures::ANIMATED
                | CodecFeatures::INTERLACED
                | CodecFeatures::META_DATA,
        }
    }

    fn write_features(&self) -> WriteFeatures {
        WriteFeatures::unsupported()
    }

    fn read_init(&self, io: &mut dyn Io, options: &ReadOptions) -> Result<Box<dyn ReadState>> {
        if !self
            .read_features()
            .supports_output(options.output_pixel_format)
        {
            return Err(Error::UnsupportedPixelFormat(options.output_pixel_format));
        }

        Ok(Box::new(GifReadState::new(io, options.clone())?))
    }

    fn write_init(&self, _io: &mut dyn Io, _options: &WriteOptions) -> Result<Box<dyn WriteState>> {
        Err(Error::NotImplemented)
    }
}
