//! pictor: an image-format abstraction library.
//!
//! One programmatic surface to probe, decode, and encode images across
//! file formats without knowing which format a given file is. Callers
//! resolve (or auto-detect) a codec through the [`Registry`], then drive a
//! uniform streaming protocol frame by frame; every format looks the same
//! behind the [`pictor_common::Image`] data model.
//!
//! # Quick start
//!
//! ```no_run
//! use pictor::Registry;
//! use pictor_io::FileIo;
//!
//! let registry = Registry::load();
//!
//! // Who handles this file?
//! let (header, codec) = registry.probe(FileIo::open("mystery.img")?)?;
//! println!(
//!     "{} says {}x{}, {}",
//!     registry.info(codec).name,
//!     header.width,
//!     header.height,
//!     header.pixel_format
//! );
//!
//! // Decode it, frame by frame.
//! let mut session = registry.start_reading(FileIo::open("mystery.img")?, None, None)?;
//! while let Some(frame) = session.next_frame()? {
//!     println!("frame: {} bytes", frame.pixels.len());
//! }
//! session.finish()?;
//! # Ok::<(), pictor_common::Error>(())
//! ```
//!
//! # Crate map
//!
//! - [`pictor_common`] - pixel formats, images, palettes, metadata, errors
//! - [`pictor_io`] - the stream abstraction ([`pictor_io::FileIo`],
//!   [`pictor_io::MemReadIo`], [`pictor_io::MemWriteIo`])
//! - [`pictor_codec`] - the entry-point traits codecs implement
//! - this crate - the [`Registry`] and the streaming sessions

pub mod registry;
pub mod session;

pub use registry::{CodecId, Registry, CODECS_PATH_ENV};
pub use session::{ReadSession, WriteSession};

// The data model is part of this crate's API surface.
pub use pictor_common::{
    Compression, Error, ErrorCode, Image, ImageProperties, IoOptions, MetaData, MetaDataKey,
    MetaDataValue, Palette, PixelFormat, ReadOptions, Result, SourceImage, WriteOptions,
};

use once_cell::sync::Lazy;
use pictor_io::Io;

impl Registry {
    /// Starts a read session on `io` with `codec` (or sniffing when
    /// `None`) and `options` (or the defaults).
    ///
    /// The codec implementation is loaded lazily if this is its first
    /// use.
    pub fn start_reading<S: Io>(
        &self,
        mut io: S,
        codec: Option<CodecId>,
        options: Option<ReadOptions>,
    ) -> Result<ReadSession<S>> {
        let id = match codec {
            Some(id) => id,
            None => self.codec_by_sniffing(&mut io)?,
        };

        let codec = self.load_codec(id)?;
        ReadSession::new(codec, io, options.unwrap_or_default())
    }

    /// Starts a write session on `io` with `codec` and `options` (or the
    /// defaults). Writing cannot sniff, so the codec is explicit.
    pub fn start_writing<S: Io>(
        &self,
        io: S,
        codec: CodecId,
        options: Option<WriteOptions>,
    ) -> Result<WriteSession<S>> {
        let codec = self.load_codec(codec)?;
        WriteSession::new(codec, io, options.unwrap_or_default())
    }

    /// Sniffs the codec for `io`, reads the first frame header, and
    /// closes the session again.
    ///
    /// The returned image carries no pixels. The stream is left at an
    /// undefined position (and closed, if the session owned it).
    pub fn probe<S: Io>(&self, io: S) -> Result<(Image, CodecId)> {
        let mut io = io;
        let id = self.codec_by_sniffing(&mut io)?;
        let codec = self.load_codec(id)?;

        let mut session = ReadSession::new(codec, io, ReadOptions::default())?;
        let header = session.seek_next_frame()?;
        session.finish()?;

        Ok((header, id))
    }
}

static DEFAULT_REGISTRY: Lazy<Registry> = Lazy::new(Registry::load);

/// A process-wide registry, constructed lazily on first use via
/// [`Registry::load`].
///
/// Convenience for callers that do not care about registry lifetime.
/// Anything needing a custom codecs directory should construct its own
/// [`Registry`] and pass it around explicitly.
#[must_use]
pub fn default_registry() -> &'static Registry {
    &DEFAULT_REGISTRY
}
