//! Codec entry points and descriptors.
//!
//! This crate defines the contract every image codec implements. A codec is
//! a driver for one file format; the registry discovers codecs through
//! their [`CodecInfo`] descriptors and binds implementations of the
//! [`Codec`] trait on first use.
//!
//! # Entry-point layout
//!
//! The entry-point set is versioned. This framework binds layout
//! [`CODEC_LAYOUT_V4`]: ten streaming entry points (five read, five write)
//! plus the two feature queries. A descriptor declaring any other layout is
//! refused with `UnsupportedCodecLayout` before any entry point is called.
//!
//! The read side is driven in strict order:
//!
//! ```text
//! read_init -> [ seek_next_frame -> ( seek_next_pass -> read_frame )* ]* -> finish
//! ```
//!
//! and the write side symmetrically. Per-operation state lives in the
//! [`ReadState`] / [`WriteState`] objects returned by the init calls;
//! implementations of [`Codec`] hold no mutable state, so one loaded codec
//! serves any number of concurrent sessions.
//!
//! # Key Concepts
//!
//! - **Codecs are stateless**: all mutable state is in the per-session state object
//! - **Fail-fast policy**: no defensive fallbacks; errors carry stable codes
//! - **Strict ordering**: the session layer enforces call order, codecs may assume it

use pictor_common::{Image, ReadOptions, Result, WriteOptions};
use pictor_io::Io;

pub mod features;
pub mod info;

pub use features::{CodecFeatures, ReadFeatures, WriteFeatures};
pub use info::CodecInfo;

/// The entry-point layout this framework understands.
pub const CODEC_LAYOUT_V4: u32 = 4;

/// A driver for a single image file format.
///
/// Implementations must keep all mutable state inside the state objects
/// returned by `read_init`/`write_init` and touch no process-global mutable
/// data.
pub trait Codec: Send + Sync {
    /// Default read behavior and read capabilities.
    fn read_features(&self) -> ReadFeatures;

    /// Default write behavior and write capabilities.
    fn write_features(&self) -> WriteFeatures;

    /// Starts a decode operation on `io`.
    ///
    /// Validates `options` against the read features (an undeliverable
    /// output format fails with `UnsupportedPixelFormat`), deep-copies
    /// them, and returns the per-operation state.
    fn read_init(&self, io: &mut dyn Io, options: &ReadOptions) -> Result<Box<dyn ReadState>>;

    /// Starts an encode operation on `io`.
    ///
    /// Validates `options` against the write features, deep-copies them,
    /// and returns the per-operation state. Codecs without write support
    /// return `NotImplemented`.
    fn write_init(&self, io: &mut dyn Io, options: &WriteOptions) -> Result<Box<dyn WriteState>>;
}

impl std::fmt::Debug for dyn Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<dyn Codec>")
    }
}

/// Per-operation decode state.
///
/// The session layer guarantees the strict call order documented in the
/// crate docs, passes the same `io` to every call, and calls `finish`
/// exactly once from any state.
pub trait ReadState {
    /// Advances to the next frame and returns its populated header
    /// (dimensions, format, passes, animation fields, palette, metadata).
    /// The pixel buffer of the returned image is empty.
    ///
    /// Fails with the `NoMoreFrames` sentinel once the stream is
    /// exhausted.
    fn seek_next_frame(&mut self, io: &mut dyn Io) -> Result<Image>;

    /// Prepares the next pass of the current frame. Called exactly
    /// `image.passes` times per frame.
    fn seek_next_pass(&mut self, io: &mut dyn Io, image: &Image) -> Result<()>;

    /// Decodes one pass of the current frame into `pixels`, which holds
    /// `image.bytes_per_line * image.height` bytes. After the last pass
    /// the frame is complete.
    fn read_frame(&mut self, io: &mut dyn Io, image: &Image, pixels: &mut [u8]) -> Result<()>;

    /// Releases codec state. Must succeed from any state.
    fn finish(&mut self, io: &mut dyn Io) -> Result<()>;
}

impl std::fmt::Debug for dyn ReadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<dyn ReadState>")
    }
}

/// Per-operation encode state, symmetric to [`ReadState`].
pub trait WriteState {
    /// Begins the next frame described by `image`, validating its declared
    /// pixel format and metadata against the codec's write capabilities.
    fn seek_next_frame(&mut self, io: &mut dyn Io, image: &Image) -> Result<()>;

    /// Prepares the next pass of the current frame.
    fn seek_next_pass(&mut self, io: &mut dyn Io, image: &Image) -> Result<()>;

    /// Encodes one pass from `pixels`.
    fn write_frame(&mut self, io: &mut dyn Io, image: &Image, pixels: &[u8]) -> Result<()>;

    /// Flushes and releases codec state. Must succeed from any state.
    fn finish(&mut self, io: &mut dyn Io) -> Result<()>;
}

impl std::fmt::Debug for dyn WriteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<dyn WriteState>")
    }
}
