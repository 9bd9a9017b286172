//! Per-session option blocks.
//!
//! Sessions deep-copy their options at init time, so mutating a caller-held
//! options value after `read_init`/`write_init` has no effect on a running
//! session.

use crate::pixel_format::{Compression, PixelFormat};
use bitflags::bitflags;

bitflags! {
    /// Switches for optional I/O work a codec may perform.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IoOptions: u32 {
        /// Extract (or embed) metadata entries.
        const META_DATA = 1 << 0;
        /// Extract (or embed) an ICC profile.
        const ICCP = 1 << 1;
    }
}

/// Options for a read session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// The pixel format frames are delivered in. Codecs validate this
    /// against their read features at `read_init`.
    pub output_pixel_format: PixelFormat,

    /// Optional work switches; metadata extraction is on by default.
    pub io_options: IoOptions,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            output_pixel_format: PixelFormat::Rgba8888,
            io_options: IoOptions::META_DATA,
        }
    }
}

/// Options for a write session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// The pixel format of the buffers the caller will supply.
    pub input_pixel_format: PixelFormat,

    /// Compression to apply; validated against the codec's write features.
    pub compression: Compression,

    /// Codec-specific compression level; 0 selects the codec default.
    pub compression_level: u32,

    /// Optional work switches.
    pub io_options: IoOptions,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            input_pixel_format: PixelFormat::Rgba8888,
            compression: Compression::None,
            compression_level: 0,
            io_options: IoOptions::META_DATA,
        }
    }
}
