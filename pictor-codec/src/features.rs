//! Codec capability blocks.

use bitflags::bitflags;
use pictor_common::{Compression, PixelFormat};

bitflags! {
    /// What a codec can do on its read or write side.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CodecFeatures: u32 {
        /// Single-frame images.
        const STATIC = 1 << 0;
        /// Multi-frame animations.
        const ANIMATED = 1 << 1;
        /// Interlaced (multi-pass) sources.
        const INTERLACED = 1 << 2;
        /// Metadata extraction or embedding.
        const META_DATA = 1 << 3;
        /// ICC profile extraction or embedding.
        const ICCP = 1 << 4;
    }
}

/// Read-side defaults and capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFeatures {
    /// Output format used when the caller does not pick one.
    pub default_output_pixel_format: PixelFormat,

    /// Every output format the codec can deliver.
    pub output_pixel_formats: Vec<PixelFormat>,

    /// Capability flags.
    pub features: CodecFeatures,
}

impl ReadFeatures {
    /// Whether `format` can be requested as the session output format.
    #[must_use]
    pub fn supports_output(&self, format: PixelFormat) -> bool {
        self.output_pixel_formats.contains(&format)
    }
}

/// Write-side defaults and capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFeatures {
    /// Every pixel format the codec accepts for encoding.
    pub pixel_formats: Vec<PixelFormat>,

    /// Every compression the codec can produce.
    pub compressions: Vec<Compression>,

    /// Compression used when the caller does not pick one.
    pub default_compression: Compression,

    /// Capability flags.
    pub features: CodecFeatures,
}

impl WriteFeatures {
    /// A write-features block for codecs without write support.
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            pixel_formats: Vec::new(),
            compressions: Vec::new(),
            default_compression: Compression::None,
            features: CodecFeatures::empty(),
        }
    }

    #[must_use]
    pub fn supports_pixel_format(&self, format: PixelFormat) -> bool {
        self.pixel_formats.contains(&format)
    }

    #[must_use]
    pub fn supports_compression(&self, compression: Compression) -> bool {
        self.compressions.contains(&compression)
    }
}
