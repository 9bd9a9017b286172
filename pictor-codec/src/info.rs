//! Codec descriptors and the on-disk manifest format.
//!
//! A [`CodecInfo`] is the static, parse-time description of a codec: what
//! the registry indexes and resolves against without loading any
//! implementation. On disk it is a line-oriented UTF-8 manifest:
//!
//! ```text
//! layout=4
//! name=gif
//! description=Graphics Interchange Format
//! version=1.0.0
//! magic-numbers=47 49 46 38 37 61, 47 49 46 38 39 61
//! extensions=gif
//! mime-types=image/gif
//! read-pixel-formats=RGBA8888, BGRA8888
//! write-pixel-formats=
//! compressions=LZW
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Unknown keys are
//! ignored with a warning so manifests from newer framework revisions keep
//! parsing. Values are stored as given; lookups compare case-insensitively.

use pictor_common::{Compression, Error, PixelFormat, Result};

/// Static metadata about one codec. Immutable after parse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodecInfo {
    /// Entry-point layout version the implementation exposes.
    pub layout: u32,

    /// Short name; also the key implementations are bound under.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Codec version string.
    pub version: String,

    /// Leading-byte signatures, one alternative per entry.
    pub magic_numbers: Vec<Vec<u8>>,

    /// Recognized file extensions, in declaration order.
    pub extensions: Vec<String>,

    /// Recognized MIME types, in declaration order.
    pub mime_types: Vec<String>,

    /// Pixel formats the codec can produce when reading.
    pub read_pixel_formats: Vec<PixelFormat>,

    /// Pixel formats the codec accepts when writing.
    pub write_pixel_formats: Vec<PixelFormat>,

    /// Compressions the codec can write.
    pub compressions: Vec<Compression>,
}

/// Strips surrounding whitespace and dots from an extension key.
fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_matches('.').to_ascii_lowercase()
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_magic(value: &str) -> Result<Vec<u8>> {
    value
        .split_whitespace()
        .map(|octet| {
            u8::from_str_radix(octet, 16)
                .map_err(|_| Error::InvalidArgument(format!("bad magic octet {octet:?}")))
        })
        .collect()
}

impl CodecInfo {
    /// Parses a manifest. Fails with `InvalidArgument` if `layout` or
    /// `name` is missing or malformed; the registry skips such codecs.
    pub fn from_manifest(text: &str) -> Result<Self> {
        let mut info = Self::default();
        let mut layout = None;

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!("manifest line {} has no '=', ignored: {line:?}", line_no + 1);
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "layout" => {
                    layout = Some(value.parse::<u32>().map_err(|_| {
                        Error::InvalidArgument(format!("bad layout value {value:?}"))
                    })?);
                }
                "name" => info.name = value.to_string(),
                "description" => info.description = value.to_string(),
                "version" => info.version = value.to_string(),
                "magic-numbers" => {
                    for alternative in split_list(value) {
                        info.magic_numbers.push(parse_magic(alternative)?);
                    }
                }
                "extensions" => {
                    info.extensions.extend(split_list(value).map(String::from));
                }
                "mime-types" => {
                    info.mime_types.extend(split_list(value).map(String::from));
                }
                "read-pixel-formats" => {
                    info.read_pixel_formats
                        .extend(split_list(value).map(PixelFormat::from_name));
                }
                "write-pixel-formats" => {
                    info.write_pixel_formats
                        .extend(split_list(value).map(PixelFormat::from_name));
                }
                "compressions" => {
                    for name in split_list(value) {
                        match name.parse::<Compression>() {
                            Ok(compression) => info.compressions.push(compression),
                            Err(_) => {
                                tracing::warn!("unknown compression {name:?} in manifest, ignored");
                            }
                        }
                    }
                }
                other => {
                    tracing::warn!("unknown manifest key {other:?}, ignored");
                }
            }
        }

        info.layout = layout
            .ok_or_else(|| Error::InvalidArgument("manifest is missing 'layout'".into()))?;

        if info.name.is_empty() {
            return Err(Error::InvalidArgument("manifest is missing 'name'".into()));
        }

        Ok(info)
    }

    /// Whether this codec claims `ext` (case-insensitive, dots stripped).
    #[must_use]
    pub fn supports_extension(&self, ext: &str) -> bool {
        let key = normalize_extension(ext);
        self.extensions
            .iter()
            .any(|e| normalize_extension(e) == key)
    }

    /// Whether this codec claims `mime` (case-insensitive).
    #[must_use]
    pub fn supports_mime(&self, mime: &str) -> bool {
        let key = mime.trim().to_ascii_lowercase();
        self.mime_types.iter().any(|m| m.to_ascii_lowercase() == key)
    }

    /// Whether any of this codec's magic numbers prefixes `leading`.
    #[must_use]
    pub fn matches_magic(&self, leading: &[u8]) -> bool {
        self.magic_numbers
            .iter()
            .any(|magic| !magic.is_empty() && leading.starts_with(magic))
    }
}
