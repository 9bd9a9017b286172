//! The codec registry: discovery, indexing, and lazy binding.
//!
//! A [`Registry`] holds one [`CodecInfo`] descriptor per known codec and
//! resolves codecs by file extension, MIME type, or magic-byte sniffing.
//! Descriptors come from two places:
//!
//! - the compiled-in codec set (each built-in codec embeds its manifest);
//! - `*.codec` manifest files scanned from a codecs directory at
//!   construction (an explicit path, the `PICTOR_CODECS_PATH` environment
//!   variable, or the compile-time default).
//!
//! Implementations are bound lazily: nothing beyond the descriptor exists
//! until the first session on a codec, at which point the implementation is
//! resolved from the compiled-in factory table and cached. [`Registry::unload_codecs`]
//! clears the cache to reclaim memory; descriptors survive and the next use
//! reloads.
//!
//! Resolution is read-only and deterministic: entries are checked in
//! registration order (built-ins first, then manifests in file-name order),
//! and the first codec claiming a key wins. A duplicate claim logs a
//! warning at scan time.

use parking_lot::Mutex;
use pictor_codec::{Codec, CodecInfo, CODEC_LAYOUT_V4};
use pictor_common::{Error, Result};
use pictor_io::{Io, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable overriding the codecs directory.
pub const CODECS_PATH_ENV: &str = "PICTOR_CODECS_PATH";

/// Compile-time default codecs directory.
const DEFAULT_CODECS_DIR: &str = "/usr/lib/pictor/codecs";

/// How many leading bytes sniffing reads.
const SNIFF_LEN: usize = 16;

type CodecFactory = fn() -> Arc<dyn Codec>;

fn gif_factory() -> Arc<dyn Codec> {
    Arc::new(pictor_gif::GifCodec::new())
}

/// The compiled-in codec set: name, embedded manifest, factory.
const BUILTIN_CODECS: &[(&str, &str, CodecFactory)] = &[("gif", pictor_gif::MANIFEST, gif_factory)];

fn builtin_factory(name: &str) -> Option<CodecFactory> {
    BUILTIN_CODECS
        .iter()
        .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, _, factory)| factory)
}

/// A copyable handle to one codec in a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodecId(usize);

struct CodecEntry {
    info: CodecInfo,
    // Lazily bound implementation; None until first use or after unload.
    implementation: Mutex<Option<Arc<dyn Codec>>>,
}

/// See the module docs.
pub struct Registry {
    entries: Vec<CodecEntry>,
}

impl Registry {
    /// A registry holding only the compiled-in codecs.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self {
            entries: Vec::new(),
        };

        for (name, manifest, _) in BUILTIN_CODECS {
            match CodecInfo::from_manifest(manifest) {
                Ok(info) => registry.push(info),
                Err(e) => tracing::warn!("embedded manifest of codec '{name}' is broken: {e}"),
            }
        }

        registry
    }

    /// The compiled-in codecs plus every manifest in the configured codecs
    /// directory (`PICTOR_CODECS_PATH`, else the compile-time default if it
    /// exists).
    #[must_use]
    pub fn load() -> Self {
        let mut registry = Self::builtin();

        if let Some(dir) = std::env::var_os(CODECS_PATH_ENV) {
            registry.scan_directory(Path::new(&dir));
        } else {
            let default = Path::new(DEFAULT_CODECS_DIR);
            if default.is_dir() {
                registry.scan_directory(default);
            }
        }

        tracing::info!("codec registry ready with {} codec(s)", registry.len());
        registry
    }

    /// The compiled-in codecs plus every manifest in `dir`.
    #[must_use]
    pub fn with_directory(dir: impl AsRef<Path>) -> Self {
        let mut registry = Self::builtin();
        registry.scan_directory(dir.as_ref());
        registry
    }

    fn scan_directory(&mut self, dir: &Path) {
        tracing::debug!("scanning codecs directory {}", dir.display());

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("cannot scan codecs directory {}: {e}", dir.display());
                return;
            }
        };

        let mut manifests: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "codec"))
            .collect();
        manifests.sort();

        for path in manifests {
            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("cannot read manifest {}: {e}", path.display());
                    continue;
                }
            };

            match CodecInfo::from_manifest(&text) {
                Ok(info) => self.push(info),
                Err(e) => {
                    tracing::warn!("skipping manifest {}: {e}", path.display());
                }
            }
        }
    }

    fn push(&mut self, info: CodecInfo) {
        for ext in &info.extensions {
            if let Some(first) = self.entries.iter().find(|e| e.info.supports_extension(ext)) {
                tracing::warn!(
                    "extension {ext:?} of codec '{}' already claimed by '{}'; first wins",
                    info.name,
                    first.info.name
                );
            }
        }
        for mime in &info.mime_types {
            if let Some(first) = self.entries.iter().find(|e| e.info.supports_mime(mime)) {
                tracing::warn!(
                    "MIME type {mime:?} of codec '{}' already claimed by '{}'; first wins",
                    info.name,
                    first.info.name
                );
            }
        }

        tracing::debug!("registered codec '{}' (layout {})", info.name, info.layout);
        self.entries.push(CodecEntry {
            info,
            implementation: Mutex::new(None),
        });
    }

    /// Number of registered codecs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all codec handles in registration order.
    pub fn codecs(&self) -> impl Iterator<Item = CodecId> + '_ {
        (0..self.entries.len()).map(CodecId)
    }

    /// The descriptor behind a handle.
    #[must_use]
    pub fn info(&self, id: CodecId) -> &CodecInfo {
        &self.entries[id.0].info
    }

    /// Resolves a codec by file extension (case-insensitive, dots
    /// stripped).
    pub fn codec_for_extension(&self, ext: &str) -> Result<CodecId> {
        self.entries
            .iter()
            .position(|entry| entry.info.supports_extension(ext))
            .map(CodecId)
            .ok_or(Error::NoSuitableCodec)
    }

    /// Resolves a codec by MIME type (case-insensitive).
    pub fn codec_for_mime(&self, mime: &str) -> Result<CodecId> {
        self.entries
            .iter()
            .position(|entry| entry.info.supports_mime(mime))
            .map(CodecId)
            .ok_or(Error::NoSuitableCodec)
    }

    /// Resolves a codec by matching the stream's leading bytes against
    /// codec magic numbers. The stream position is restored afterwards.
    pub fn codec_by_sniffing(&self, io: &mut dyn Io) -> Result<CodecId> {
        let start = io.tell()?;

        let mut leading = [0u8; SNIFF_LEN];
        let got = match io.read(&mut leading, 1, SNIFF_LEN) {
            Ok(got) => got,
            Err(Error::Eof) => 0,
            Err(e) => return Err(e),
        };

        io.seek(SeekFrom::Start(start))?;

        self.entries
            .iter()
            .position(|entry| entry.info.matches_magic(&leading[..got]))
            .map(CodecId)
            .ok_or(Error::NoSuitableCodec)
    }

    /// Binds (loading if necessary) the implementation behind a handle.
    ///
    /// Fails with `UnsupportedCodecLayout` if the descriptor declares a
    /// layout this framework does not understand; no entry point of such a
    /// codec is ever called. Fails with `NoSuitableCodec` if no
    /// compiled-in implementation exists under the descriptor's name.
    pub fn load_codec(&self, id: CodecId) -> Result<Arc<dyn Codec>> {
        let entry = self
            .entries
            .get(id.0)
            .ok_or_else(|| Error::InvalidArgument("stale codec handle".into()))?;

        if entry.info.layout != CODEC_LAYOUT_V4 {
            return Err(Error::UnsupportedCodecLayout(entry.info.layout));
        }

        let mut slot = entry.implementation.lock();
        if let Some(codec) = slot.as_ref() {
            return Ok(Arc::clone(codec));
        }

        let factory = builtin_factory(&entry.info.name).ok_or_else(|| {
            tracing::error!(
                "codec '{}' has no compiled-in implementation",
                entry.info.name
            );
            Error::NoSuitableCodec
        })?;

        tracing::debug!("loading codec '{}'", entry.info.name);
        let codec = factory();
        *slot = Some(Arc::clone(&codec));
        Ok(codec)
    }

    /// Whether a codec's implementation is currently bound.
    #[must_use]
    pub fn is_loaded(&self, id: CodecId) -> bool {
        self.entries
            .get(id.0)
            .is_some_and(|entry| entry.implementation.lock().is_some())
    }

    /// Drops every bound implementation to reclaim memory. Descriptors
    /// remain; the next use reloads.
    ///
    /// Callers must quiesce their sessions first: a session started before
    /// the unload keeps its codec alive until it finishes, defeating the
    /// point of unloading.
    pub fn unload_codecs(&self) {
        for entry in &self.entries {
            *entry.implementation.lock() = None;
        }
        tracing::debug!("unloaded all codecs");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pictor_io::MemReadIo;

    #[test]
    fn test_builtin_registry_has_gif() {
        let registry = Registry::builtin();
        assert!(!registry.is_empty());

        let id = registry.codec_for_extension("gif").unwrap();
        assert_eq!(registry.info(id).name, "gif");
        assert_eq!(registry.codec_for_mime("image/gif").unwrap(), id);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let registry = Registry::builtin();
        let a = registry.codec_for_extension(".GIF").unwrap();
        let b = registry.codec_for_extension("gif").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_keys_fail_with_no_suitable_codec() {
        let registry = Registry::builtin();
        assert!(matches!(
            registry.codec_for_extension("xyzzy"),
            Err(Error::NoSuitableCodec)
        ));
        assert!(matches!(
            registry.codec_for_mime("application/x-nonsense"),
            Err(Error::NoSuitableCodec)
        ));
    }

    #[test]
    fn test_sniffing_restores_position() {
        let registry = Registry::builtin();
        let mut io = MemReadIo::new(b"GIF89a rest of file".to_vec());

        let id = registry.codec_by_sniffing(&mut io).unwrap();
        assert_eq!(registry.info(id).name, "gif");
        assert_eq!(io.tell().unwrap(), 0);
    }

    #[test]
    fn test_sniffing_unknown_bytes() {
        let registry = Registry::builtin();
        let mut io = MemReadIo::new(b"garbage".to_vec());
        assert!(matches!(
            registry.codec_by_sniffing(&mut io),
            Err(Error::NoSuitableCodec)
        ));
    }

    #[test]
    fn test_lazy_load_and_unload() {
        let registry = Registry::builtin();
        let id = registry.codec_for_extension("gif").unwrap();

        assert!(!registry.is_loaded(id));
        let codec = registry.load_codec(id).unwrap();
        assert!(registry.is_loaded(id));
        drop(codec);

        registry.unload_codecs();
        assert!(!registry.is_loaded(id));

        // Reload works after an unload.
        registry.load_codec(id).unwrap();
        assert!(registry.is_loaded(id));
    }
}
