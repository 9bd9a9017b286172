//! Image metadata entries.
//!
//! Metadata travels with an [`crate::Image`] as an ordered sequence of
//! [`MetaData`] entries. An entry is keyed either by a well-known tag
//! ([`MetaDataKey::Comment`], [`MetaDataKey::Exif`], ...) or by a free-form
//! string under the [`MetaDataKey::Unknown`] sentinel, and carries either a
//! string or a binary value.
//!
//! Invariants enforced by the constructors:
//! - `key_unknown` is present if and only if the key is `Unknown`;
//! - order is preserved by `Clone` (deep copy is a fixpoint).
//!
//! # Example
//!
//! ```
//! use pictor_common::{MetaData, MetaDataKey, MetaDataValue};
//!
//! let comment = MetaData::from_known_string(MetaDataKey::Comment, "Holidays").unwrap();
//! assert_eq!(comment.key(), MetaDataKey::Comment);
//! assert_eq!(comment.key_unknown(), None);
//!
//! let app = MetaData::from_unknown_data("NETSCAPE2.0", vec![1, 0, 0]);
//! assert_eq!(app.key(), MetaDataKey::Unknown);
//! assert_eq!(app.key_unknown(), Some("NETSCAPE2.0"));
//! ```

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Well-known metadata tags plus the `Unknown` sentinel for free-form keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaDataKey {
    Author,
    Comment,
    Copyright,
    CreationTime,
    Description,
    Exif,
    Software,
    Title,
    /// Free-form key; the actual key string lives in `MetaData::key_unknown`.
    Unknown,
}

impl MetaDataKey {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Author => "Author",
            Self::Comment => "Comment",
            Self::Copyright => "Copyright",
            Self::CreationTime => "Creation Time",
            Self::Description => "Description",
            Self::Exif => "EXIF",
            Self::Software => "Software",
            Self::Title => "Title",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MetaDataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetaDataKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Author" => Ok(Self::Author),
            "Comment" => Ok(Self::Comment),
            "Copyright" => Ok(Self::Copyright),
            "Creation Time" => Ok(Self::CreationTime),
            "Description" => Ok(Self::Description),
            "EXIF" => Ok(Self::Exif),
            "Software" => Ok(Self::Software),
            "Title" => Ok(Self::Title),
            "Unknown" => Ok(Self::Unknown),
            other => Err(Error::InvalidArgument(format!(
                "unknown meta data key {other:?}"
            ))),
        }
    }
}

/// A metadata value: either text or an opaque binary blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaDataValue {
    String(String),
    Data(Vec<u8>),
}

/// One metadata entry.
///
/// Construct through the four `from_*` constructors, which enforce the
/// key/key_unknown invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaData {
    key: MetaDataKey,
    key_unknown: Option<String>,
    value: MetaDataValue,
}

impl MetaData {
    /// A string entry under a well-known key.
    ///
    /// Fails with `InvalidArgument` if `key` is [`MetaDataKey::Unknown`];
    /// use [`MetaData::from_unknown_string`] for free-form keys.
    pub fn from_known_string(key: MetaDataKey, value: impl Into<String>) -> Result<Self> {
        if key == MetaDataKey::Unknown {
            return Err(Error::InvalidArgument(
                "known-key constructor called with the Unknown sentinel".into(),
            ));
        }

        Ok(Self {
            key,
            key_unknown: None,
            value: MetaDataValue::String(value.into()),
        })
    }

    /// A string entry under a free-form key.
    pub fn from_unknown_string(key_unknown: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: MetaDataKey::Unknown,
            key_unknown: Some(key_unknown.into()),
            value: MetaDataValue::String(value.into()),
        }
    }

    /// A binary entry under a well-known key.
    pub fn from_known_data(key: MetaDataKey, value: Vec<u8>) -> Result<Self> {
        if key == MetaDataKey::Unknown {
            return Err(Error::InvalidArgument(
                "known-key constructor called with the Unknown sentinel".into(),
            ));
        }

        Ok(Self {
            key,
            key_unknown: None,
            value: MetaDataValue::Data(value),
        })
    }

    /// A binary entry under a free-form key.
    pub fn from_unknown_data(key_unknown: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            key: MetaDataKey::Unknown,
            key_unknown: Some(key_unknown.into()),
            value: MetaDataValue::Data(value),
        }
    }

    #[must_use]
    pub fn key(&self) -> MetaDataKey {
        self.key
    }

    /// The free-form key string; present iff `key()` is `Unknown`.
    #[must_use]
    pub fn key_unknown(&self) -> Option<&str> {
        self.key_unknown.as_deref()
    }

    #[must_use]
    pub fn value(&self) -> &MetaDataValue {
        &self.value
    }

    /// The string value, if this is a string entry.
    #[must_use]
    pub fn value_string(&self) -> Option<&str> {
        match &self.value {
            MetaDataValue::String(s) => Some(s),
            MetaDataValue::Data(_) => None,
        }
    }

    /// The binary value, if this is a binary entry.
    #[must_use]
    pub fn value_data(&self) -> Option<&[u8]> {
        match &self.value {
            MetaDataValue::String(_) => None,
            MetaDataValue::Data(d) => Some(d),
        }
    }
}
