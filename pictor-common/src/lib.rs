//! Common types and utilities shared across the pictor image framework.
//!
//! This crate provides the data model used by codecs, the registry, and
//! streaming sessions:
//! - [`PixelFormat`] - canonical pixel formats and bytes-per-line derivation
//! - [`Image`] - one decoded (or to-be-encoded) frame
//! - [`Palette`] - indexed-color lookup tables
//! - [`MetaData`] - ordered key/value metadata entries
//! - [`ReadOptions`] / [`WriteOptions`] - per-session option blocks
//! - [`Error`] / [`ErrorCode`] - the library-wide error type with stable codes

pub mod error;
pub mod image;
pub mod meta_data;
pub mod options;
pub mod pixel_format;

pub use error::{Error, ErrorCode, Result};
pub use image::{Image, ImageProperties, Palette, SourceImage};
pub use meta_data::{MetaData, MetaDataKey, MetaDataValue};
pub use options::{IoOptions, ReadOptions, WriteOptions};
pub use pixel_format::{bytes_per_line, Compression, PixelFormat};
