//! Low-level GIF container parsing.
//!
//! [`GifReader`] walks the container record by record: header, logical
//! screen descriptor, color tables, image descriptors, extensions, and the
//! trailer. Image data is LZW-compressed in a chain of length-prefixed
//! sub-blocks; [`GifReader::read_line`] streams those sub-blocks through an
//! incremental `weezl` decoder and hands back one row of palette indices at
//! a time, which is all the composition layer ever needs in memory.
//!
//! # Container layout
//!
//! ```text
//! +------------------+
//! | "GIF87a"/"GIF89a"|  6 bytes
//! +------------------+
//! | logical screen   |  width u16le, height u16le, packed, background, aspect
//! | descriptor       |
//! +------------------+
//! | global color map |  3 * 2^(n+1) bytes, if the packed flag says so
//! +------------------+
//! | records...       |  0x2C image, 0x21 extension, 0x3B trailer
//! +------------------+
//! ```

use pictor_common::{Error, Result};
use pictor_io::{Io, ReadBuffer};
use weezl::{decode::Decoder as LzwDecoder, BitOrder, LzwStatus};

/// Frame disposal methods from the graphic control extension.
///
/// `RestoreBackground` is treated as "restore to fully transparent". GIF89a
/// says "background color", but decoders in the wild treat it as
/// transparent, and this driver follows that consensus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Disposal {
    #[default]
    Unspecified,
    DoNotDispose,
    RestoreBackground,
    /// Not implemented; treated as [`Disposal::DoNotDispose`].
    RestorePrevious,
}

impl Disposal {
    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::DoNotDispose,
            2 => Self::RestoreBackground,
            3 => Self::RestorePrevious,
            _ => Self::Unspecified,
        }
    }
}

/// Parsed graphic control extension, applying to the next image record.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GraphicControl {
    pub disposal: Disposal,
    pub delay_cs: u16,
    pub transparency_index: Option<u8>,
}

/// A sub-frame rectangle on the logical canvas.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FrameRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// One image descriptor record.
#[derive(Debug)]
pub(crate) struct ImageDescriptor {
    pub rect: FrameRect,
    pub interlaced: bool,
    pub local_palette: Option<Vec<[u8; 3]>>,
}

/// One record from the container stream.
#[derive(Debug)]
pub(crate) enum Record {
    Image(ImageDescriptor),
    GraphicControl(GraphicControl),
    Comment(String),
    Application { identifier: String, data: Vec<u8> },
    /// A recognized but irrelevant extension, already skipped.
    OtherExtension,
    Trailer,
}

pub(crate) struct GifReader {
    buf: ReadBuffer,
    screen_width: u32,
    screen_height: u32,
    global_palette: Option<Vec<[u8; 3]>>,
    background_index: u8,

    // Image-data streaming state, valid between begin_image_data and
    // finish_image_data.
    lzw: Option<LzwDecoder>,
    block: Vec<u8>,
    block_pos: usize,
    data_done: bool,
    lzw_done: bool,
}

impl GifReader {
    /// Parses the header, logical screen descriptor, and global color
    /// table. `io` must be positioned at the start of the file.
    pub fn new(io: &mut dyn Io) -> Result<Self> {
        let mut buf = ReadBuffer::new();

        let mut header = [0u8; 6];
        buf.read_bytes(io, &mut header)
            .map_err(|_| Error::UnderlyingCodec("truncated GIF header".into()))?;

        if &header != b"GIF87a" && &header != b"GIF89a" {
            return Err(Error::UnderlyingCodec("not a GIF file".into()));
        }

        let screen_width = u32::from(buf.read_u16_le(io)?);
        let screen_height = u32::from(buf.read_u16_le(io)?);
        let packed = buf.read_u8(io)?;
        let background_index = buf.read_u8(io)?;
        let _aspect_ratio = buf.read_u8(io)?;

        let mut reader = Self {
            buf,
            screen_width,
            screen_height,
            global_palette: None,
            background_index,
            lzw: None,
            block: Vec::new(),
            block_pos: 0,
            data_done: false,
            lzw_done: false,
        };

        if packed & 0x80 != 0 {
            let entries = 2usize << (packed & 0x07);
            reader.global_palette = Some(reader.read_palette(io, entries)?);
        }

        tracing::debug!(
            "GIF screen {}x{}, global palette: {}",
            screen_width,
            screen_height,
            reader.global_palette.is_some()
        );

        Ok(reader)
    }

    pub fn screen_width(&self) -> u32 {
        self.screen_width
    }

    pub fn screen_height(&self) -> u32 {
        self.screen_height
    }

    pub fn global_palette(&self) -> Option<&[[u8; 3]]> {
        self.global_palette.as_deref()
    }

    pub fn background_index(&self) -> u8 {
        self.background_index
    }

    fn read_palette(&mut self, io: &mut dyn Io, entries: usize) -> Result<Vec<[u8; 3]>> {
        let mut palette = vec![[0u8; 3]; entries];
        for color in &mut palette {
            self.buf.read_bytes(io, color)?;
        }
        Ok(palette)
    }

    /// Reads the next record. After [`Record::Image`] the caller must run
    /// [`Self::begin_image_data`] / [`Self::read_line`] /
    /// [`Self::finish_image_data`] before asking for another record.
    pub fn next_record(&mut self, io: &mut dyn Io) -> Result<Record> {
        let introducer = self.buf.read_u8(io)?;

        match introducer {
            0x2C => self.read_image_descriptor(io).map(Record::Image),
            0x21 => self.read_extension(io),
            0x3B => Ok(Record::Trailer),
            other => Err(Error::UnderlyingCodec(format!(
                "unknown block introducer 0x{other:02X}"
            ))),
        }
    }

    fn read_image_descriptor(&mut self, io: &mut dyn Io) -> Result<ImageDescriptor> {
        let left = u32::from(self.buf.read_u16_le(io)?);
        let top = u32::from(self.buf.read_u16_le(io)?);
        let width = u32::from(self.buf.read_u16_le(io)?);
        let height = u32::from(self.buf.read_u16_le(io)?);
        let packed = self.buf.read_u8(io)?;

        let interlaced = packed & 0x40 != 0;
        let local_palette = if packed & 0x80 != 0 {
            let entries = 2usize << (packed & 0x07);
            Some(self.read_palette(io, entries)?)
        } else {
            None
        };

        Ok(ImageDescriptor {
            rect: FrameRect {
                left,
                top,
                width,
                height,
            },
            interlaced,
            local_palette,
        })
    }

    fn read_extension(&mut self, io: &mut dyn Io) -> Result<Record> {
        let label = self.buf.read_u8(io)?;

        match label {
            // Graphic control.
            0xF9 => {
                let block = self.read_sub_block(io)?;
                if block.len() < 4 {
                    return Err(Error::UnderlyingCodec(
                        "short graphic control extension".into(),
                    ));
                }

                let packed = block[0];
                let delay_cs = u16::from_le_bytes([block[1], block[2]]);
                let transparency_index = (packed & 0x01 != 0).then_some(block[3]);

                self.skip_sub_blocks(io)?;

                Ok(Record::GraphicControl(GraphicControl {
                    disposal: Disposal::from_bits((packed >> 2) & 0x07),
                    delay_cs,
                    transparency_index,
                }))
            }

            // Comment.
            0xFE => {
                let data = self.read_sub_blocks(io)?;
                Ok(Record::Comment(
                    String::from_utf8_lossy(&data).into_owned(),
                ))
            }

            // Application.
            0xFF => {
                let header = self.read_sub_block(io)?;
                let identifier = String::from_utf8_lossy(&header).into_owned();
                let data = self.read_sub_blocks(io)?;
                Ok(Record::Application { identifier, data })
            }

            // Plain text and anything else: skip the payload.
            _ => {
                self.skip_sub_blocks(io)?;
                Ok(Record::OtherExtension)
            }
        }
    }

    /// Reads one length-prefixed sub-block; empty on the terminator.
    fn read_sub_block(&mut self, io: &mut dyn Io) -> Result<Vec<u8>> {
        let len = self.buf.read_u8(io)? as usize;
        let mut data = vec![0u8; len];
        if len > 0 {
            self.buf.read_bytes(io, &mut data)?;
        }
        Ok(data)
    }

    /// Reads and concatenates sub-blocks up to the terminator.
    fn read_sub_blocks(&mut self, io: &mut dyn Io) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        loop {
            let block = self.read_sub_block(io)?;
            if block.is_empty() {
                return Ok(data);
            }
            data.extend_from_slice(&block);
        }
    }

    /// Discards sub-blocks up to the terminator.
    fn skip_sub_blocks(&mut self, io: &mut dyn Io) -> Result<()> {
        loop {
            let len = self.buf.read_u8(io)? as usize;
            if len == 0 {
                return Ok(());
            }
            self.buf.skip(io, len)?;
        }
    }

    /// Starts streaming the image data that follows an image descriptor.
    pub fn begin_image_data(&mut self, io: &mut dyn Io) -> Result<()> {
        let min_code_size = self.buf.read_u8(io)?;
        if min_code_size > 11 {
            return Err(Error::UnderlyingCodec(format!(
                "invalid LZW minimum code size {min_code_size}"
            )));
        }

        self.lzw = Some(LzwDecoder::new(BitOrder::Lsb, min_code_size));
        self.block.clear();
        self.block_pos = 0;
        self.data_done = false;
        self.lzw_done = false;
        Ok(())
    }

    /// Decodes exactly `out.len()` palette indices (one row of the
    /// sub-frame), pulling sub-blocks from the stream as needed.
    pub fn read_line(&mut self, io: &mut dyn Io, out: &mut [u8]) -> Result<()> {
        let mut filled = 0;

        while filled < out.len() {
            if self.lzw_done {
                return Err(Error::UnderlyingCodec(
                    "image data ended before the sub-frame was complete".into(),
                ));
            }

            if self.block_pos == self.block.len() && !self.data_done {
                let len = self.buf.read_u8(io)? as usize;
                if len == 0 {
                    self.data_done = true;
                } else {
                    self.block.resize(len, 0);
                    self.buf.read_bytes(io, &mut self.block)?;
                    self.block_pos = 0;
                }
                continue;
            }

            let Some(lzw) = self.lzw.as_mut() else {
                return Err(Error::StateError("image data not started".into()));
            };

            let input: &[u8] = if self.data_done {
                &[]
            } else {
                &self.block[self.block_pos..]
            };

            let result = lzw.decode_bytes(input, &mut out[filled..]);
            self.block_pos += result.consumed_in;
            filled += result.consumed_out;

            match result.status {
                Ok(LzwStatus::Ok) => {}
                Ok(LzwStatus::Done) => self.lzw_done = true,
                Ok(LzwStatus::NoProgress) => {
                    if self.data_done {
                        self.lzw_done = true;
                    }
                }
                Err(e) => {
                    return Err(Error::UnderlyingCodec(format!("LZW: {e}")));
                }
            }
        }

        Ok(())
    }

    /// Drains whatever image data is left so the stream is positioned at
    /// the next record.
    pub fn finish_image_data(&mut self, io: &mut dyn Io) -> Result<()> {
        self.lzw = None;

        if !self.data_done {
            self.skip_sub_blocks(io)?;
            self.data_done = true;
        }

        Ok(())
    }
}
