//! In-memory GIF construction for decoder tests.
//!
//! Builds syntactically valid GIF89a streams: logical screen descriptor,
//! optional global palette, graphic control / comment / application
//! extensions, and LZW-compressed image data (via `weezl`'s encoder, the
//! counterpart of the decoder the driver uses). Interlaced frames are
//! written with their rows in interlace order, as a real encoder would.

use weezl::{encode::Encoder as LzwEncoder, BitOrder};

const INTERLACED_OFFSET: [usize; 4] = [0, 4, 2, 1];
const INTERLACED_JUMP: [usize; 4] = [8, 8, 4, 2];

pub struct GifBuilder {
    width: u16,
    height: u16,
    global_palette: Option<Vec<[u8; 3]>>,
    background_index: u8,
    records: Vec<u8>,
}

fn palette_size_field(entries: usize) -> (u8, usize) {
    // Color tables hold a power-of-two number of entries, minimum 2.
    let mut size = 0u8;
    let mut stored = 2usize;
    while stored < entries {
        size += 1;
        stored <<= 1;
    }
    (size, stored)
}

fn write_palette(out: &mut Vec<u8>, palette: &[[u8; 3]], stored: usize) {
    for color in palette {
        out.extend_from_slice(color);
    }
    for _ in palette.len()..stored {
        out.extend_from_slice(&[0, 0, 0]);
    }
}

fn min_code_size(palette_entries: usize) -> u8 {
    let mut bits = 2u8;
    while (1usize << bits) < palette_entries {
        bits += 1;
    }
    bits
}

fn write_sub_blocks(out: &mut Vec<u8>, data: &[u8]) {
    for chunk in data.chunks(255) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
    out.push(0);
}

impl GifBuilder {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            global_palette: None,
            background_index: 0,
            records: Vec::new(),
        }
    }

    pub fn global_palette(mut self, palette: &[[u8; 3]]) -> Self {
        self.global_palette = Some(palette.to_vec());
        self
    }

    pub fn background_index(mut self, index: u8) -> Self {
        self.background_index = index;
        self
    }

    /// Emits a graphic control extension applying to the next frame.
    pub fn graphic_control(
        mut self,
        disposal: u8,
        delay_cs: u16,
        transparency_index: Option<u8>,
    ) -> Self {
        let mut packed = (disposal & 0x07) << 2;
        if transparency_index.is_some() {
            packed |= 0x01;
        }

        self.records.push(0x21);
        self.records.push(0xF9);
        self.records.push(4);
        self.records.push(packed);
        self.records.extend_from_slice(&delay_cs.to_le_bytes());
        self.records.push(transparency_index.unwrap_or(0));
        self.records.push(0);
        self
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.records.push(0x21);
        self.records.push(0xFE);
        write_sub_blocks(&mut self.records, text.as_bytes());
        self
    }

    pub fn application(mut self, identifier: &[u8; 11], data: &[u8]) -> Self {
        self.records.push(0x21);
        self.records.push(0xFF);
        self.records.push(11);
        self.records.extend_from_slice(identifier);
        write_sub_blocks(&mut self.records, data);
        self
    }

    /// Emits an image record. `indices` are the sub-frame's palette
    /// indices in display (row-major) order, `width * height` of them.
    pub fn frame(mut self, frame: Frame<'_>) -> Self {
        let Frame {
            left,
            top,
            width,
            height,
            indices,
            interlaced,
            local_palette,
        } = frame;
        assert_eq!(indices.len(), width as usize * height as usize);

        self.records.push(0x2C);
        self.records.extend_from_slice(&left.to_le_bytes());
        self.records.extend_from_slice(&top.to_le_bytes());
        self.records.extend_from_slice(&width.to_le_bytes());
        self.records.extend_from_slice(&height.to_le_bytes());

        let mut packed = 0u8;
        if interlaced {
            packed |= 0x40;
        }

        let palette_entries = match local_palette {
            Some(palette) => {
                let (size, stored) = palette_size_field(palette.len());
                packed |= 0x80 | size;
                self.records.push(packed);
                write_palette(&mut self.records, palette, stored);
                palette.len()
            }
            None => {
                self.records.push(packed);
                self.global_palette
                    .as_ref()
                    .map(|p| p.len())
                    .unwrap_or(256)
            }
        };

        // Stream rows in interlace order when requested.
        let row_bytes = width as usize;
        let mut ordered = Vec::with_capacity(indices.len());
        if interlaced {
            for pass in 0..4 {
                let mut row = INTERLACED_OFFSET[pass];
                while row < height as usize {
                    ordered.extend_from_slice(&indices[row * row_bytes..(row + 1) * row_bytes]);
                    row += INTERLACED_JUMP[pass];
                }
            }
        } else {
            ordered.extend_from_slice(indices);
        }

        let code_size = min_code_size(palette_entries);
        let compressed = LzwEncoder::new(BitOrder::Lsb, code_size)
            .encode(&ordered)
            .expect("LZW encoding of test data");

        self.records.push(code_size);
        write_sub_blocks(&mut self.records, &compressed);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut gif = Vec::new();
        gif.extend_from_slice(b"GIF89a");
        gif.extend_from_slice(&self.width.to_le_bytes());
        gif.extend_from_slice(&self.height.to_le_bytes());

        match &self.global_palette {
            Some(palette) => {
                let (size, stored) = palette_size_field(palette.len());
                gif.push(0x80 | size);
                gif.push(self.background_index);
                gif.push(0);
                write_palette(&mut gif, palette, stored);
            }
            None => {
                gif.push(0);
                gif.push(self.background_index);
                gif.push(0);
            }
        }

        gif.extend_from_slice(&self.records);
        gif.push(0x3B);
        gif
    }
}

/// Parameters of one image record.
pub struct Frame<'a> {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    pub indices: &'a [u8],
    pub interlaced: bool,
    pub local_palette: Option<&'a [[u8; 3]]>,
}

impl<'a> Frame<'a> {
    /// A full-canvas, non-interlaced frame using the global palette.
    pub fn simple(width: u16, height: u16, indices: &'a [u8]) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
            indices,
            interlaced: false,
            local_palette: None,
        }
    }
}
