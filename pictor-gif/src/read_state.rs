//! Per-session GIF decode state and canvas composition.

use crate::decoder::{Disposal, FrameRect, GifReader, Record};
use pictor_common::{
    bytes_per_line, Compression, Error, Image, ImageProperties, IoOptions, MetaData, MetaDataKey,
    PixelFormat, ReadOptions, Result, SourceImage,
};
use pictor_codec::ReadState;
use pictor_io::Io;

// Interlaced row schedule: starting offsets and jumps per pass.
const INTERLACED_OFFSET: [u32; 4] = [0, 4, 2, 1];
const INTERLACED_JUMP: [u32; 4] = [8, 8, 4, 2];

pub(crate) struct GifReadState {
    options: ReadOptions,
    reader: GifReader,

    /// The persistent canvas, `screen_width * screen_height * 4` bytes in
    /// the session's output byte order. Holds the composite of all frames
    /// committed so far.
    canvas: Vec<u8>,

    /// Scratch row of palette indices, `rect.width` long.
    line: Vec<u8>,

    /// Color map of the current frame (local if present, else global).
    palette: Vec<[u8; 3]>,

    current_frame: i64,
    current_pass: i64,
    passes: u32,
    interlaced: bool,

    rect: FrameRect,
    prev_rect: FrameRect,
    disposal: Disposal,
    prev_disposal: Disposal,
    transparency_index: Option<u8>,

    finished: bool,
}

impl GifReadState {
    pub fn new(io: &mut dyn Io, options: ReadOptions) -> Result<Self> {
        let reader = GifReader::new(io)?;

        let width = reader.screen_width() as usize;
        let height = reader.screen_height() as usize;
        if width == 0 || height == 0 {
            return Err(Error::IncorrectImageDimensions);
        }

        // The canvas starts as the global background color if the file has
        // a global palette, fully transparent otherwise.
        let background = match reader.global_palette() {
            Some(palette) => {
                let [r, g, b] = palette
                    .get(reader.background_index() as usize)
                    .copied()
                    .unwrap_or([0, 0, 0]);
                match options.output_pixel_format {
                    PixelFormat::Bgra8888 => [b, g, r, 255],
                    _ => [r, g, b, 255],
                }
            }
            None => [0u8; 4],
        };

        let mut canvas = vec![0u8; width * height * 4];
        for pixel in canvas.chunks_exact_mut(4) {
            pixel.copy_from_slice(&background);
        }

        Ok(Self {
            options,
            reader,
            canvas,
            line: Vec::new(),
            palette: Vec::new(),
            current_frame: -1,
            current_pass: -1,
            passes: 0,
            interlaced: false,
            rect: FrameRect::default(),
            prev_rect: FrameRect::default(),
            disposal: Disposal::Unspecified,
            prev_disposal: Disposal::Unspecified,
            transparency_index: None,
            finished: false,
        })
    }

    /// Clears the previous sub-frame's rectangle to fully transparent.
    fn dispose_to_background(&mut self) {
        let stride = self.reader.screen_width() as usize * 4;
        let rect = self.prev_rect;

        for row in rect.top..rect.top + rect.height {
            let start = row as usize * stride + rect.left as usize * 4;
            let end = start + rect.width as usize * 4;
            self.canvas[start..end].fill(0);
        }
    }

    /// Decodes one sub-frame row into `self.line` and composites it onto
    /// `scan` at the sub-frame's column offset, honoring transparency.
    fn composite_row(&mut self, io: &mut dyn Io, row: u32, scan: &mut [u8]) -> Result<()> {
        self.reader.read_line(io, &mut self.line)?;

        let bgra = self.options.output_pixel_format == PixelFormat::Bgra8888;
        let stride = self.reader.screen_width() as usize * 4;
        let row_start = row as usize * stride + self.rect.left as usize * 4;

        for (i, &index) in self.line.iter().enumerate() {
            if Some(index) == self.transparency_index {
                continue;
            }

            let [r, g, b] = *self.palette.get(index as usize).ok_or_else(|| {
                Error::UnderlyingCodec(format!("palette index {index} out of range"))
            })?;

            let pixel = &mut scan[row_start + i * 4..row_start + i * 4 + 4];
            if bgra {
                pixel.copy_from_slice(&[b, g, r, 255]);
            } else {
                pixel.copy_from_slice(&[r, g, b, 255]);
            }
        }

        Ok(())
    }
}

impl ReadState for GifReadState {
    fn seek_next_frame(&mut self, io: &mut dyn Io) -> Result<Image> {
        if self.finished {
            return Err(Error::StateError("session already finished".into()));
        }

        self.current_frame += 1;
        self.prev_disposal = self.disposal;
        self.prev_rect = self.rect;
        self.disposal = Disposal::Unspecified;
        self.transparency_index = None;

        let mut image = Image::new();
        image.width = self.reader.screen_width();
        image.height = self.reader.screen_height();

        let mut source = SourceImage {
            compression: Some(Compression::Lzw),
            pixel_format: Some(PixelFormat::Indexed8),
            properties: ImageProperties::empty(),
        };

        let want_meta_data = self.options.io_options.contains(IoOptions::META_DATA);

        loop {
            match self.reader.next_record(io)? {
                Record::GraphicControl(gc) => {
                    self.disposal = gc.disposal;
                    self.transparency_index = gc.transparency_index;

                    // Delay is in centiseconds. Zero means "as fast as
                    // possible", which renders frames invisible on modern
                    // hardware; remap it to 100 ms.
                    image.delay_ms = if gc.delay_cs == 0 {
                        100
                    } else {
                        u32::from(gc.delay_cs) * 10
                    };
                }

                Record::Comment(text) => {
                    if want_meta_data {
                        image
                            .meta_data
                            .push(MetaData::from_known_string(MetaDataKey::Comment, text)?);
                    }
                }

                Record::Application { identifier, data } => {
                    if want_meta_data {
                        image
                            .meta_data
                            .push(MetaData::from_unknown_data(identifier, data));
                    }
                }

                Record::OtherExtension => {}

                Record::Trailer => return Err(Error::NoMoreFrames),

                Record::Image(desc) => {
                    if desc.rect.left + desc.rect.width > image.width
                        || desc.rect.top + desc.rect.height > image.height
                    {
                        return Err(Error::IncorrectImageDimensions);
                    }

                    self.palette = match desc.local_palette {
                        Some(palette) => palette,
                        None => self
                            .reader
                            .global_palette()
                            .ok_or(Error::MissingPalette)?
                            .to_vec(),
                    };

                    self.rect = desc.rect;
                    self.interlaced = desc.interlaced;

                    image.animated = self.current_frame > 0;
                    image.pixel_format = self.options.output_pixel_format;
                    image.bytes_per_line = bytes_per_line(image.width, image.pixel_format)?;

                    if desc.interlaced {
                        image.passes = 4;
                        source.properties |= ImageProperties::INTERLACED;
                    } else {
                        image.passes = 1;
                    }

                    self.passes = image.passes;
                    self.current_pass = -1;
                    self.line = vec![0u8; desc.rect.width as usize];
                    self.reader.begin_image_data(io)?;
                    break;
                }
            }
        }

        image.source_image = Some(source);

        if self.current_frame == 0 {
            tracing::debug!(
                "GIF: input pixel format is {}, output pixel format is {}",
                PixelFormat::Indexed8,
                image.pixel_format
            );
        }

        Ok(image)
    }

    fn seek_next_pass(&mut self, _io: &mut dyn Io, _image: &Image) -> Result<()> {
        if self.finished {
            return Err(Error::StateError("session already finished".into()));
        }

        self.current_pass += 1;
        Ok(())
    }

    fn read_frame(&mut self, io: &mut dyn Io, image: &Image, pixels: &mut [u8]) -> Result<()> {
        if self.finished {
            return Err(Error::StateError("session already finished".into()));
        }
        if pixels.len() != self.canvas.len() {
            return Err(Error::InvalidArgument(format!(
                "pixel buffer holds {} bytes, expected {}",
                pixels.len(),
                self.canvas.len()
            )));
        }

        // First pass: apply the previous frame's disposal to the canvas,
        // then seed the output with the composed canvas so rows this pass
        // does not reach still show the previous composite.
        if self.current_pass == 0 {
            if self.current_frame > 0 {
                match self.prev_disposal {
                    Disposal::RestoreBackground => self.dispose_to_background(),
                    Disposal::RestorePrevious => {
                        tracing::debug!("GIF: RESTORE_PREVIOUS disposal treated as DO_NOT_DISPOSE");
                    }
                    Disposal::Unspecified | Disposal::DoNotDispose => {}
                }
            }

            pixels.copy_from_slice(&self.canvas);
        }

        let rect = self.rect;
        if self.interlaced {
            let pass = self.current_pass.clamp(0, 3) as usize;
            let mut row = rect.top + INTERLACED_OFFSET[pass];
            while row < rect.top + rect.height {
                self.composite_row(io, row, pixels)?;
                row += INTERLACED_JUMP[pass];
            }
        } else {
            for row in rect.top..rect.top + rect.height {
                self.composite_row(io, row, pixels)?;
            }
        }

        // Last pass: the frame is complete; commit it to the canvas and
        // position the stream at the next record.
        if self.current_pass + 1 == i64::from(self.passes) {
            self.canvas.copy_from_slice(pixels);
            self.reader.finish_image_data(io)?;
        }

        Ok(())
    }

    fn finish(&mut self, _io: &mut dyn Io) -> Result<()> {
        self.finished = true;
        self.line = Vec::new();
        self.palette = Vec::new();
        Ok(())
    }
}
