//! Session state machine tests against a minimal in-test codec.
//!
//! The mock "flat" codec produces a fixed number of solid 2x2 RGBA frames
//! on read and accepts RGBA frames on write, writing their bytes straight
//! to the stream. It exists to exercise the session layer's ordering
//! rules, which hold for every codec.

use pictor::{ReadSession, WriteSession};
use pictor_codec::{
    Codec, CodecFeatures, ReadFeatures, ReadState, WriteFeatures, WriteState,
};
use pictor_common::{
    Compression, Error, ErrorCode, Image, PixelFormat, ReadOptions, Result, WriteOptions,
};
use pictor_io::{Io, MemReadIo, MemWriteIo};
use std::sync::Arc;

struct FlatCodec {
    frames: u32,
}

impl Codec for FlatCodec {
    fn read_features(&self) -> ReadFeatures {
        ReadFeatures {
            default_output_pixel_format: PixelFormat::Rgba8888,
            output_pixel_formats: vec![PixelFormat::Rgba8888],
            features: CodecFeatures::STATIC | CodecFeatures::ANIMATED,
        }
    }

    fn write_features(&self) -> WriteFeatures {
        WriteFeatures {
            pixel_formats: vec![PixelFormat::Rgba8888],
            compressions: vec![Compression::None],
            default_compression: Compression::None,
            features: CodecFeatures::STATIC,
        }
    }

    fn read_init(&self, _io: &mut dyn Io, options: &ReadOptions) -> Result<Box<dyn ReadState>> {
        if !self
            .read_features()
            .supports_output(options.output_pixel_format)
        {
            return Err(Error::UnsupportedPixelFormat(options.output_pixel_format));
        }

        Ok(Box::new(FlatReadState {
            remaining: self.frames,
            produced: 0,
        }))
    }

    fn write_init(&self, _io: &mut dyn Io, options: &WriteOptions) -> Result<Box<dyn WriteState>> {
        if !self
            .write_features()
            .supports_pixel_format(options.input_pixel_format)
        {
            return Err(Error::UnsupportedPixelFormat(options.input_pixel_format));
        }

        Ok(Box::new(FlatWriteState))
    }
}

struct FlatReadState {
    remaining: u32,
    produced: u32,
}

impl ReadState for FlatReadState {
    fn seek_next_frame(&mut self, _io: &mut dyn Io) -> Result<Image> {
        if self.remaining == 0 {
            return Err(Error::NoMoreFrames);
        }
        self.remaining -= 1;
        self.produced += 1;

        let mut image = Image::with_dimensions(2, 2, PixelFormat::Rgba8888)?;
        image.animated = self.produced > 1;
        Ok(image)
    }

    fn seek_next_pass(&mut self, _io: &mut dyn Io, _image: &Image) -> Result<()> {
        Ok(())
    }

    fn read_frame(&mut self, _io: &mut dyn Io, _image: &Image, pixels: &mut [u8]) -> Result<()> {
        pixels.fill(self.produced as u8);
        Ok(())
    }

    fn finish(&mut self, _io: &mut dyn Io) -> Result<()> {
        Ok(())
    }
}

struct FlatWriteState;

impl WriteState for FlatWriteState {
    fn seek_next_frame(&mut self, _io: &mut dyn Io, image: &Image) -> Result<()> {
        if image.pixel_format != PixelFormat::Rgba8888 {
            return Err(Error::UnsupportedPixelFormat(image.pixel_format));
        }
        Ok(())
    }

    fn seek_next_pass(&mut self, _io: &mut dyn Io, _image: &Image) -> Result<()> {
        Ok(())
    }

    fn write_frame(&mut self, io: &mut dyn Io, _image: &Image, pixels: &[u8]) -> Result<()> {
        let written = io.write(pixels, 1, pixels.len())?;
        if written != pixels.len() {
            return Err(Error::Eof);
        }
        Ok(())
    }

    fn finish(&mut self, _io: &mut dyn Io) -> Result<()> {
        Ok(())
    }
}

fn read_session(frames: u32) -> ReadSession<MemReadIo> {
    let codec = Arc::new(FlatCodec { frames });
    let io = MemReadIo::new(Vec::new());
    ReadSession::new(codec, io, ReadOptions::default()).unwrap()
}

#[test]
fn test_next_frame_loop_terminates_with_none() {
    let mut session = read_session(2);

    let first = session.next_frame().unwrap().unwrap();
    assert!(!first.animated);
    assert_eq!(first.pixels, vec![1u8; 16]);

    let second = session.next_frame().unwrap().unwrap();
    assert!(second.animated);
    assert_eq!(second.pixels, vec![2u8; 16]);

    assert!(session.next_frame().unwrap().is_none());
    // The drained session stays drained.
    assert!(session.next_frame().unwrap().is_none());

    session.finish().unwrap();
}

#[test]
fn test_out_of_order_calls_fail_with_state_error() {
    let mut session = read_session(1);
    let mut pixels = vec![0u8; 16];

    // No frame sought yet.
    assert_eq!(
        session.seek_next_pass().unwrap_err().code(),
        ErrorCode::StateError
    );
    assert_eq!(
        session.read_frame(&mut pixels).unwrap_err().code(),
        ErrorCode::StateError
    );

    let image = session.seek_next_frame().unwrap();
    assert_eq!(image.passes, 1);

    // A second seek_next_frame mid-frame is out of order.
    assert_eq!(
        session.seek_next_frame().unwrap_err().code(),
        ErrorCode::StateError
    );

    // read_frame before seek_next_pass is out of order.
    assert_eq!(
        session.read_frame(&mut pixels).unwrap_err().code(),
        ErrorCode::StateError
    );

    session.seek_next_pass().unwrap();

    // seek_next_pass twice in a row is out of order.
    assert_eq!(
        session.seek_next_pass().unwrap_err().code(),
        ErrorCode::StateError
    );

    session.read_frame(&mut pixels).unwrap();
    session.finish().unwrap();
}

#[test]
fn test_wrong_buffer_size_fails_the_session() {
    let mut session = read_session(1);
    session.seek_next_frame().unwrap();
    session.seek_next_pass().unwrap();

    let mut short = vec![0u8; 3];
    assert_eq!(
        session.read_frame(&mut short).unwrap_err().code(),
        ErrorCode::InvalidArgument
    );

    // After a failure only finish is valid.
    let mut pixels = vec![0u8; 16];
    assert_eq!(
        session.read_frame(&mut pixels).unwrap_err().code(),
        ErrorCode::StateError
    );
    session.finish().unwrap();
}

#[test]
fn test_finish_from_every_state() {
    // Right after init.
    read_session(1).finish().unwrap();

    // Mid-frame.
    let mut session = read_session(1);
    session.seek_next_frame().unwrap();
    session.finish().unwrap();

    // Mid-pass.
    let mut session = read_session(1);
    session.seek_next_frame().unwrap();
    session.seek_next_pass().unwrap();
    session.finish().unwrap();

    // Dropping an unfinished session must not panic either.
    let mut session = read_session(1);
    session.seek_next_frame().unwrap();
    drop(session);
}

#[test]
fn test_write_round_trip_through_memory() {
    let codec = Arc::new(FlatCodec { frames: 0 });
    let mut io = MemWriteIo::new(64);

    let mut image = Image::with_dimensions(2, 2, PixelFormat::Rgba8888).unwrap();
    image.allocate_pixels();
    image.pixels.copy_from_slice(&[7u8; 16]);

    // Lend the stream to the session; recover the bytes afterwards.
    let mut session = WriteSession::new(codec, &mut io, WriteOptions::default()).unwrap();
    session.next_frame(&image).unwrap();
    session.finish().unwrap();

    assert_eq!(io.accessible_length(), 16);
    assert_eq!(io.into_inner(), vec![7u8; 16]);
}

#[test]
fn test_write_rejects_undeclared_pixel_format() {
    let codec = Arc::new(FlatCodec { frames: 0 });
    let io = MemWriteIo::new(64);

    let err = WriteSession::new(
        codec.clone(),
        io,
        WriteOptions {
            input_pixel_format: PixelFormat::Rgb888,
            ..WriteOptions::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnsupportedPixelFormat);

    // Per-frame validation too: the header's declared format must match
    // the codec's write capabilities.
    let mut session =
        WriteSession::new(codec, MemWriteIo::new(64), WriteOptions::default()).unwrap();
    let mut image = Image::with_dimensions(2, 2, PixelFormat::Bgra8888).unwrap();
    image.allocate_pixels();

    assert_eq!(
        session.next_frame(&image).unwrap_err().code(),
        ErrorCode::UnsupportedPixelFormat
    );

    // After the failure only finish is valid.
    assert_eq!(
        session.seek_next_pass().unwrap_err().code(),
        ErrorCode::StateError
    );
    session.finish().unwrap();
}

#[test]
fn test_write_out_of_order_calls() {
    let codec = Arc::new(FlatCodec { frames: 0 });
    let mut session =
        WriteSession::new(codec, MemWriteIo::new(64), WriteOptions::default()).unwrap();

    assert_eq!(
        session.seek_next_pass().unwrap_err().code(),
        ErrorCode::StateError
    );
    assert_eq!(
        session.write_frame(&[0u8; 16]).unwrap_err().code(),
        ErrorCode::StateError
    );

    session.finish().unwrap();
}
