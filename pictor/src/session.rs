//! Streaming read and write sessions.
//!
//! A session binds one loaded codec to one I/O stream and drives the
//! codec's entry points through a strict state machine:
//!
//! ```text
//! init -> BetweenFrames -(seek_next_frame)-> PassPending
//!         PassPending   -(seek_next_pass)->  PassReady
//!         PassReady     -(read/write_frame)->PassPending | BetweenFrames
//!         any           -(finish)->          Finished
//! ```
//!
//! Any out-of-order call fails with `StateError`, and any codec error
//! leaves the session in a state where only `finish` is valid. The session
//! does not retry I/O; transient errors surface to the caller.
//!
//! Sessions are generic over the stream. Pass an owned stream
//! ([`pictor_io::FileIo`], [`pictor_io::MemReadIo`], ...) to transfer
//! ownership to the session, or a `&mut` stream to lend it for the
//! session's lifetime and keep it afterwards (the usual shape for memory
//! writes, where the caller recovers the buffer once the session is done).
//!
//! `finish` consumes the session, releasing codec state and closing the
//! I/O; dropping an unfinished session finishes it as a last resort, so
//! codec state is released on every exit path.

use pictor_codec::{Codec, ReadState, WriteState};
use pictor_common::{Error, Image, ReadOptions, Result, WriteOptions};
use pictor_io::Io;
use std::fmt;
use std::sync::Arc;

/// Where a session is in its frame/pass cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No frame in progress; `seek_next_frame` is valid.
    BetweenFrames,
    /// A frame is in progress; `seek_next_pass` is valid.
    PassPending,
    /// A pass is prepared; `read_frame`/`write_frame` is valid.
    PassReady,
    /// The codec reported `NoMoreFrames`; only `finish` is valid.
    Drained,
    /// An error occurred; only `finish` is valid.
    Failed,
    /// `finish` ran.
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BetweenFrames => write!(f, "BetweenFrames"),
            Self::PassPending => write!(f, "PassPending"),
            Self::PassReady => write!(f, "PassReady"),
            Self::Drained => write!(f, "Drained"),
            Self::Failed => write!(f, "Failed"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

fn state_error(operation: &str, phase: Phase) -> Error {
    Error::StateError(format!("{operation} called in state {phase}"))
}

/// A live streaming decode operation.
pub struct ReadSession<S: Io> {
    // Holding the Arc keeps the implementation alive even across
    // Registry::unload_codecs.
    _codec: Arc<dyn Codec>,
    state: Box<dyn ReadState>,
    io: S,
    phase: Phase,
    /// Header of the frame in progress, pixels left empty.
    header: Option<Image>,
    passes_left: u32,
}

impl<S: Io> ReadSession<S> {
    /// Starts a decode operation: runs the codec's `read_init` on `io`
    /// with a deep copy of `options`.
    pub fn new(codec: Arc<dyn Codec>, mut io: S, options: ReadOptions) -> Result<Self> {
        let state = codec.read_init(&mut io, &options)?;

        Ok(Self {
            _codec: codec,
            state,
            io,
            phase: Phase::BetweenFrames,
            header: None,
            passes_left: 0,
        })
    }

    /// Advances to the next frame and returns its header.
    ///
    /// `NoMoreFrames` is the normal end of the stream; after it, only
    /// [`ReadSession::finish`] is valid.
    pub fn seek_next_frame(&mut self) -> Result<Image> {
        match self.phase {
            Phase::BetweenFrames => {}
            Phase::Drained => return Err(Error::NoMoreFrames),
            phase => return Err(state_error("seek_next_frame", phase)),
        }

        match self.state.seek_next_frame(&mut self.io) {
            Ok(image) => {
                self.passes_left = image.passes.max(1);
                self.header = Some(image.clone());
                self.phase = Phase::PassPending;
                Ok(image)
            }
            Err(Error::NoMoreFrames) => {
                self.phase = Phase::Drained;
                Err(Error::NoMoreFrames)
            }
            Err(e) => {
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    /// Prepares the next pass of the current frame. Called exactly
    /// `image.passes` times per frame, each followed by one
    /// [`ReadSession::read_frame`].
    pub fn seek_next_pass(&mut self) -> Result<()> {
        if self.phase != Phase::PassPending {
            return Err(state_error("seek_next_pass", self.phase));
        }

        let header = self
            .header
            .as_ref()
            .ok_or_else(|| Error::StateError("no frame in progress".into()))?;

        match self.state.seek_next_pass(&mut self.io, header) {
            Ok(()) => {
                self.phase = Phase::PassReady;
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    /// Decodes one pass into `pixels`, which must hold
    /// `bytes_per_line * height` bytes of the current frame.
    pub fn read_frame(&mut self, pixels: &mut [u8]) -> Result<()> {
        if self.phase != Phase::PassReady {
            return Err(state_error("read_frame", self.phase));
        }

        let header = self
            .header
            .as_ref()
            .ok_or_else(|| Error::StateError("no frame in progress".into()))?;

        if pixels.len() != header.pixels_size() {
            self.phase = Phase::Failed;
            return Err(Error::InvalidArgument(format!(
                "pixel buffer holds {} bytes, frame needs {}",
                pixels.len(),
                header.pixels_size()
            )));
        }

        match self.state.read_frame(&mut self.io, header, pixels) {
            Ok(()) => {
                self.passes_left -= 1;
                self.phase = if self.passes_left == 0 {
                    self.header = None;
                    Phase::BetweenFrames
                } else {
                    Phase::PassPending
                };
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    /// Decodes one whole frame: header, pixel allocation, every pass.
    ///
    /// Returns `Ok(None)` when the stream has no further frames.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pictor::Registry;
    /// use pictor_io::FileIo;
    ///
    /// let registry = Registry::load();
    /// let io = FileIo::open("animation.gif")?;
    /// let mut session = registry.start_reading(io, None, None)?;
    ///
    /// while let Some(frame) = session.next_frame()? {
    ///     println!("{}x{} frame, {} ms", frame.width, frame.height, frame.delay_ms);
    /// }
    /// session.finish()?;
    /// # Ok::<(), pictor_common::Error>(())
    /// ```
    pub fn next_frame(&mut self) -> Result<Option<Image>> {
        let mut image = match self.seek_next_frame() {
            Ok(image) => image,
            Err(Error::NoMoreFrames) => return Ok(None),
            Err(e) => return Err(e),
        };

        image.allocate_pixels();
        let mut pixels = std::mem::take(&mut image.pixels);

        for _ in 0..image.passes {
            self.seek_next_pass()?;
            self.read_frame(&mut pixels)?;
        }

        image.pixels = pixels;
        Ok(Some(image))
    }

    /// Releases codec state and closes the I/O. Valid from any state.
    pub fn finish(mut self) -> Result<()> {
        self.do_finish()
    }

    fn do_finish(&mut self) -> Result<()> {
        if self.phase == Phase::Finished {
            return Ok(());
        }
        self.phase = Phase::Finished;

        let result = self.state.finish(&mut self.io);
        // Close even if the codec failed to wind down.
        let close_result = self.io.close();
        result.and(close_result)
    }
}

impl<S: Io> Drop for ReadSession<S> {
    fn drop(&mut self) {
        if self.phase != Phase::Finished {
            if let Err(e) = self.do_finish() {
                tracing::warn!("read session cleanup failed: {e}");
            }
        }
    }
}

/// A live streaming encode operation, symmetric to [`ReadSession`].
pub struct WriteSession<S: Io> {
    _codec: Arc<dyn Codec>,
    state: Box<dyn WriteState>,
    io: S,
    phase: Phase,
    header: Option<Image>,
    passes_left: u32,
}

impl<S: Io> fmt::Debug for WriteSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteSession")
            .field("phase", &self.phase)
            .field("header", &self.header)
            .field("passes_left", &self.passes_left)
            .finish_non_exhaustive()
    }
}

impl<S: Io> WriteSession<S> {
    /// Starts an encode operation: runs the codec's `write_init` on `io`
    /// with a deep copy of `options`.
    pub fn new(codec: Arc<dyn Codec>, mut io: S, options: WriteOptions) -> Result<Self> {
        let state = codec.write_init(&mut io, &options)?;

        Ok(Self {
            _codec: codec,
            state,
            io,
            phase: Phase::BetweenFrames,
            header: None,
            passes_left: 0,
        })
    }

    /// Begins the next frame. The codec validates the header (declared
    /// pixel format, metadata) against its write capabilities.
    pub fn seek_next_frame(&mut self, image: &Image) -> Result<()> {
        if self.phase != Phase::BetweenFrames {
            return Err(state_error("seek_next_frame", self.phase));
        }

        match self.state.seek_next_frame(&mut self.io, image) {
            Ok(()) => {
                self.passes_left = image.passes.max(1);
                let mut header = image.clone();
                header.pixels = Vec::new();
                self.header = Some(header);
                self.phase = Phase::PassPending;
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    /// Prepares the next pass of the current frame.
    pub fn seek_next_pass(&mut self) -> Result<()> {
        if self.phase != Phase::PassPending {
            return Err(state_error("seek_next_pass", self.phase));
        }

        let header = self
            .header
            .as_ref()
            .ok_or_else(|| Error::StateError("no frame in progress".into()))?;

        match self.state.seek_next_pass(&mut self.io, header) {
            Ok(()) => {
                self.phase = Phase::PassReady;
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    /// Encodes one pass from `pixels`.
    pub fn write_frame(&mut self, pixels: &[u8]) -> Result<()> {
        if self.phase != Phase::PassReady {
            return Err(state_error("write_frame", self.phase));
        }

        let header = self
            .header
            .as_ref()
            .ok_or_else(|| Error::StateError("no frame in progress".into()))?;

        match self.state.write_frame(&mut self.io, header, pixels) {
            Ok(()) => {
                self.passes_left -= 1;
                self.phase = if self.passes_left == 0 {
                    self.header = None;
                    Phase::BetweenFrames
                } else {
                    Phase::PassPending
                };
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    /// Encodes one whole frame from `image` (header plus pixel buffer).
    pub fn next_frame(&mut self, image: &Image) -> Result<()> {
        self.seek_next_frame(image)?;

        for _ in 0..image.passes.max(1) {
            self.seek_next_pass()?;
            self.write_frame(&image.pixels)?;
        }

        Ok(())
    }

    /// Flushes the codec, releases its state, and closes the I/O. Valid
    /// from any state.
    pub fn finish(mut self) -> Result<()> {
        self.do_finish()
    }

    fn do_finish(&mut self) -> Result<()> {
        if self.phase == Phase::Finished {
            return Ok(());
        }
        self.phase = Phase::Finished;

        let result = self.state.finish(&mut self.io);
        let flush_result = self.io.flush();
        let close_result = self.io.close();
        result.and(flush_result).and(close_result)
    }
}

impl<S: Io> Drop for WriteSession<S> {
    fn drop(&mut self) {
        if self.phase != Phase::Finished {
            if let Err(e) = self.do_finish() {
                tracing::warn!("write session cleanup failed: {e}");
            }
        }
    }
}
