// Stateful codec adapter.
//
// Owns the configuration, the palette, the opcode scratch buffer and the
// reference frame, and decides keyframe vs. delta on the encode side. The
// reference frame lives inside `CodecState::HasReference` and is moved
// through `decode_delta`, so exactly one owner mutates it at a time.

use bitflags::bitflags;

use crate::compress::{self, Compression};
use crate::error::{CodecError, ConfigError, DecodeError};
use crate::frame::{Palette, PixelFormat, PixelFrame, PixelWord, Raster, RasterMut};
use crate::rle::{self, FrameKind};

bitflags! {
    /// Per-sample flags a container stores next to the payload.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FrameFlags: u8 {
        /// The sample decodes without a reference frame.
        const KEYFRAME = 0b0000_0001;

        /// The payload is a zlib stream. Decoding probes the payload and
        /// does not rely on this bit.
        const DEFLATED = 0b0000_0010;
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Parameters bound to a codec instance by [`Codec::configure`].
#[derive(Debug, Clone)]
pub struct CodecConfig {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Emit a keyframe every this many frames. 0 means only the first frame
    /// (and frames after [`Codec::force_keyframe`]) are keyframes.
    pub keyframe_interval: u32,
    pub compression: Compression,
    /// Palette for [`PixelFormat::Indexed`]; required for that format.
    pub palette: Option<Palette>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            format: PixelFormat::Rgb888,
            keyframe_interval: 30,
            compression: Compression::default(),
            palette: None,
        }
    }
}

impl CodecConfig {
    /// A configuration for `width x height` frames, other fields defaulted.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.format == PixelFormat::Indexed && self.palette.is_none() {
            return Err(ConfigError::MissingPalette);
        }
        Ok(())
    }

    /// Upper bound on an inflated opcode stream for this geometry.
    pub fn max_stream_len(&self) -> usize {
        rle::max_stream_len(self.width, self.height, self.format.depth())
    }

    fn describe(&self) -> String {
        format!("{}x{} {:?}", self.width, self.height, self.format)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Adapter state. The reference frame is owned by the `HasReference` arm.
#[derive(Debug, Default)]
enum CodecState {
    #[default]
    Idle,
    AwaitingFirstFrame,
    HasReference(PixelFrame),
}

/// Observable state of a [`Codec`], without the reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecPhase {
    Idle,
    AwaitingFirstFrame,
    HasReference,
}

impl std::fmt::Display for CodecPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingFirstFrame => write!(f, "awaiting first frame"),
            Self::HasReference => write!(f, "has reference"),
        }
    }
}

/// One encoded sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    pub data: Vec<u8>,
    pub flags: FrameFlags,
}

impl EncodedFrame {
    pub fn is_keyframe(&self) -> bool {
        self.flags.contains(FrameFlags::KEYFRAME)
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// A single-stream encoder/decoder.
///
/// One instance serves either direction, but a stream must be encoded or
/// decoded through its own instance: both directions share the reference
/// frame.
///
/// ```
/// use screencodec::codec::{Codec, CodecConfig};
/// use screencodec::frame::{PixelFormat, PixelFrame};
///
/// let config = CodecConfig::new(8, 5, PixelFormat::Rgb888);
/// let mut encoder = Codec::new();
/// encoder.configure(config.clone()).unwrap();
/// let mut decoder = Codec::new();
/// decoder.configure(config).unwrap();
///
/// let frame = PixelFrame::new(8, 5, PixelFormat::Rgb888).unwrap();
/// let sample = encoder.encode(&frame).unwrap();
/// assert!(sample.is_keyframe());
/// assert_eq!(decoder.decode(&sample.data, sample.flags).unwrap(), &frame);
/// ```
#[derive(Debug, Default)]
pub struct Codec {
    config: Option<CodecConfig>,
    state: CodecState,
    palette: Palette,
    /// Opcode scratch buffer, reused across encodes.
    scratch: Vec<u8>,
    frames_since_key: u32,
    force_key: bool,
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind frame geometry, format and compression. Drops any reference
    /// frame; the next frame in either direction must be a keyframe.
    pub fn configure(&mut self, config: CodecConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if let Some(palette) = &config.palette {
            self.palette = palette.clone();
        }
        log::debug!(
            "codec configured for {} (keyframe interval {}, compression {:?})",
            config.describe(),
            config.keyframe_interval,
            config.compression
        );
        self.config = Some(config);
        self.state = CodecState::AwaitingFirstFrame;
        self.frames_since_key = 0;
        self.force_key = false;
        Ok(())
    }

    /// Bind the palette used to expand indexed frames.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn config(&self) -> Option<&CodecConfig> {
        self.config.as_ref()
    }

    pub fn phase(&self) -> CodecPhase {
        match self.state {
            CodecState::Idle => CodecPhase::Idle,
            CodecState::AwaitingFirstFrame => CodecPhase::AwaitingFirstFrame,
            CodecState::HasReference(_) => CodecPhase::HasReference,
        }
    }

    /// The last frame encoded or decoded, if any.
    pub fn reference(&self) -> Option<&PixelFrame> {
        match &self.state {
            CodecState::HasReference(frame) => Some(frame),
            _ => None,
        }
    }

    /// Make the next encoded frame a keyframe.
    pub fn force_keyframe(&mut self) {
        self.force_key = true;
    }

    /// Drop the reference frame, keeping the configuration.
    pub fn reset(&mut self) {
        if self.config.is_some() {
            self.enter_awaiting("reset");
        }
    }

    // -----------------------------------------------------------------------
    // Encode
    // -----------------------------------------------------------------------

    /// Encode the next frame of the stream.
    pub fn encode(&mut self, frame: &PixelFrame) -> Result<EncodedFrame, CodecError> {
        let config = self.config.as_ref().ok_or(CodecError::NotConfigured)?;
        if (frame.width(), frame.height(), frame.format())
            != (config.width, config.height, config.format)
        {
            return Err(CodecError::FrameMismatch {
                expected: config.describe(),
                actual: frame.describe(),
            });
        }

        let interval_due =
            config.keyframe_interval > 0 && self.frames_since_key >= config.keyframe_interval;
        self.scratch.clear();
        let previous = match &self.state {
            CodecState::HasReference(previous) if !self.force_key && !interval_due => {
                Some(previous)
            }
            _ => None,
        };
        let mut flags = match previous {
            Some(previous) => {
                rle::encode_delta(frame, previous, &mut self.scratch);
                FrameFlags::empty()
            }
            None => {
                rle::encode_key(frame, &mut self.scratch);
                FrameFlags::KEYFRAME
            }
        };

        let payload = compress::wrap(&self.scratch, &config.compression)?;
        if payload.is_deflated() {
            flags |= FrameFlags::DEFLATED;
        }
        log::trace!(
            "encoded {} frame: {} opcode bytes -> {} bytes",
            if flags.contains(FrameFlags::KEYFRAME) { "key" } else { "delta" },
            self.scratch.len(),
            payload.bytes().len()
        );
        let data = payload.into_vec();

        if flags.contains(FrameFlags::KEYFRAME) {
            self.frames_since_key = 1;
            self.force_key = false;
        } else {
            self.frames_since_key = self.frames_since_key.saturating_add(1);
        }
        match &mut self.state {
            CodecState::HasReference(reference) => reference.clone_from(frame),
            state => {
                *state = CodecState::HasReference(frame.clone());
                log::debug!("codec has a reference frame");
            }
        }
        Ok(EncodedFrame { data, flags })
    }

    /// Encode a caller's top-down buffer in the configured format.
    pub fn encode_raster<P: PixelWord>(
        &mut self,
        raster: &Raster<'_, P>,
    ) -> Result<EncodedFrame, CodecError> {
        let config = self.config.as_ref().ok_or(CodecError::NotConfigured)?;
        let frame = PixelFrame::from_raster(raster, config.format)?;
        self.encode(&frame)
    }

    // -----------------------------------------------------------------------
    // Decode
    // -----------------------------------------------------------------------

    /// Decode the next sample of the stream and return the new frame.
    ///
    /// The payload may be deflated or raw. On any decode error the reference
    /// frame is dropped and the codec waits for a keyframe.
    pub fn decode(&mut self, sample: &[u8], flags: FrameFlags) -> Result<&PixelFrame, CodecError> {
        let config = self.config.as_ref().ok_or(CodecError::NotConfigured)?;
        let (width, height, format) = (config.width, config.height, config.format);
        let kind = if flags.contains(FrameFlags::KEYFRAME) {
            FrameKind::Key
        } else {
            FrameKind::Delta
        };

        let previous = std::mem::replace(&mut self.state, CodecState::AwaitingFirstFrame);
        let had_reference = matches!(previous, CodecState::HasReference(_));
        let result = compress::unwrap(sample, config.max_stream_len()).and_then(|payload| {
            let opcodes = payload.bytes();
            match (kind, previous) {
                (FrameKind::Key, CodecState::HasReference(mut frame)) => {
                    rle::decode_key_into(opcodes, &mut frame).map(|()| frame)
                }
                (FrameKind::Key, _) => rle::decode_key(opcodes, width, height, format),
                (FrameKind::Delta, CodecState::HasReference(frame)) => {
                    rle::decode_delta(opcodes, frame)
                }
                (FrameKind::Delta, _) => Err(DecodeError::MissingReference),
            }
        });

        match result {
            Ok(frame) => {
                if !had_reference {
                    log::debug!("codec has a reference frame");
                }
                log::trace!("decoded {kind:?} frame from {} bytes", sample.len());
                self.state = CodecState::HasReference(frame);
                self.reference()
                    .ok_or(CodecError::Decode(DecodeError::MissingReference))
            }
            Err(e) => {
                if had_reference {
                    log::debug!("codec dropped its reference frame, awaiting keyframe");
                }
                Err(e.into())
            }
        }
    }

    /// Decode the next sample and write it, expanded to `0xRRGGBB`, into a
    /// caller's top-down buffer.
    ///
    /// The buffer geometry is checked before the sample is read.
    pub fn decode_rgb(
        &mut self,
        sample: &[u8],
        flags: FrameFlags,
        out: &mut RasterMut<'_, u32>,
    ) -> Result<(), CodecError> {
        let config = self.config.as_ref().ok_or(CodecError::NotConfigured)?;
        if (out.width(), out.height()) != (config.width, config.height) {
            let err = CodecError::FrameMismatch {
                expected: config.describe(),
                actual: format!("{}x{} RGB buffer", out.width(), out.height()),
            };
            self.enter_awaiting("buffer mismatch");
            return Err(err);
        }
        self.decode(sample, flags)?;
        match &self.state {
            CodecState::HasReference(frame) => Ok(frame.write_rgb_raster(out, &self.palette)?),
            _ => Err(DecodeError::MissingReference.into()),
        }
    }

    fn enter_awaiting(&mut self, why: &str) {
        if !matches!(self.state, CodecState::AwaitingFirstFrame) {
            log::debug!("codec {} -> awaiting first frame ({why})", self.phase());
        }
        self.state = CodecState::AwaitingFirstFrame;
        self.frames_since_key = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
