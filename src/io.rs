// File-level helpers for raw frames and encoded samples.
//
// A raw frame file holds `height` top-down rows of `width` packed wire
// pixels (1, 2 or 3 bytes each, little-endian) and nothing else. A sample
// file holds one encoded frame, deflated or raw. The caller supplies the
// geometry; neither file carries a header.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::compress::{self, Compression};
use crate::error::{ConfigError, DecodeError};
use crate::frame::{Palette, PixelFormat, PixelFrame};
use crate::rle;

// ---------------------------------------------------------------------------
// Options and stats
// ---------------------------------------------------------------------------

/// Frame geometry shared by every file in one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    /// Size of a raw frame file in bytes.
    pub fn frame_size(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * self.format.depth().bytes_per_pixel() as u64
    }
}

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct EncodeStats {
    /// Raw input frame size in bytes.
    pub frame_size: u64,
    /// Opcode stream size before compression.
    pub opcode_size: u64,
    /// Sample size as written.
    pub output_size: u64,
    pub keyframe: bool,
    pub deflated: bool,
}

/// Statistics returned by `decode_file()`.
#[derive(Debug, Clone)]
pub struct DecodeStats {
    /// Sample size as read.
    pub input_size: u64,
    /// Opcode stream size after inflating.
    pub opcode_size: u64,
    /// Raw output frame size in bytes.
    pub output_size: u64,
    pub keyframe: bool,
    pub deflated: bool,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid frame: {0}")]
    Config(#[from] ConfigError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// Raw frames
// ---------------------------------------------------------------------------

const PALETTE_FILE_SIZE: usize = 256 * 3;

/// Read a raw frame file.
pub fn read_raw_frame(path: &Path, geometry: FrameGeometry) -> Result<PixelFrame, IoError> {
    let bytes = std::fs::read(path)?;
    Ok(PixelFrame::from_wire_bytes(
        &bytes,
        geometry.width,
        geometry.height,
        geometry.format,
    )?)
}

/// Write `frame` as a raw frame file. Returns the bytes written.
pub fn write_raw_frame(path: &Path, frame: &PixelFrame) -> Result<u64, IoError> {
    let bytes = frame.to_wire_bytes();
    write_all(path, &bytes)?;
    Ok(bytes.len() as u64)
}

/// Read a palette file: 256 RGB triples, 768 bytes.
pub fn read_palette(path: &Path) -> Result<Palette, IoError> {
    let bytes = std::fs::read(path)?;
    if bytes.len() != PALETTE_FILE_SIZE {
        return Err(IoError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "palette file is {} bytes, expected {PALETTE_FILE_SIZE}",
                bytes.len()
            ),
        )));
    }
    let mut triples = [[0u8; 3]; 256];
    for (triple, chunk) in triples.iter_mut().zip(bytes.chunks_exact(3)) {
        triple.copy_from_slice(chunk);
    }
    Ok(Palette::from_rgb_triples(&triples))
}

fn write_all(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(bytes)?;
    writer.flush()
}

// ---------------------------------------------------------------------------
// encode_file / decode_file
// ---------------------------------------------------------------------------

/// Encode the raw frame at `input_path` into a sample at `output_path`.
///
/// With `previous_path` the sample is a delta against that raw frame,
/// otherwise a keyframe.
pub fn encode_file(
    input_path: &Path,
    previous_path: Option<&Path>,
    output_path: &Path,
    geometry: FrameGeometry,
    compression: &Compression,
) -> Result<EncodeStats, IoError> {
    let frame = read_raw_frame(input_path, geometry)?;
    let mut opcodes = Vec::new();
    match previous_path {
        Some(path) => {
            let previous = read_raw_frame(path, geometry)?;
            rle::encode_delta(&frame, &previous, &mut opcodes);
        }
        None => rle::encode_key(&frame, &mut opcodes),
    }

    let payload = compress::wrap(&opcodes, compression)?;
    write_all(output_path, payload.bytes())?;

    Ok(EncodeStats {
        frame_size: geometry.frame_size(),
        opcode_size: opcodes.len() as u64,
        output_size: payload.bytes().len() as u64,
        keyframe: previous_path.is_none(),
        deflated: payload.is_deflated(),
    })
}

/// Decode the sample at `input_path` into a raw frame at `output_path`.
///
/// With `previous_path` the sample is a delta applied to that raw frame,
/// otherwise a keyframe. With `rgb` set, the output is expanded to 24-bit
/// through `palette`.
pub fn decode_file(
    input_path: &Path,
    previous_path: Option<&Path>,
    output_path: &Path,
    geometry: FrameGeometry,
    rgb: Option<&Palette>,
) -> Result<DecodeStats, IoError> {
    let sample = std::fs::read(input_path)?;
    let limit = rle::max_stream_len(geometry.width, geometry.height, geometry.format.depth());
    let payload = compress::unwrap(&sample, limit)?;

    let frame = match previous_path {
        Some(path) => rle::decode_delta(payload.bytes(), read_raw_frame(path, geometry)?)?,
        None => rle::decode_key(
            payload.bytes(),
            geometry.width,
            geometry.height,
            geometry.format,
        )?,
    };
    let output_size = match rgb {
        Some(palette) => write_raw_frame(output_path, &frame.to_rgb(palette))?,
        None => write_raw_frame(output_path, &frame)?,
    };

    Ok(DecodeStats {
        input_size: sample.len() as u64,
        opcode_size: payload.bytes().len() as u64,
        output_size,
        keyframe: previous_path.is_none(),
        deflated: payload.is_deflated(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
