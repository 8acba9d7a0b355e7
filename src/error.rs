// Error types shared by the codec layers.
//
// Decoding is the only fallible transformation: encoders are infallible for
// well-formed frames and only surface I/O errors from their sink.

use std::io;

use thiserror::Error;

use crate::frame::{Depth, PixelFormat};

/// A frame could not be decoded.
///
/// Every variant means the same thing to the caller: this sample is unusable
/// and the next decodable frame must be a keyframe.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The opcode stream ended in the middle of a record or before
    /// end-of-bitmap.
    #[error("unexpected end of opcode stream at byte {offset}")]
    UnexpectedEof { offset: usize },

    /// A keyframe signalled end-of-bitmap before every scanline was closed.
    #[error("keyframe ended at line {line} of {height}")]
    Truncated { line: u32, height: u32 },

    /// A run, literal or skip moved the cursor outside the bitmap.
    #[error("cursor overflow at ({x}, {y}) in {width}x{height} frame")]
    Overflow {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// The target buffer does not match the configured frame geometry.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// A delta frame arrived while no reference frame was available.
    #[error("delta frame without a reference frame")]
    MissingReference,

    /// The deflate layer could not inflate the payload.
    #[error("compressed payload: {0}")]
    Compression(String),

    /// The inflated payload is larger than any opcode stream for the frame.
    #[error("inflated payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
}

/// The codec was configured with parameters it cannot serve.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("frame dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: u32, height: u32 },

    #[error("{0}-bit is not a supported depth")]
    UnsupportedDepth(u32),

    #[error("pixel format {format:?} cannot be carried at {depth:?}")]
    DepthMismatch { format: PixelFormat, depth: Depth },

    #[error("indexed pixel format requires a palette")]
    MissingPalette,

    #[error("pixel buffer holds {actual} values, {width}x{height} needs {expected}")]
    PixelCount {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Errors surfaced by the stateful [`Codec`](crate::codec::Codec).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("codec is not configured")]
    NotConfigured,

    #[error("frame is {actual}, codec is configured for {expected}")]
    FrameMismatch { expected: String, actual: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
