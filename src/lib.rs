//! Screencodec: a screen-capture video codec built from run-length and
//! skip records, in Rust.
//!
//! Frames are 8-bit (palette or gray), 16-bit (RGB-555) or 24-bit (RGB) and
//! are stored bottom-up. A keyframe encodes every scanline as runs; a delta
//! frame encodes only what changed since the previous frame and skips the
//! rest. Opcode streams may be zlib-compressed; decoding detects which.
//!
//! The crate provides:
//! - Frame types and pixel-format conversion (`frame`)
//! - The opcode grammar and the keyframe/delta codecs (`rle`)
//! - The optional deflate layer (`compress`)
//! - A stateful adapter that tracks the reference frame (`codec`)
//! - Stateless boundary calls over caller-owned buffers (`engine`)
//! - Raw frame file helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use screencodec::codec::{Codec, CodecConfig};
//! use screencodec::frame::{PixelFormat, PixelFrame};
//!
//! let config = CodecConfig::new(8, 5, PixelFormat::Rgb888);
//! let mut encoder = Codec::new();
//! encoder.configure(config.clone()).unwrap();
//! let mut decoder = Codec::new();
//! decoder.configure(config).unwrap();
//!
//! let previous = PixelFrame::new(8, 5, PixelFormat::Rgb888).unwrap();
//! let mut frame = previous.clone();
//! for x in 1..7 {
//!     frame.set(x, 2, 0xFFFFFF);
//! }
//!
//! let key = encoder.encode(&previous).unwrap();
//! let delta = encoder.encode(&frame).unwrap();
//! assert_eq!(delta.data, [0, 2, 1, 2, 6, 0xFF, 0xFF, 0xFF, 0, 0, 0, 1]);
//!
//! decoder.decode(&key.data, key.flags).unwrap();
//! assert_eq!(decoder.decode(&delta.data, delta.flags).unwrap(), &frame);
//! ```

pub mod codec;
pub mod compress;
pub mod engine;
pub mod error;
pub mod frame;
pub mod io;
pub mod rle;

#[cfg(feature = "cli")]
pub mod cli;
