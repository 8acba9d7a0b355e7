// Opcode grammar of the run-length stream.
//
//   N (1..=255), pixel          -> repeat `pixel` N times
//   00 00                       -> end of line
//   00 01                       -> end of bitmap
//   00 02 dx dy                 -> skip dx columns and dy lines
//   00 N (3..=255), N pixels    -> literal pixels, padded to an even byte count
//
// Pixels are `depth / 8` bytes, little-endian. Lines are walked bottom-up.

use std::fmt;

use crate::frame::Depth;

/// Prefix of every control record.
pub const ESCAPE: u8 = 0x00;
/// Control byte following `ESCAPE`: end of line.
pub const END_OF_LINE: u8 = 0x00;
/// Control byte following `ESCAPE`: end of bitmap.
pub const END_OF_BITMAP: u8 = 0x01;
/// Control byte following `ESCAPE`: cursor skip.
pub const SKIP: u8 = 0x02;
/// Smallest control byte that introduces a literal.
pub const MIN_LITERAL: u8 = 0x03;

/// Largest count a single run record can carry.
pub const MAX_RUN: u32 = 255;
/// Largest offset a single skip record can carry on either axis.
pub const MAX_SKIP: u32 = 255;

/// One decoded record of the opcode stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op<'a> {
    /// Replicate `pixel` `count` times at the cursor.
    Run { count: u8, pixel: u32 },
    /// `count` explicit pixels; `data` holds their wire bytes without padding.
    Literal { count: u8, data: &'a [u8] },
    /// Move to column 0 of the next line.
    EndOfLine,
    /// Stop decoding; the remaining bytes do not belong to this frame.
    EndOfBitmap,
    /// Advance the cursor by `dx` columns and `dy` lines without writing.
    Skip { dx: u8, dy: u8 },
}

impl Op<'_> {
    /// Number of pixels this record writes.
    pub fn pixel_count(&self) -> u32 {
        match *self {
            Self::Run { count, .. } | Self::Literal { count, .. } => u32::from(count),
            _ => 0,
        }
    }

    /// Pixel values of a literal record (empty for other records).
    pub fn literal_pixels(&self, depth: Depth) -> impl Iterator<Item = u32> + '_ {
        let data: &[u8] = match self {
            Self::Literal { data, .. } => data,
            _ => &[],
        };
        data.chunks_exact(depth.bytes_per_pixel())
            .map(move |px| depth.read_pixel(px))
    }
}

impl fmt::Display for Op<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run { count, pixel } => write!(f, "RUN     {count:>3} x {pixel:#08X}"),
            Self::Literal { count, data } => write!(f, "LITERAL {count:>3} ({} bytes)", data.len()),
            Self::EndOfLine => write!(f, "EOL"),
            Self::EndOfBitmap => write!(f, "EOB"),
            Self::Skip { dx, dy } => write!(f, "SKIP    dx={dx} dy={dy}"),
        }
    }
}

/// Upper bound on the opcode stream size of one frame.
///
/// Covers single-pixel runs everywhere, inner skips and per-line
/// positioning, with slack for literals and padding from other producers.
pub fn max_stream_len(width: u32, height: u32, depth: Depth) -> usize {
    let (w, h) = (width as usize, height as usize);
    let per_pixel = depth.bytes_per_pixel() + 2;
    let per_line = 2 + 4 * (w / MAX_SKIP as usize + 2);
    w.saturating_mul(h)
        .saturating_mul(per_pixel)
        .saturating_add(h.saturating_mul(per_line))
        .saturating_add(1024)
}
