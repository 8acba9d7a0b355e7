// Applies an opcode stream to a frame.
//
// Keyframes and delta frames share one cursor machine; they differ only in
// what end-of-bitmap is allowed to mean. The cursor starts at column 0 of
// the bottom line and only ever moves forward.

use super::opcode::Op;
use super::reader::OpReader;
use crate::error::DecodeError;
use crate::frame::PixelFrame;

/// Which kind of frame a stream encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Self-contained; every scanline must be reached before end-of-bitmap.
    Key,
    /// Relative to the frame being mutated; may end at any line.
    Delta,
}

struct Cursor {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl Cursor {
    fn overflow(&self) -> DecodeError {
        DecodeError::Overflow {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Reserve `count` pixels on the current line, returning the column
    /// range they occupy.
    fn claim(&mut self, count: u32) -> Result<std::ops::Range<usize>, DecodeError> {
        if self.y >= self.height || self.x + count > self.width {
            return Err(self.overflow());
        }
        let start = self.x as usize;
        self.x += count;
        Ok(start..self.x as usize)
    }
}

/// Apply the records of `opcodes` to `frame` in place.
///
/// Stops at end-of-bitmap; bytes after it are ignored. Running out of bytes
/// before end-of-bitmap is an error.
pub fn apply(opcodes: &[u8], frame: &mut PixelFrame, kind: FrameKind) -> Result<(), DecodeError> {
    let depth = frame.depth();
    let mut cursor = Cursor {
        x: 0,
        y: 0,
        width: frame.width(),
        height: frame.height(),
    };

    for op in OpReader::new(opcodes, depth) {
        match op? {
            Op::Run { count, pixel } => {
                let span = cursor.claim(u32::from(count))?;
                frame.row_mut(cursor.y)[span].fill(pixel);
            }
            op @ Op::Literal { count, .. } => {
                let span = cursor.claim(u32::from(count))?;
                for (dst, px) in frame.row_mut(cursor.y)[span]
                    .iter_mut()
                    .zip(op.literal_pixels(depth))
                {
                    *dst = px;
                }
            }
            Op::EndOfLine => {
                if cursor.y >= cursor.height {
                    return Err(cursor.overflow());
                }
                cursor.x = 0;
                cursor.y += 1;
            }
            Op::Skip { dx, dy } => {
                cursor.x += u32::from(dx);
                cursor.y += u32::from(dy);
                let past_end = cursor.y > cursor.height
                    || cursor.x > cursor.width
                    || (cursor.y == cursor.height && cursor.x > 0);
                if past_end {
                    return Err(cursor.overflow());
                }
            }
            Op::EndOfBitmap => {
                if kind == FrameKind::Key && !keyframe_complete(&cursor) {
                    return Err(DecodeError::Truncated {
                        line: cursor.y,
                        height: cursor.height,
                    });
                }
                return Ok(());
            }
        }
    }

    Err(DecodeError::UnexpectedEof {
        offset: opcodes.len(),
    })
}

/// Every line closed, or the last line filled and closed by end-of-bitmap
/// itself.
fn keyframe_complete(cursor: &Cursor) -> bool {
    cursor.y == cursor.height || (cursor.y + 1 == cursor.height && cursor.x == cursor.width)
}
